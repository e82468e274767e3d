use super::Parser;
use clap::Subcommand;

#[derive(Parser, Debug)]
pub struct Cli {
    #[arg(long)]
    pub settings: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Serve the credential RPC endpoints.
    Backend,
    /// Serve the public HTTP API, forwarding to the backend.
    Gateway,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommand_and_settings_path() {
        let cli = Cli::try_parse_from(["chat-auth", "--settings", "settings/release.toml", "gateway"]).unwrap();
        assert_eq!(cli.command, Command::Gateway);
        assert_eq!(cli.settings.as_deref(), Some("settings/release.toml"));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["chat-auth"]).is_err());
    }
}
