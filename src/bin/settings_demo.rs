use chat_auth::settings::*;

fn main() -> anyhow::Result<()> {
    // Load settings from the build profile's default location
    let project_settings = parse_settings(None)?;
    println!("Loaded settings: {:?}", project_settings);

    // Attempt to load from an invalid path (expected to fail)
    let is_err = parse_settings(Some("")).is_err();
    println!("Error on invalid path: {:?}", is_err);

    // Load from a custom path, with env overrides applied:
    // $ CHAT__GATEWAY__REQUEST_TIMEOUT_SECS=3 cargo run --bin settings_demo -- --settings=settings/release.toml gateway
    let cli = Cli::parse();
    let project_settings = parse_settings(cli.settings.as_deref())?;
    println!("Loaded settings for {:?}: {:?}", cli.command, project_settings);
    Ok(())
}
