use anyhow::{Result, anyhow};
use std::future::Future;
use tracing::Dispatch;
use tracing::instrument::{WithDispatch, WithSubscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, reload};

pub struct LogConfig {
    pub filter: String,
}

/// Owned logging pipeline handed to the components that log.
///
/// Nothing is installed process-wide: work runs inside [`Logger::scope`] to
/// have its events routed here.
#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
    reload_handle: reload::Handle<EnvFilter, Registry>,
}

impl Logger {
    pub fn new_bootstrap() -> Self {
        Self::with_filter(EnvFilter::new("info"))
    }

    pub fn new(filter: &str) -> Result<Self> {
        let filter = EnvFilter::try_new(filter).map_err(|e| anyhow!(e))?;
        Ok(Self::with_filter(filter))
    }

    /// Plain-text events to `writer` instead of stdout.
    pub fn with_writer<W>(filter: &str, writer: W) -> Result<Self>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let filter = EnvFilter::try_new(filter).map_err(|e| anyhow!(e))?;
        let (filter, reload_handle) = reload::Layer::new(filter);

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(false).with_writer(writer));

        Ok(Self {
            dispatch: Dispatch::new(subscriber),
            reload_handle,
        })
    }

    fn with_filter(filter: EnvFilter) -> Self {
        let (filter, reload_handle) = reload::Layer::new(filter);

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer());

        Self {
            dispatch: Dispatch::new(subscriber),
            reload_handle,
        }
    }

    pub fn reload_from_config(&self, config: &LogConfig) -> Result<()> {
        let filter = EnvFilter::try_new(&config.filter).map_err(|e| anyhow!(e))?;
        self.reload_handle.reload(filter).map_err(|e| anyhow!(e))?;
        Ok(())
    }

    pub fn scope<F: Future>(&self, future: F) -> WithDispatch<F> {
        future.with_subscriber(self.dispatch.clone())
    }

    /// Synchronous counterpart of [`Logger::scope`].
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}
