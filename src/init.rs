use crate::config::TemplateConfig;
use crate::layer::TemplateLayer;
use crate::sink::LogSink;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the installed subscriber.
///
/// **Fields**
/// - `template`: [`TemplateConfig`] used by the [`TemplateLayer`].
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   installed next to the [`TemplateLayer`] so events are also printed to
///   the console (with the raw, uninterpolated message).
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub template: TemplateConfig,
    pub enable_stdout: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            template: TemplateConfig::default(),
            enable_stdout: true,
        }
    }
}

/// Error returned when installing the global subscriber.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("global tracing subscriber already set: {0}")]
    AlreadySet(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Initialize the global `tracing` subscriber using the provided sink and
/// [`LayerConfig`].
///
/// **Parameters**
/// - `sink`: implementation of [`LogSink`] that will receive interpolated
///   [`crate::record::LogRecord`]s.
/// - `config`: [`LayerConfig`] controlling field names and console output.
///
/// **Returns**
/// - `Err(InitError::AlreadySet)` if a global subscriber was installed
///   earlier in the process.
pub fn init_tracing_with_config(
    sink: Arc<dyn LogSink>,
    config: LayerConfig,
) -> Result<(), InitError> {
    let layer = TemplateLayer::new(config.template, sink);

    // Two subscriber shapes, since the fmt layer changes the stack's type.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

/// Initialize tracing with default field names and console output.
///
/// Equivalent to calling [`init_tracing_with_config`] with
/// [`LayerConfig::default`].
pub fn init_tracing(sink: Arc<dyn LogSink>) -> Result<(), InitError> {
    init_tracing_with_config(sink, LayerConfig::default())
}
