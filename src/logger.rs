use crate::assemble::augment;
use crate::config::TemplateConfig;
use crate::record::LogRecord;
use crate::sink::LogSink;
use crate::value::{Fields, LogValue};
use crate::INTERNAL_TARGET;
use std::sync::Arc;
use tracing::Level;

/// Default `target` for records emitted through a [`Logger`].
pub const DEFAULT_TARGET: &str = "app";

/// Logger that interpolates `{placeholder}` templates before handing records
/// to a [`LogSink`].
///
/// Each instance carries persistent bindings. [`Logger::child`] derives a
/// logger whose bindings extend the parent's. Cloning is cheap: config,
/// bindings and sink are shared.
#[derive(Clone)]
pub struct Logger {
    config: Arc<TemplateConfig>,
    bindings: Arc<Fields>,
    target: Arc<str>,
    sink: Arc<dyn LogSink>,
}

impl Logger {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self::with_config(TemplateConfig::default(), sink)
    }

    pub fn with_config(config: TemplateConfig, sink: Arc<dyn LogSink>) -> Self {
        Logger {
            config: Arc::new(config),
            bindings: Arc::new(Fields::new()),
            target: Arc::from(DEFAULT_TARGET),
            sink,
        }
    }

    /// Same logger, emitting under a different `target`.
    pub fn target(mut self, target: &str) -> Self {
        self.target = Arc::from(target);
        self
    }

    /// Derive a logger whose bindings are this logger's bindings overlaid
    /// by `bindings`.
    pub fn child(&self, bindings: Fields) -> Logger {
        let mut merged = (*self.bindings).clone();
        merged.extend(bindings);
        Logger {
            config: Arc::clone(&self.config),
            bindings: Arc::new(merged),
            target: Arc::clone(&self.target),
            sink: Arc::clone(&self.sink),
        }
    }

    pub fn bindings(&self) -> &Fields {
        &self.bindings
    }

    pub fn config(&self) -> &TemplateConfig {
        &self.config
    }

    /// Log one call.
    ///
    /// The arguments are classified, matched against the template's
    /// placeholders and assembled into a [`LogRecord`]; calls without a
    /// template shape are passed through with their arguments joined as the
    /// message. The sink is invoked exactly once either way. Level
    /// thresholds are the sink's concern.
    pub fn log(&self, level: Level, args: &[LogValue]) {
        let record = match augment(&self.config, &self.bindings, args) {
            Some(augmented) => {
                LogRecord::templated(level, &*self.target, &self.bindings, augmented)
            }
            None => {
                tracing::debug!(
                    target: INTERNAL_TARGET,
                    args = args.len(),
                    "no message template found, passing call through"
                );
                LogRecord::passthrough(level, &*self.target, &self.bindings, args)
            }
        };

        if let Err(e) = self.sink.send(&record) {
            tracing::warn!(target: INTERNAL_TARGET, error = %e, "log sink rejected record");
        }
    }

    pub fn trace(&self, args: &[LogValue]) {
        self.log(Level::TRACE, args);
    }

    pub fn debug(&self, args: &[LogValue]) {
        self.log(Level::DEBUG, args);
    }

    pub fn info(&self, args: &[LogValue]) {
        self.log(Level::INFO, args);
    }

    pub fn warn(&self, args: &[LogValue]) {
        self.log(Level::WARN, args);
    }

    pub fn error(&self, args: &[LogValue]) {
        self.log(Level::ERROR, args);
    }

    /// Flush the underlying sink.
    pub fn flush(&self) {
        if let Err(e) = self.sink.flush() {
            tracing::warn!(target: INTERNAL_TARGET, error = %e, "log sink flush failed");
        }
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("config", &self.config)
            .field("bindings", &self.bindings)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_info::ErrorInfo;
    use crate::sink::{MemorySink, SinkError};
    use crate::{args, fields};
    use serde_json::json;

    fn logger() -> (Logger, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (Logger::new(sink.clone()), sink)
    }

    #[test]
    fn emits_interpolated_record() {
        let (log, sink) = logger();
        log.info(&args!["User {user_id} logged in from {location}", 12345, "Salzburg"]);

        let records = sink.take();
        assert_eq!(records.len(), 1);
        let json = records[0].to_json().unwrap();
        assert_eq!(json["msg"], "User 12345 logged in from Salzburg");
        assert_eq!(json["level"], "INFO");
        assert_eq!(json["target"], DEFAULT_TARGET);
        assert_eq!(json["data"], json!({"user_id": 12345, "location": "Salzburg"}));
        assert!(json.get("args").is_none());
    }

    #[test]
    fn child_bindings_extend_parent() {
        let (log, sink) = logger();
        let child = log
            .child(fields! { "service" => "auth", "region" => "eu" })
            .child(fields! { "region" => "us" });
        assert_eq!(child.bindings()["region"], LogValue::from("us"));

        child.warn(&args!["{service} degraded in {region}"]);
        let json = sink.take()[0].to_json().unwrap();
        assert_eq!(json["msg"], "auth degraded in us");
        assert_eq!(json["service"], "auth");
        assert!(json.get("data").is_none());
        assert!(log.bindings().is_empty());
    }

    #[test]
    fn no_arguments_still_emits_once() {
        let (log, sink) = logger();
        log.debug(&[]);
        let records = sink.take();
        assert_eq!(records.len(), 1);
        let json = records[0].to_json().unwrap();
        assert_eq!(json["msg"], "");
        assert!(json.get("data").is_none());
        assert!(json.get("args").is_none());
        assert!(json.get("msg_tpl").is_none());
    }

    #[test]
    fn residual_arguments_travel_with_record() {
        let (log, sink) = logger();
        log.error(&args![
            ErrorInfo::new("Error", "boom"),
            "retry {attempt} failed",
            3,
            "extra"
        ]);
        let record = sink.take().remove(0);
        assert_eq!(record.msg, "retry 3 failed");
        assert_eq!(record.residual, vec![LogValue::from("extra")]);
        let json = record.to_json().unwrap();
        assert_eq!(json["args"], json!(["extra"]));
        assert_eq!(json["err"]["message"], "boom");
    }

    struct FailingSink;

    impl LogSink for FailingSink {
        fn send(&self, _record: &LogRecord) -> Result<(), SinkError> {
            Err(SinkError::Unavailable("down".into()))
        }
    }

    #[test]
    fn sink_failure_does_not_panic() {
        let log = Logger::new(Arc::new(FailingSink)).target("svc");
        assert_eq!(log.config(), &TemplateConfig::default());
        log.info(&args!["still fine"]);
        log.flush();
    }
}
