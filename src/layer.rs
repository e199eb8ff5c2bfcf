use crate::assemble::augment;
use crate::config::TemplateConfig;
use crate::error_info::ErrorInfo;
use crate::record::LogRecord;
use crate::sink::LogSink;
use crate::value::{Fields, LogValue};
use crate::INTERNAL_TARGET;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that treats each event's message as a
/// `{placeholder}` template and forwards the resulting [`LogRecord`] to a
/// [`LogSink`].
///
/// The event's own fields are the structured data; fields recorded on the
/// enclosing spans are the bindings, outer spans first and inner spans
/// overriding them. Since `tracing` macros run the message through
/// `format_args!`, literal braces have to be doubled:
///
/// ```ignore
/// info!(user_id = 12345, "User {{user_id}} logged in");
/// ```
///
/// Events without a message, and the crate's own diagnostics, are skipped.
pub struct TemplateLayer {
    config: TemplateConfig,
    sink: Arc<dyn LogSink>,
    /// Total events seen by the layer.
    pub total_events: Arc<AtomicU64>,
    /// Records accepted by the sink.
    pub emitted_events: Arc<AtomicU64>,
    /// Records the sink rejected.
    pub failed_events: Arc<AtomicU64>,
}

impl TemplateLayer {
    pub fn new(config: TemplateConfig, sink: Arc<dyn LogSink>) -> Self {
        Self {
            config,
            sink,
            total_events: Arc::new(AtomicU64::new(0)),
            emitted_events: Arc::new(AtomicU64::new(0)),
            failed_events: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Fields recorded on a span, stored in the span's extensions.
struct SpanBindings(Fields);

impl<S> Layer<S> for TemplateLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut fields = Fields::new();
        let mut message = None;
        attrs.record(&mut FieldVisitor {
            fields: &mut fields,
            message: &mut message,
        });
        span.extensions_mut().insert(SpanBindings(fields));
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut extensions = span.extensions_mut();
        if let Some(SpanBindings(fields)) = extensions.get_mut::<SpanBindings>() {
            let mut message = None;
            values.record(&mut FieldVisitor {
                fields,
                message: &mut message,
            });
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        self.total_events.fetch_add(1, Ordering::Relaxed);

        let meta = event.metadata();
        if meta.target() == INTERNAL_TARGET {
            return;
        }

        let mut data = Fields::new();
        let mut message: Option<String> = None;
        event.record(&mut FieldVisitor {
            fields: &mut data,
            message: &mut message,
        });
        let Some(template) = message else {
            return;
        };

        let mut bindings = Fields::new();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(SpanBindings(fields)) = span.extensions().get::<SpanBindings>() {
                    bindings.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
            }
        }

        let args = [LogValue::Str(template), LogValue::Fields(data)];
        let record = match augment(&self.config, &bindings, &args) {
            Some(augmented) => {
                LogRecord::templated(*meta.level(), meta.target(), &bindings, augmented)
            }
            None => LogRecord::passthrough(*meta.level(), meta.target(), &bindings, &args),
        }
        .with_location(meta.module_path(), meta.file(), meta.line());

        match self.sink.send(&record) {
            Ok(()) => {
                self.emitted_events.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                // Emitting through tracing here would re-enter this subscriber.
                self.failed_events.fetch_add(1, Ordering::Relaxed);
                eprintln!("log sink rejected record: {}", e);
            }
        }
    }
}

/// Collects `tracing` field values into [`Fields`], splitting off the
/// `message` field.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut Fields,
    pub message: &'a mut Option<String>,
}

impl<'a> FieldVisitor<'a> {
    fn insert(&mut self, field: &Field, value: LogValue) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.insert(field, LogValue::from(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, LogValue::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, LogValue::from(value));
    }

    fn record_i128(&mut self, field: &Field, value: i128) {
        self.insert(field, LogValue::from(value));
    }

    fn record_u128(&mut self, field: &Field, value: u128) {
        self.insert(field, LogValue::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, LogValue::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, LogValue::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, LogValue::Error(ErrorInfo::from_error(value)));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.insert(field, LogValue::Str(format!("{:?}", value)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{MemorySink, SinkError};
    use serde_json::json;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    fn capture(config: TemplateConfig, f: impl FnOnce()) -> (Vec<LogRecord>, Arc<AtomicU64>) {
        let sink = Arc::new(MemorySink::new());
        let layer = TemplateLayer::new(config, sink.clone());
        let total = Arc::clone(&layer.total_events);
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, f);
        (sink.take(), total)
    }

    #[test]
    fn event_fields_fill_placeholders() {
        let (records, _) = capture(TemplateConfig::default(), || {
            tracing::info!(
                user_id = 12345,
                location = "Salzburg",
                "User {{user_id}} logged in from {{location}}"
            );
        });
        assert_eq!(records.len(), 1);
        let json = records[0].to_json().unwrap();
        assert_eq!(json["msg"], "User 12345 logged in from Salzburg");
        assert_eq!(json["msg_tpl"], "User {user_id} logged in from {location}");
        assert_eq!(json["data"], json!({"user_id": 12345, "location": "Salzburg"}));
        assert_eq!(json["level"], "INFO");
        assert!(json["line"].is_number());
    }

    #[test]
    fn wide_integer_fields_are_numbers() {
        let (records, _) = capture(TemplateConfig::default(), || {
            tracing::info!(big = 5u128, neg = -3i128, "moved {{big}} by {{neg}}");
        });
        let json = records[0].to_json().unwrap();
        assert_eq!(json["msg"], "moved 5 by -3");
        assert_eq!(json["data"], json!({"big": 5, "neg": -3}));
    }

    #[test]
    fn span_fields_are_bindings() {
        let (records, _) = capture(TemplateConfig::default(), || {
            let outer = tracing::info_span!("request", request_id = "r-1", user = "outer");
            let _outer = outer.enter();
            let inner = tracing::info_span!("handler", user = "inner");
            let _inner = inner.enter();
            tracing::warn!(path = "/x", "{{user}} hit {{path}} in {{request_id}}");
        });
        let json = records[0].to_json().unwrap();
        assert_eq!(json["msg"], "inner hit /x in r-1");
        assert_eq!(json["request_id"], "r-1");
        assert_eq!(json["user"], "inner");
        assert_eq!(json["data"], json!({"path": "/x"}));
    }

    #[test]
    fn recorded_span_fields_update_bindings() {
        let (records, _) = capture(TemplateConfig::default(), || {
            let span = tracing::info_span!("job", attempt = tracing::field::Empty);
            let _guard = span.enter();
            span.record("attempt", 2);
            tracing::info!("attempt {{attempt}}");
        });
        assert_eq!(records[0].msg, "attempt 2");
    }

    #[test]
    fn error_field_is_promoted() {
        let (records, _) = capture(TemplateConfig::default(), || {
            let err = "x".parse::<i32>().unwrap_err();
            tracing::error!(err = &err as &(dyn std::error::Error + 'static), job = 7, "job {{job}} failed");
        });
        let json = records[0].to_json().unwrap();
        assert_eq!(json["msg"], "job 7 failed");
        assert_eq!(json["err"]["message"], "invalid digit found in string");
        assert_eq!(json["err"]["type"], "Error");
        assert_eq!(json["data"], json!({"job": 7}));
    }

    #[test]
    fn events_without_message_are_skipped() {
        let (records, total) = capture(TemplateConfig::default(), || {
            tracing::info!(only = "fields");
            tracing::debug!(target: INTERNAL_TARGET, "internal");
        });
        assert!(records.is_empty());
        assert_eq!(total.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn unwrap_keys_apply_to_events() {
        let config = TemplateConfig::default().with_unwrap_keys(["request_id"]);
        let (records, _) = capture(config, || {
            tracing::info!(request_id = "r-9", "served");
        });
        let json = records[0].to_json().unwrap();
        assert_eq!(json["request_id"], "r-9");
        assert!(json.get("data").is_none());
    }

    struct FailingSink;

    impl LogSink for FailingSink {
        fn send(&self, _record: &LogRecord) -> Result<(), SinkError> {
            Err(SinkError::Unavailable("down".into()))
        }
    }

    #[test]
    fn sink_failures_are_counted() {
        let layer = TemplateLayer::new(TemplateConfig::default(), Arc::new(FailingSink));
        let failed = Arc::clone(&layer.failed_events);
        let emitted = Arc::clone(&layer.emitted_events);
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("lost");
        });
        assert_eq!(failed.load(Ordering::Relaxed), 1);
        assert_eq!(emitted.load(Ordering::Relaxed), 0);
    }
}
