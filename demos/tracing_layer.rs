use std::sync::Arc;

use tracing::{error, info, info_span, warn};
use templated_log::init::{init_tracing_with_config, LayerConfig};
use templated_log::record::LogRecord;
use templated_log::sink::{LogSink, SinkError};
use templated_log::TemplateConfig;

/// Example of plugging a custom destination into the tracing layer.
struct PrintSink;

impl LogSink for PrintSink {
    fn send(&self, record: &LogRecord) -> Result<(), SinkError> {
        println!("[templated] {} {} | {:?}", record.level, record.msg, record.fields);
        Ok(())
    }
}

fn main() {
    let config = LayerConfig {
        template: TemplateConfig::from_env().unwrap_or_default(),
        enable_stdout: false,
    };
    if let Err(e) = init_tracing_with_config(Arc::new(PrintSink), config) {
        eprintln!("{}", e);
        return;
    }

    let span = info_span!("request", request_id = "req-7", user = "alice");
    let _guard = span.enter();

    info!(path = "/cart", "{{user}} opened {{path}}");
    warn!(items = 3, total = 19.99, "Cart of {{user}} holds {{items}} items worth {{total}}");

    let err = "x".parse::<i32>().unwrap_err();
    error!(
        err = &err as &(dyn std::error::Error + 'static),
        "Checkout for {{request_id}} failed"
    );
}
