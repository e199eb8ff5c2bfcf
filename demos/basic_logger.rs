use std::sync::Arc;

use templated_log::record::LogRecord;
use templated_log::sink::{LogSink, SinkError};
use templated_log::{args, fields, ErrorInfo, Logger, TemplateConfig};

/// Prints every record as a JSON line. A real service would write to its
/// own log pipeline here.
struct JsonLineSink;

impl LogSink for JsonLineSink {
    fn send(&self, record: &LogRecord) -> Result<(), SinkError> {
        let json = record
            .to_json()
            .map_err(|e| SinkError::Unavailable(e.to_string()))?;
        println!("{}", json);
        Ok(())
    }
}

fn main() {
    let config = TemplateConfig::default().with_unwrap_keys(["request_id"]);
    let root = Logger::with_config(config, Arc::new(JsonLineSink)).target("checkout");
    let log = root.child(fields! { "service" => "checkout", "region" => "eu-central" });

    // Named values.
    log.info(&args![
        "User {user_id} logged in from {location}",
        fields! { "user_id" => 12345, "location" => "Salzburg" }
    ]);

    // Positional values fill the same template.
    log.info(&args!["User {user_id} logged in from {location}", 12345, "Salzburg"]);

    // Context object, template, then the dedicated data object.
    log.warn(&args![
        fields! { "request_id" => "req-81", "user_id" => 9999 },
        "Cart of user {user_id} is worth {total} in {region}",
        fields! { "user_id" => 12345, "total" => 19.99 }
    ]);

    // Leading error.
    let parse_err = "12x".parse::<u32>().unwrap_err();
    log.error(&args![
        ErrorInfo::from_typed(&parse_err),
        "Could not parse quantity {raw}",
        "12x"
    ]);

    // Error under the error key of the data object is promoted as well.
    log.error(&args![
        "Payment {payment_id} declined",
        fields! {
            "payment_id" => "pay-3",
            "err" => ErrorInfo::new("PaymentError", "card declined").with_backtrace()
        }
    ]);

    // No template shape: emitted as-is.
    log.debug(&args![404, "not found"]);
}
