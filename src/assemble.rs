use crate::classify::{classify, Classified};
use crate::config::TemplateConfig;
use crate::error_info::ErrorInfo;
use crate::format::format_with;
use crate::matcher::match_residual;
use crate::value::{Fields, LogValue};
use serde::Serialize;
use serde_json::Value;

/// Top-level fields a templated call adds to the emitted record.
///
/// Keys are the configured names from [`TemplateConfig`] plus any keys
/// lifted out of the structured data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OutputRecord {
    fields: Fields,
}

impl OutputRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&LogValue> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: LogValue) -> Option<LogValue> {
        self.fields.insert(key.into(), value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &LogValue)> {
        self.fields.iter()
    }

    pub fn into_fields(self) -> Fields {
        self.fields
    }

    pub fn to_json(&self) -> Value {
        LogValue::Fields(self.fields.clone()).into_json()
    }
}

/// Result of running a call through the template pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Augmented {
    /// Fields merged into the host's record.
    pub record: OutputRecord,
    /// Fully interpolated message.
    pub message: String,
    /// Arguments no placeholder consumed, handed back to the host verbatim.
    pub residual: Vec<LogValue>,
}

/// Run classification, placeholder matching, formatting and assembly for
/// one call.
///
/// `bindings` are merged under the call data for placeholder resolution
/// only. They are not copied into the `data_key` container: the host
/// record carries them at its top level (see
/// [`crate::record::LogRecord::templated`]), so the output keeps call data
/// and logger context apart.
///
/// **Returns**
/// - `None` when the arguments have no template shape. The host should
///   emit the call with its default formatting, see [`passthrough_message`].
pub fn augment(config: &TemplateConfig, bindings: &Fields, args: &[LogValue]) -> Option<Augmented> {
    let Classified {
        template,
        mut structured,
        error,
        residual,
    } = classify(args).templated()?;

    let residual = match_residual(template, bindings, &mut structured, residual);
    let message = format_with(template, |name| {
        structured.get(name).or_else(|| bindings.get(name))
    });
    let residual: Vec<LogValue> = residual.into_iter().cloned().collect();
    let record = assemble(config, template, structured, error, &residual);

    Some(Augmented {
        record,
        message,
        residual,
    })
}

/// Build the [`OutputRecord`] for an already classified and matched call.
///
/// - The raw template goes under `message_template_key`.
/// - A positional error is always promoted to `error_key`. Without one, an
///   error value stored under `error_key` in `structured` is moved out when
///   `unwrap_errors` is set; a non-error value there stays in the data.
/// - Keys listed in `unwrap_keys` are moved to the top level unless that
///   field is already taken or is one of the configured container names
///   (`message_template_key`, `data_key`, `args_key`); such keys stay in
///   the data.
/// - Remaining data goes under `data_key`, residual arguments under
///   `args_key`; both are omitted when empty.
pub fn assemble(
    config: &TemplateConfig,
    template: &str,
    mut structured: Fields,
    error: Option<ErrorInfo>,
    residual: &[LogValue],
) -> OutputRecord {
    let mut record = OutputRecord::new();
    record.insert(
        config.message_template_key.clone(),
        LogValue::Str(template.to_string()),
    );

    match error {
        Some(err) => {
            record.insert(config.error_key.clone(), LogValue::Error(err));
        }
        None if config.unwrap_errors => {
            let holds_error = structured
                .get(&config.error_key)
                .is_some_and(LogValue::is_error);
            if holds_error {
                if let Some(err) = structured.remove(&config.error_key) {
                    record.insert(config.error_key.clone(), err);
                }
            }
        }
        None => {}
    }

    for key in &config.unwrap_keys {
        let is_container = *key == config.message_template_key
            || *key == config.data_key
            || *key == config.args_key;
        if is_container || record.contains_key(key) {
            continue;
        }
        if let Some(value) = structured.remove(key) {
            record.insert(key.clone(), value);
        }
    }

    if !structured.is_empty() {
        record.insert(config.data_key.clone(), LogValue::Fields(structured));
    }

    if !residual.is_empty() {
        let args = residual.iter().cloned().map(LogValue::into_json).collect();
        record.insert(config.args_key.clone(), LogValue::Json(Value::Array(args)));
    }

    record
}

/// Host-default message for calls without a template shape: every argument
/// stringified and joined by a single space.
pub fn passthrough_message(args: &[LogValue]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
