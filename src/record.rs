use crate::assemble::{passthrough_message, Augmented};
use crate::value::{Fields, LogValue};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::Level;

/// Top-level names owned by the record itself.
pub const RESERVED_KEYS: [&str; 7] = [
    "timestamp",
    "level",
    "target",
    "module_path",
    "file",
    "line",
    "msg",
];

/// Prefix given to a bound or lifted key that clashes with [`RESERVED_KEYS`].
pub const RENAMED_KEY_PREFIX: &str = "field_";

/// A log entry as handed to a [`crate::sink::LogSink`].
///
/// `fields` holds the logger bindings overlaid by the template augmentation
/// (`msg_tpl`, `data`, `err`, `args` and lifted keys); both are flattened
/// into the top level when serialized. A key named like one of the record's
/// own fields is kept under [`RENAMED_KEY_PREFIX`] + name instead.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(flatten)]
    pub fields: Fields,
    pub msg: String,
    /// Arguments left over after templating, in call order. Already
    /// reported under the args field, so not serialized again.
    #[serde(skip)]
    pub residual: Vec<LogValue>,
}

impl LogRecord {
    /// Record for a call that went through the template pipeline.
    pub fn templated(
        level: Level,
        target: impl Into<String>,
        bindings: &Fields,
        augmented: Augmented,
    ) -> Self {
        let mut fields = bindings.clone();
        fields.extend(augmented.record.into_fields());
        Self::base(level, target, fields, augmented.message, augmented.residual)
    }

    /// Record for a call without a template shape: only bindings, and the
    /// arguments joined as the message.
    pub fn passthrough(
        level: Level,
        target: impl Into<String>,
        bindings: &Fields,
        args: &[LogValue],
    ) -> Self {
        Self::base(
            level,
            target,
            bindings.clone(),
            passthrough_message(args),
            args.to_vec(),
        )
    }

    fn base(
        level: Level,
        target: impl Into<String>,
        fields: Fields,
        msg: String,
        residual: Vec<LogValue>,
    ) -> Self {
        LogRecord {
            timestamp: Utc::now(),
            level: level.to_string(),
            target: target.into(),
            module_path: None,
            file: None,
            line: None,
            fields: rename_reserved(fields),
            msg,
            residual,
        }
    }

    pub fn with_location(
        mut self,
        module_path: Option<&str>,
        file: Option<&str>,
        line: Option<u32>,
    ) -> Self {
        self.module_path = module_path.map(str::to_string);
        self.file = file.map(str::to_string);
        self.line = line;
        self
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

fn rename_reserved(fields: Fields) -> Fields {
    let mut out = Fields::new();
    let mut clashing = Vec::new();
    for (key, value) in fields {
        if RESERVED_KEYS.contains(&key.as_str()) {
            clashing.push((key, value));
        } else {
            out.insert(key, value);
        }
    }
    for (key, value) in clashing {
        let mut renamed = format!("{}{}", RENAMED_KEY_PREFIX, key);
        while out.contains_key(&renamed) {
            renamed.insert_str(0, RENAMED_KEY_PREFIX);
        }
        out.insert(renamed, value);
    }
    out
}
