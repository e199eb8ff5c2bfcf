use crate::error_info::ErrorInfo;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Structured key/value data attached to a log call, and the persistent
/// bindings of a logger.
pub type Fields = BTreeMap<String, LogValue>;

/// A single log call argument or structured-data value.
///
/// Call arguments are heterogeneous: a template string, plain data objects,
/// errors and arbitrary primitives. Each variant maps to exactly one
/// [`ArgKind`], which is what the classifier branches on.
#[derive(Debug, Clone, PartialEq)]
pub enum LogValue {
    Str(String),
    Fields(Fields),
    Error(ErrorInfo),
    /// Any other value: numbers, booleans, null, arrays.
    Json(Value),
}

/// Classification of a single argument by shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Template,
    Data,
    Error,
    Unknown,
}

impl LogValue {
    pub fn kind(&self) -> ArgKind {
        match self {
            LogValue::Str(_) => ArgKind::Template,
            LogValue::Fields(_) => ArgKind::Data,
            LogValue::Error(_) => ArgKind::Error,
            LogValue::Json(Value::String(_)) => ArgKind::Template,
            LogValue::Json(Value::Object(_)) => ArgKind::Data,
            LogValue::Json(_) => ArgKind::Unknown,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            LogValue::Str(s) => Some(s),
            LogValue::Json(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&ErrorInfo> {
        match self {
            LogValue::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LogValue::Error(_))
    }

    /// Plain data object view, if this value is one.
    ///
    /// A raw JSON object is converted on the fly so that `json!({..})`
    /// arguments classify the same way as [`Fields`].
    pub fn to_fields(&self) -> Option<Fields> {
        match self {
            LogValue::Fields(f) => Some(f.clone()),
            LogValue::Json(Value::Object(map)) => Some(
                map.iter()
                    .map(|(k, v)| (k.clone(), LogValue::from(v.clone())))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Convert into a plain JSON value.
    pub fn into_json(self) -> Value {
        match self {
            LogValue::Str(s) => Value::String(s),
            LogValue::Fields(f) => {
                Value::Object(f.into_iter().map(|(k, v)| (k, v.into_json())).collect())
            }
            LogValue::Error(e) => error_to_json(e),
            LogValue::Json(v) => v,
        }
    }
}

fn error_to_json(e: ErrorInfo) -> Value {
    let mut map = serde_json::Map::new();
    map.insert("type".to_string(), Value::String(e.kind));
    map.insert("message".to_string(), Value::String(e.message));
    if let Some(stack) = e.stack {
        map.insert("stack".to_string(), Value::String(stack));
    }
    Value::Object(map)
}

impl fmt::Display for LogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogValue::Str(s) => f.write_str(s),
            LogValue::Error(e) => write!(f, "{}", e),
            LogValue::Json(Value::String(s)) => f.write_str(s),
            LogValue::Json(v) => write!(f, "{}", v),
            LogValue::Fields(fields) => {
                let json = LogValue::Fields(fields.clone()).into_json();
                write!(f, "{}", json)
            }
        }
    }
}

impl Serialize for LogValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LogValue::Str(s) => serializer.serialize_str(s),
            LogValue::Error(e) => e.serialize(serializer),
            LogValue::Json(v) => v.serialize(serializer),
            LogValue::Fields(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (k, v) in fields {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl From<&str> for LogValue {
    fn from(s: &str) -> Self {
        LogValue::Str(s.to_string())
    }
}

impl From<String> for LogValue {
    fn from(s: String) -> Self {
        LogValue::Str(s)
    }
}

impl From<&String> for LogValue {
    fn from(s: &String) -> Self {
        LogValue::Str(s.clone())
    }
}

impl From<Fields> for LogValue {
    fn from(f: Fields) -> Self {
        LogValue::Fields(f)
    }
}

impl From<ErrorInfo> for LogValue {
    fn from(e: ErrorInfo) -> Self {
        LogValue::Error(e)
    }
}

impl From<Value> for LogValue {
    fn from(v: Value) -> Self {
        match v {
            Value::String(s) => LogValue::Str(s),
            Value::Object(map) => LogValue::Fields(
                map.into_iter()
                    .map(|(k, v)| (k, LogValue::from(v)))
                    .collect(),
            ),
            other => LogValue::Json(other),
        }
    }
}

impl<T: Into<LogValue>> From<Option<T>> for LogValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => LogValue::Json(Value::Null),
        }
    }
}

macro_rules! impl_from_json {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for LogValue {
                fn from(v: $t) -> Self {
                    LogValue::Json(Value::from(v))
                }
            }
        )*
    };
}

impl_from_json!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool);

// Outside the 64-bit range a JSON number would lose precision, so the
// decimal text is kept instead.
impl From<i128> for LogValue {
    fn from(v: i128) -> Self {
        match i64::try_from(v) {
            Ok(n) => LogValue::from(n),
            Err(_) => LogValue::Str(v.to_string()),
        }
    }
}

impl From<u128> for LogValue {
    fn from(v: u128) -> Self {
        match u64::try_from(v) {
            Ok(n) => LogValue::from(n),
            Err(_) => LogValue::Str(v.to_string()),
        }
    }
}
