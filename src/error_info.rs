use serde::{Deserialize, Serialize};
use std::backtrace::Backtrace;
use std::error::Error;
use std::fmt;

/// Kind reported for errors whose concrete type is not known.
pub const DEFAULT_ERROR_KIND: &str = "Error";

/// Serializable description of an error attached to a log call.
///
/// Produced either from a positional error argument or from an error value
/// stored in structured data. Serialized as
/// `{"type": .., "message": .., "stack": ..}` so that the output keeps a
/// type discriminator next to the message and trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorInfo {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Attach a freshly captured backtrace as the stack.
    ///
    /// Capture honours `RUST_BACKTRACE` / `RUST_LIB_BACKTRACE`; when capture
    /// is disabled the stack is left untouched.
    pub fn with_backtrace(mut self) -> Self {
        let bt = Backtrace::capture();
        if let std::backtrace::BacktraceStatus::Captured = bt.status() {
            self.stack = Some(bt.to_string());
        }
        self
    }

    /// Describe a type-erased error.
    ///
    /// The message is the error's `Display` output and the stack is built
    /// from its `source()` chain, one `caused by:` line per source.
    pub fn from_error(err: &(dyn Error + 'static)) -> Self {
        Self {
            kind: DEFAULT_ERROR_KIND.to_string(),
            message: err.to_string(),
            stack: source_chain(err),
        }
    }

    /// Same as [`ErrorInfo::from_error`] but keeps the concrete type name as
    /// the kind, e.g. `ParseIntError`.
    pub fn from_typed<E: Error + 'static>(err: &E) -> Self {
        Self {
            kind: short_type_name::<E>().to_string(),
            ..Self::from_error(err)
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

fn source_chain(err: &(dyn Error + 'static)) -> Option<String> {
    let mut lines = Vec::new();
    let mut current = err.source();
    while let Some(cause) = current {
        lines.push(format!("caused by: {}", cause));
        current = cause.source();
    }
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    // Strip generic parameters before taking the last path segment.
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
