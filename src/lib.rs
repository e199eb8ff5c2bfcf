//! Message-template interpolation for structured logging.
//!
//! Callers write a human-readable template with `{name}` placeholders and
//! pass structured values alongside it. Each call produces an interpolated
//! message plus a separate structured payload:
//!
//! ```
//! use std::sync::Arc;
//! use templated_log::{args, logger::Logger, sink::MemorySink};
//!
//! let sink = Arc::new(MemorySink::new());
//! let log = Logger::new(sink.clone());
//! log.info(&args!["User {user_id} logged in from {location}", 12345, "Salzburg"]);
//!
//! let records = sink.records();
//! assert_eq!(records[0].msg, "User 12345 logged in from Salzburg");
//! ```

pub mod value;
pub mod error_info;
pub mod classify;
pub mod format;
pub mod matcher;
pub mod assemble;
pub mod config;
pub mod env;
pub mod record;
pub mod sink;
pub mod logger;
pub mod layer;
pub mod init;

mod macros;

/// `tracing` target of the crate's own diagnostics. Events with this target
/// are never templated by [`layer::TemplateLayer`].
pub const INTERNAL_TARGET: &str = "templated_log";

pub use assemble::{augment, Augmented, OutputRecord};
pub use config::TemplateConfig;
pub use error_info::ErrorInfo;
pub use logger::Logger;
pub use value::{ArgKind, Fields, LogValue};
