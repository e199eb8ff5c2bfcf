//! Environment variable names used by this crate for configuring the
//! template output from a service's environment.
//!
//! These are purely helpers; [`crate::config::TemplateConfig`] can be built
//! without touching the environment.

/// Field name for the raw template, e.g. `msg_tpl`.
pub const LOG_TEMPLATE_MESSAGE_TEMPLATE_KEY_ENV: &str = "LOG_TEMPLATE_MESSAGE_TEMPLATE_KEY";

/// Field name for the structured data container.
pub const LOG_TEMPLATE_DATA_KEY_ENV: &str = "LOG_TEMPLATE_DATA_KEY";

/// Field name for residual arguments.
pub const LOG_TEMPLATE_ARGS_KEY_ENV: &str = "LOG_TEMPLATE_ARGS_KEY";

/// Field name for the promoted error.
pub const LOG_TEMPLATE_ERROR_KEY_ENV: &str = "LOG_TEMPLATE_ERROR_KEY";

/// `true`/`false` (or `1`/`0`): promote errors found in structured data.
pub const LOG_TEMPLATE_UNWRAP_ERRORS_ENV: &str = "LOG_TEMPLATE_UNWRAP_ERRORS";

/// Comma-separated structured-data keys lifted to the top level.
pub const LOG_TEMPLATE_UNWRAP_KEYS_ENV: &str = "LOG_TEMPLATE_UNWRAP_KEYS";

/// Read an environment variable, treating unset and non-unicode alike.
pub fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    env_var(key).unwrap_or_else(|| default.to_string())
}
