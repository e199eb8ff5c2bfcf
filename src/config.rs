use crate::env::{
    env_var, LOG_TEMPLATE_ARGS_KEY_ENV, LOG_TEMPLATE_DATA_KEY_ENV, LOG_TEMPLATE_ERROR_KEY_ENV,
    LOG_TEMPLATE_MESSAGE_TEMPLATE_KEY_ENV, LOG_TEMPLATE_UNWRAP_ERRORS_ENV,
    LOG_TEMPLATE_UNWRAP_KEYS_ENV,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MESSAGE_TEMPLATE_KEY: &str = "msg_tpl";
pub const DEFAULT_DATA_KEY: &str = "data";
pub const DEFAULT_ARGS_KEY: &str = "args";
pub const DEFAULT_ERROR_KEY: &str = "err";

/// Output field names and unwrapping behavior for templated log calls.
///
/// **Fields**
/// - `message_template_key`: field holding the raw, uninterpolated template.
/// - `data_key`: field holding the structured data left after lifting.
///   Also accepted as `structured_data_key` when deserialized.
/// - `args_key`: field holding residual arguments no placeholder consumed.
/// - `error_key`: field for the promoted error; also the structured-data key
///   inspected for an error to promote.
/// - `unwrap_errors`: promote an error found under `error_key` in
///   structured data to the top level.
/// - `unwrap_keys`: structured-data keys moved to the top level of the record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    pub message_template_key: String,
    #[serde(alias = "structured_data_key")]
    pub data_key: String,
    pub args_key: String,
    pub error_key: String,
    pub unwrap_errors: bool,
    pub unwrap_keys: Vec<String>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            message_template_key: DEFAULT_MESSAGE_TEMPLATE_KEY.to_string(),
            data_key: DEFAULT_DATA_KEY.to_string(),
            args_key: DEFAULT_ARGS_KEY.to_string(),
            error_key: DEFAULT_ERROR_KEY.to_string(),
            unwrap_errors: true,
            unwrap_keys: Vec::new(),
        }
    }
}

/// Error returned when building a [`TemplateConfig`] from the environment.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid boolean value {value:?} for {key}")]
    InvalidBool { key: String, value: String },
}

impl TemplateConfig {
    pub fn with_message_template_key(mut self, key: impl Into<String>) -> Self {
        self.message_template_key = key.into();
        self
    }

    pub fn with_data_key(mut self, key: impl Into<String>) -> Self {
        self.data_key = key.into();
        self
    }

    pub fn with_args_key(mut self, key: impl Into<String>) -> Self {
        self.args_key = key.into();
        self
    }

    pub fn with_error_key(mut self, key: impl Into<String>) -> Self {
        self.error_key = key.into();
        self
    }

    pub fn with_unwrap_errors(mut self, enabled: bool) -> Self {
        self.unwrap_errors = enabled;
        self
    }

    pub fn with_unwrap_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unwrap_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Build a config from defaults overridden by `LOG_TEMPLATE_*`
    /// environment variables.
    ///
    /// **Returns**
    /// - `Err(ConfigError::InvalidBool)` if `LOG_TEMPLATE_UNWRAP_ERRORS` is
    ///   set to something other than `true`, `false`, `1` or `0`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_var)
    }

    /// Same as [`TemplateConfig::from_env`] with an explicit variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup(LOG_TEMPLATE_MESSAGE_TEMPLATE_KEY_ENV) {
            config.message_template_key = v;
        }
        if let Some(v) = lookup(LOG_TEMPLATE_DATA_KEY_ENV) {
            config.data_key = v;
        }
        if let Some(v) = lookup(LOG_TEMPLATE_ARGS_KEY_ENV) {
            config.args_key = v;
        }
        if let Some(v) = lookup(LOG_TEMPLATE_ERROR_KEY_ENV) {
            config.error_key = v;
        }
        if let Some(v) = lookup(LOG_TEMPLATE_UNWRAP_ERRORS_ENV) {
            config.unwrap_errors = parse_bool(LOG_TEMPLATE_UNWRAP_ERRORS_ENV, &v)?;
        }
        if let Some(v) = lookup(LOG_TEMPLATE_UNWRAP_KEYS_ENV) {
            config.unwrap_keys = v
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
