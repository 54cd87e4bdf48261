use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_MAX_LISTENERS;

/// Settings for an [`EventEmitter`](crate::EventEmitter).
///
/// Derives serde so it can be embedded in an application's own settings file.
///
/// # Example
/// ```
/// use typed_events::EmitterConfig;
///
/// let config: EmitterConfig = serde_json::from_str(r#"{ "max_listeners": 3 }"#).unwrap();
/// assert_eq!(config.max_listeners, 3);
///
/// let config: EmitterConfig = serde_json::from_str("{}").unwrap();
/// assert_eq!(config, EmitterConfig::default());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Listener count per event above which a warning is logged.
    /// Registration never fails. `0` disables the warning.
    pub max_listeners: usize,
}

impl EmitterConfig {
    pub fn with_max_listeners(mut self, max: usize) -> Self {
        self.max_listeners = max;
        self
    }
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            max_listeners: DEFAULT_MAX_LISTENERS,
        }
    }
}
