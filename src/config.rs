//! Binding configuration.

use crate::access::DEFAULT_DATETIME_FORMATS;
use serde::{Deserialize, Serialize};

/// Default reserved column-name prefix for positional placeholders
pub const DEFAULT_PLACEHOLDER_PREFIX: &str = "fast_args_index_";

/// Settings shared by the binding compiler and the value conversions it plans
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    /// Column-name prefix marking a positional placeholder, followed by the slot index
    pub placeholder_prefix: String,
    /// chrono layouts tried in order when text is converted to a date-time
    pub datetime_formats: Vec<String>,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            placeholder_prefix: DEFAULT_PLACEHOLDER_PREFIX.to_string(),
            datetime_formats: DEFAULT_DATETIME_FORMATS
                .iter()
                .map(|f| f.to_string())
                .collect(),
        }
    }
}

impl BindingConfig {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Slot index encoded in a placeholder column name, e.g.
    /// `fast_args_index_2_marker` is slot 2.
    pub fn placeholder_slot(&self, column: &str) -> Option<usize> {
        let rest = column.strip_prefix(self.placeholder_prefix.as_str())?;
        let digits = rest.split('_').next()?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}
