use fielddata_common::{Result, error::Error};
use serde::{Deserialize, Serialize};

/// Options of a numeric field data build.
///
/// Passed explicitly to every build; missing keys take their defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldDataSettings {
    /// Store the unique values at the narrowest integer width that holds their range.
    pub optimize_type: bool,
    /// Replace the ordinals of a single-valued field by a dense per-document array
    /// when that is cheaper.
    pub remove_ords_on_single_value: bool,
}

impl Default for FieldDataSettings {
    fn default() -> Self {
        FieldDataSettings {
            optimize_type: true,
            remove_ords_on_single_value: true,
        }
    }
}

impl FieldDataSettings {
    pub fn from_json(json: &str) -> Result<FieldDataSettings> {
        serde_json::from_str(json).map_err(|e| Error::invalid_arg("settings", e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::invalid_arg("settings", e.to_string()))
    }
}
