//! Store configuration.

use serde::{Deserialize, Serialize};

/// Options forwarded to the change emitter on every write.
///
/// Deserializes from JSON with every field optional:
///
/// ```
/// use simple_store::StoreOptions;
///
/// let opts: StoreOptions = serde_json::from_str(r#"{"idProp": "key"}"#).unwrap();
/// assert_eq!(opts.id_prop, "key");
/// let opts: StoreOptions = serde_json::from_str("{}").unwrap();
/// assert_eq!(opts, StoreOptions::default());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreOptions {
    /// Field that identifies array elements across writes.
    pub id_prop: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            id_prop: "id".to_string(),
        }
    }
}

impl StoreOptions {
    pub fn with_id_prop(mut self, id_prop: impl Into<String>) -> Self {
        self.id_prop = id_prop.into();
        self
    }
}
