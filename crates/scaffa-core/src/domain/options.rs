//! Option mappings and the deep-merge rule shared by every layer.
//!
//! Options are ordered JSON objects. Merging combines N mappings left to
//! right: later keys override earlier ones, and nested objects are merged
//! key by key instead of being replaced wholesale.

use serde_json::Value;

/// An ordered option mapping.
pub type Options = serde_json::Map<String, Value>;

/// Deep-merge `overlay` into `base`.
///
/// Objects on both sides are merged recursively; any other value on the
/// right replaces the value on the left.
pub fn merge(base: &mut Options, overlay: &Options) {
    for (key, value) in overlay {
        match (base.get_mut(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => merge(existing, incoming),
            _ => {
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Fold `layers` left to right into a fresh mapping (rightmost wins).
pub fn merge_all<'a, I>(layers: I) -> Options
where
    I: IntoIterator<Item = &'a Options>,
{
    let mut merged = Options::new();
    for layer in layers {
        merge(&mut merged, layer);
    }
    merged
}

/// Interpret `value` as an option mapping.
///
/// `null` (or a missing key) is an empty mapping.
pub fn from_value(value: Value) -> Option<Options> {
    match value {
        Value::Object(map) => Some(map),
        Value::Null => Some(Options::new()),
        _ => None,
    }
}

/// Read a boolean flag, treating anything but `true` as unset.
pub fn flag(options: &Options, key: &str) -> bool {
    matches!(options.get(key), Some(Value::Bool(true)))
}
