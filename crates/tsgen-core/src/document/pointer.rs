use serde_json::Value;

use super::node::unescape_segment;

/// Resolve a `#/`-rooted location reference against a raw document value.
///
/// Sequences consume the segment as a numeric index; mappings consume it as
/// a field name. A scalar mid-pointer, a non-numeric or out-of-range index,
/// or an absent field all resolve to `None`; "not found" is never an error
/// at this layer.
pub fn resolve<'a>(document: &'a Value, pointer: &str) -> Option<&'a Value> {
    let mut current = document;
    for raw in pointer
        .trim_start_matches('#')
        .split('/')
        .filter(|s| !s.is_empty())
    {
        let segment = unescape_segment(raw);
        current = match current {
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            Value::Object(map) => map.get(&segment)?,
            _ => return None,
        };
    }
    Some(current)
}
