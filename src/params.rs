use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::queue::Segment;

/// Placeholder in a base URL that the serialized parameters replace in
/// place instead of being appended as a query suffix.
pub const EXTRA_URL_PARAMS_PLACEHOLDER: &str = "${extraUrlParams}";

/// `encodeURIComponent`'s escape set: everything except ASCII
/// alphanumerics and `- _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Merge call-level pairs over endpoint-level pairs. A call-level value
/// overwrites an identically-keyed endpoint-level pair in place; new
/// keys append in call order.
pub fn merge_params(
    base: &[(String, String)],
    overrides: Vec<(String, String)>,
) -> Vec<(String, String)> {
    let mut merged = base.to_vec();
    for (key, value) in overrides {
        match merged.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => merged.push((key, value)),
        }
    }
    merged
}

/// Flatten segments into one ordered pair sequence: segments in enqueue
/// order, each segment's pairs in their own order. Identical keys across
/// segments are never deduplicated; repeated-key query strings such as
/// `e1=e1&e1=e1` are intentional.
pub fn merge_segments(segments: &[Segment]) -> Vec<(String, String)> {
    segments
        .iter()
        .flat_map(|segment| segment.params.iter().cloned())
        .collect()
}

/// Serialize pairs as a query string, percent-encoding each key and
/// value exactly once.
pub fn serialize(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                utf8_percent_encode(key, COMPONENT),
                utf8_percent_encode(value, COMPONENT)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Place a serialized query into a base URL: replace the
/// `${extraUrlParams}` placeholder when present, otherwise append with
/// `?` or `&` depending on whether the base already has a query
/// component.
pub fn attach(base_url: &str, serialized: &str) -> String {
    if base_url.contains(EXTRA_URL_PARAMS_PLACEHOLDER) {
        return base_url.replace(EXTRA_URL_PARAMS_PLACEHOLDER, serialized);
    }
    if serialized.is_empty() {
        return base_url.to_owned();
    }
    let joiner = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{joiner}{serialized}")
}
