//! The set of void tags: elements that take no closing tag unless
//! content is explicitly supplied for them.

use once_cell::sync::Lazy;
use std::collections::HashSet;

static VOID_TAGS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
        "meta", "param", "source", "track", "wbr",
    ]
    .into_iter()
    .collect()
});

/// Check if a tag renders without a closing tag. Matching is
/// case-sensitive; definitions use lowercase tag names.
pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(tag)
}
