//! Heading identifier derivation.

/// Derive an anchor identifier from heading text.
///
/// Lowercases the text, turns every `&` into `n` and every space into `-`.
/// Nothing else is touched, so `"Setup & Install"` becomes `"setup-n-install"`.
pub fn slugify(text: &str) -> String {
    text.to_lowercase().replace('&', "n").replace(' ', "-")
}

/// Compose a subheading identifier from its parent's identifier and its own slug.
///
/// Returns `None` when either half is empty.
pub fn compose_id(parent: &str, slug: &str) -> Option<String> {
    if parent.is_empty() || slug.is_empty() {
        return None;
    }
    Some(format!("{}-{}", parent, slug))
}
