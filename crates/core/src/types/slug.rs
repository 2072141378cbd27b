//! URL slug derivation for product names.

/// Derive a URL slug from a product name.
///
/// Lowercases the name, keeps ASCII alphanumerics and underscores,
/// collapses runs of whitespace and hyphens into a single hyphen, drops
/// every other character, and trims hyphens and underscores from both
/// ends. Slugs are derived once at product creation and are not
/// recomputed on rename.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;
    for ch in name.chars() {
        if ch.is_whitespace() || ch == '-' {
            pending_separator = !slug.is_empty();
        } else if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_separator {
                slug.push('-');
                pending_separator = false;
            }
            slug.push(ch.to_ascii_lowercase());
        }
        // other characters are dropped without splitting the current word
    }
    while slug.ends_with(['-', '_']) {
        slug.pop();
    }
    while slug.starts_with(['-', '_']) {
        slug.remove(0);
    }
    slug
}
