//! URL slugs derived from post titles.

/// Convert `title` into a URL slug.
///
/// ASCII letters are lowercased, digits and underscores are kept, runs of
/// whitespace and hyphens collapse into one hyphen, and every other character
/// is dropped. Leading and trailing hyphens and underscores are stripped.
///
/// ```
/// assert_eq!(inkpost_domain::slug::slugify("  Hello, World -- again! "), "hello-world-again");
/// ```
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch.is_whitespace() || ch == '-' {
            pending_dash = true;
        }
    }
    slug.trim_matches(|c| c == '-' || c == '_').to_owned()
}
