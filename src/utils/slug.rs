//! Slug normalization.

/// Slug used for requests to the site root.
pub const ROOT_SLUG: &str = "/";

/// Normalizes a request path into a lookup slug.
///
/// Strips the leading slash and a single trailing slash. An empty result maps
/// to [`ROOT_SLUG`] so the root redirect gets its own record instead of an
/// empty key. Inner slashes are kept; slugs are case-sensitive.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_slug("/docs/"), "docs");
/// assert_eq!(normalize_slug("/"), "/");
/// assert_eq!(normalize_slug("/team/intro"), "team/intro");
/// ```
pub fn normalize_slug(path: &str) -> String {
    let slug = path.strip_prefix('/').unwrap_or(path);
    let slug = slug.strip_suffix('/').unwrap_or(slug);

    if slug.is_empty() {
        ROOT_SLUG.to_string()
    } else {
        slug.to_string()
    }
}
