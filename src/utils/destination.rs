//! Destination URL parsing and redirect target construction.

use url::Url;

use super::query::{combine_queries, parse_query};
use super::slug::ROOT_SLUG;
use crate::error::ResolveError;

/// Placeholder origin used to normalize relative destinations.
const RELATIVE_BASE: &str = "http://relative.invalid/";

/// True for destinations that are a path on the service's own host.
///
/// `//host/path` is a network-path reference, not a relative path.
pub fn is_relative_destination(raw: &str) -> bool {
    let raw = raw.trim();
    raw.starts_with('/') && !raw.starts_with("//")
}

/// Parses a stored absolute destination.
///
/// Destinations saved without a scheme (`example.com/page`) are retried once
/// with an `http://` prefix. Values starting with `/` are never retried, since
/// the prefix would turn their first path segment into a host. The stored
/// string is used as-is; it is never percent-decoded first.
///
/// # Errors
///
/// Returns [`ResolveError::MalformedDestination`] if neither form parses or
/// the destination starts with `/`.
pub fn parse_destination(raw: &str) -> Result<Url, ResolveError> {
    let raw = raw.trim();
    let malformed = || ResolveError::MalformedDestination(raw.to_string());

    if raw.starts_with('/') || raw.starts_with('\\') {
        return Err(malformed());
    }

    if let Ok(url) = Url::parse(raw)
        && url.has_host()
    {
        return Ok(url);
    }

    Url::parse(&format!("http://{raw}"))
        .ok()
        .filter(Url::has_host)
        .ok_or_else(malformed)
}

/// Resolves a relative destination against a placeholder origin.
///
/// Rejects paths the URL parser would reinterpret as another host, such as
/// `/\evil.example`.
fn parse_relative(raw: &str) -> Result<Url, ResolveError> {
    let raw = raw.trim();
    let malformed = || ResolveError::MalformedDestination(raw.to_string());

    let base = Url::parse(RELATIVE_BASE).map_err(|_| malformed())?;
    let url = base.join(raw).map_err(|_| malformed())?;

    if url.origin() != base.origin() {
        return Err(malformed());
    }
    Ok(url)
}

/// Checks that a destination can be redirected to, absolute or relative.
///
/// # Errors
///
/// Returns [`ResolveError::MalformedDestination`] if it cannot.
pub fn check_destination(raw: &str) -> Result<(), ResolveError> {
    if is_relative_destination(raw) {
        parse_relative(raw).map(|_| ())
    } else {
        parse_destination(raw).map(|_| ())
    }
}

/// Builds the final redirect target.
///
/// Origin and path come from the destination, the query is the merge of the
/// destination's and the request's parameters, and the destination fragment
/// is kept. A relative destination yields a relative target (path, query and
/// fragment) that the client resolves against the host it asked.
///
/// # Errors
///
/// Returns [`ResolveError::MalformedDestination`] if the destination does not parse.
pub fn build_redirect_url(destination: &str, request_query: &str) -> Result<String, ResolveError> {
    if is_relative_destination(destination) {
        let url = parse_relative(destination)?;
        let (query, fragment) = merged_suffix(&url, request_query);
        return Ok(format!("{}{}{}", url.path(), query, fragment));
    }

    let mut url = parse_destination(destination)?;
    let (query, fragment) = merged_suffix(&url, request_query);

    url.set_query(None);
    url.set_fragment(None);

    Ok(format!("{}{}{}", url.as_str(), query, fragment))
}

/// Merged query string and fragment suffix for `url`.
fn merged_suffix(url: &Url, request_query: &str) -> (String, String) {
    let query = combine_queries(
        &parse_query(url.query().unwrap_or_default()),
        &parse_query(request_query),
    );
    let fragment = url.fragment().map(|f| format!("#{f}")).unwrap_or_default();
    (query, fragment)
}

/// Builds the fallback redirect for a slug that could not be resolved.
///
/// The slug is appended to `base` as percent-encoded path segments. The root
/// slug maps to `base` itself.
pub fn fallback_url(base: &Url, slug: &str) -> String {
    if slug == ROOT_SLUG {
        return base.to_string();
    }

    let mut url = base.clone();
    match url.path_segments_mut() {
        Ok(mut segments) => {
            segments.pop_if_empty();
            segments.extend(slug.split('/'));
        }
        Err(()) => return format!("{base}{slug}"),
    }

    url.to_string()
}
