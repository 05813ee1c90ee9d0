//! Host canonicalization and RFC 6265bis domain/path matching.
//!
//! Modeled after Chromium's `net/cookies/cookie_util.cc`. Everything here is
//! pure: the acceptance pipeline and the store both build on these helpers.

use crate::cookies::psl::{registered_domain_for, PublicSuffixList};
use std::net::{IpAddr, Ipv6Addr};
use url::{Host, Url};

/// Normalize a host name or Domain attribute value.
///
/// Trims whitespace, drops one leading dot, strips IPv6 literal brackets,
/// converts IDNs to their ASCII form and lowercases.
pub fn canonicalize_host(host: &str) -> String {
    let host = host.trim();
    let host = host.strip_prefix('.').unwrap_or(host);
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    if let Ok(addr) = host.parse::<Ipv6Addr>() {
        return addr.to_string();
    }

    match Host::parse(host) {
        Ok(Host::Domain(domain)) => domain,
        Ok(Host::Ipv4(addr)) => addr.to_string(),
        Ok(Host::Ipv6(addr)) => addr.to_string(),
        Err(_) => host.to_lowercase(),
    }
}

/// Canonical host of a request URL, or `None` for host-less URLs.
pub fn canonical_host_for_url(url: &Url) -> Option<String> {
    match url.host()? {
        Host::Domain(domain) => Some(canonicalize_host(domain)),
        Host::Ipv4(addr) => Some(addr.to_string()),
        Host::Ipv6(addr) => Some(addr.to_string()),
    }
}

/// Whether `host` is an IPv4 or IPv6 literal (brackets allowed).
pub fn is_ip_address(host: &str) -> bool {
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    host.parse::<IpAddr>().is_ok()
}

/// Whether a request host falls under a cookie domain.
///
/// Both arguments must already be canonical. A suffix match never applies
/// to IP literals: `1.2.3.4` only matches itself.
pub fn domain_match(host: &str, domain: &str) -> bool {
    if host == domain {
        return true;
    }
    if domain.is_empty() || is_ip_address(host) {
        return false;
    }

    host.len() > domain.len()
        && host.ends_with(domain)
        && host.as_bytes()[host.len() - domain.len() - 1] == b'.'
}

/// Whether a request path falls under a cookie path.
pub fn path_match(request_path: &str, cookie_path: &str) -> bool {
    if request_path == cookie_path {
        return true;
    }

    if let Some(rest) = request_path.strip_prefix(cookie_path) {
        // Cookie path is a prefix
        return cookie_path.ends_with('/') || rest.starts_with('/');
    }

    false
}

/// Default cookie path for a request URI path: its directory.
pub fn default_path(uri_path: &str) -> &str {
    if !uri_path.starts_with('/') {
        return "/";
    }

    match uri_path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &uri_path[..idx],
    }
}

/// Domains under which cookies for `domain` may be stored, shortest first.
///
/// Walks from the registrable domain down to `domain` itself, so that a store
/// can look up each bucket directly. IP literals and domains without a
/// registrable part only yield themselves.
pub fn permute_domain(
    domain: &str,
    list: &dyn PublicSuffixList,
    allow_special_use: bool,
) -> Vec<String> {
    if is_ip_address(domain) {
        return vec![domain.to_string()];
    }

    let registered = match registered_domain_for(list, domain, allow_special_use) {
        Ok(Some(registered)) => registered,
        _ => return vec![domain.to_string()],
    };
    if registered == domain {
        return vec![registered];
    }

    let prefix = match domain
        .strip_suffix(registered.as_str())
        .and_then(|p| p.strip_suffix('.'))
    {
        Some(prefix) => prefix,
        None => return vec![domain.to_string()],
    };

    let mut current = registered;
    let mut permutations = vec![current.clone()];
    for label in prefix.rsplit('.') {
        current = format!("{}.{}", label, current);
        permutations.push(current.clone());
    }
    permutations
}

/// Parent domains above the shortest [`permute_domain`] bucket, nearest
/// first. Only a jar that accepts Domain attributes naming public suffixes
/// stores cookies there.
pub fn suffix_domains(
    domain: &str,
    list: &dyn PublicSuffixList,
    allow_special_use: bool,
) -> Vec<String> {
    if is_ip_address(domain) {
        return Vec::new();
    }
    let Some(shortest) = permute_domain(domain, list, allow_special_use)
        .into_iter()
        .next()
    else {
        return Vec::new();
    };

    let mut parents = Vec::new();
    let mut rest = shortest.as_str();
    while let Some((_, parent)) = rest.split_once('.') {
        if parent.is_empty() {
            break;
        }
        parents.push(parent.to_string());
        rest = parent;
    }
    parents
}

/// Path prefixes of `path`, longest first, always ending with `/`.
pub fn permute_path(path: &str) -> Vec<String> {
    if path == "/" {
        return vec!["/".to_string()];
    }

    let mut permutations = vec![path.to_string()];
    let mut current = path;
    while current.len() > 1 {
        match current.rfind('/') {
            Some(0) | None => break,
            Some(idx) => {
                current = &current[..idx];
                permutations.push(current.to_string());
            }
        }
    }
    permutations.push("/".to_string());
    permutations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::psl::MozillaPsl;

    #[test]
    fn test_canonicalize_host() {
        assert_eq!(canonicalize_host("Example.COM"), "example.com");
        assert_eq!(canonicalize_host(".example.com"), "example.com");
        assert_eq!(canonicalize_host("  example.com  "), "example.com");
        assert_eq!(canonicalize_host("[::1]"), "::1");
        assert_eq!(canonicalize_host("[2001:DB8::1]"), "2001:db8::1");
        assert_eq!(canonicalize_host("127.0.0.1"), "127.0.0.1");
    }

    #[test]
    fn test_canonicalize_idn() {
        assert_eq!(canonicalize_host("münchen.de"), "xn--mnchen-3ya.de");
        assert_eq!(canonicalize_host("MÜNCHEN.de"), "xn--mnchen-3ya.de");
    }

    #[test]
    fn test_canonical_host_for_url() {
        let url = Url::parse("http://[::1]:8080/").unwrap();
        assert_eq!(canonical_host_for_url(&url).as_deref(), Some("::1"));

        let url = Url::parse("https://WWW.Example.com/a").unwrap();
        assert_eq!(
            canonical_host_for_url(&url).as_deref(),
            Some("www.example.com")
        );

        let url = Url::parse("data:text/plain,hi").unwrap();
        assert_eq!(canonical_host_for_url(&url), None);
    }

    #[test]
    fn test_domain_match() {
        assert!(domain_match("example.com", "example.com"));
        assert!(domain_match("www.example.com", "example.com"));
        assert!(domain_match("a.b.example.com", "example.com"));
        assert!(!domain_match("example.com", "www.example.com"));
        assert!(!domain_match("fooexample.com", "example.com"));
        assert!(!domain_match("example.com", ""));
    }

    #[test]
    fn test_domain_match_ip() {
        assert!(domain_match("1.2.3.4", "1.2.3.4"));
        assert!(!domain_match("1.2.3.4", "2.3.4"));
        assert!(!domain_match("1.2.3.4", "3.4"));
        assert!(domain_match("::1", "::1"));
    }

    #[test]
    fn test_path_match() {
        assert!(path_match("/", "/"));
        assert!(path_match("/a/b", "/a"));
        assert!(path_match("/a/b", "/a/"));
        assert!(path_match("/a/", "/a"));
        assert!(!path_match("/a", "/a/b"));
        assert!(!path_match("/ab", "/a"));
        assert!(path_match("/anything", "/"));
    }

    #[test]
    fn test_default_path() {
        assert_eq!(default_path(""), "/");
        assert_eq!(default_path("/"), "/");
        assert_eq!(default_path("foo"), "/");
        assert_eq!(default_path("/foo"), "/");
        assert_eq!(default_path("/foo/"), "/foo");
        assert_eq!(default_path("/foo/bar"), "/foo");
        assert_eq!(default_path("/foo/bar/baz.html"), "/foo/bar");
    }

    #[test]
    fn test_permute_domain() {
        let list = MozillaPsl;
        assert_eq!(
            permute_domain("a.b.example.com", &list, true),
            vec!["example.com", "b.example.com", "a.b.example.com"]
        );
        assert_eq!(permute_domain("example.com", &list, true), vec!["example.com"]);
        assert_eq!(permute_domain("com", &list, true), vec!["com"]);
        assert_eq!(permute_domain("10.0.0.1", &list, true), vec!["10.0.0.1"]);
    }

    #[test]
    fn test_permute_domain_special_use() {
        let list = MozillaPsl;
        assert_eq!(
            permute_domain("app.foo.localhost", &list, true),
            vec!["foo.localhost", "app.foo.localhost"]
        );
        assert_eq!(
            permute_domain("app.foo.localhost", &list, false),
            vec!["app.foo.localhost"]
        );
    }

    #[test]
    fn test_suffix_domains() {
        let list = MozillaPsl;
        assert_eq!(suffix_domains("www.example.com", &list, true), vec!["com"]);
        assert_eq!(
            suffix_domains("news.bbc.co.uk", &list, true),
            vec!["co.uk", "uk"]
        );
        assert!(suffix_domains("com", &list, true).is_empty());
        assert!(suffix_domains("10.0.0.1", &list, true).is_empty());
    }

    #[test]
    fn test_permute_path() {
        assert_eq!(permute_path("/"), vec!["/"]);
        assert_eq!(permute_path("/foo"), vec!["/foo", "/"]);
        assert_eq!(
            permute_path("/foo/bar/baz"),
            vec!["/foo/bar/baz", "/foo/bar", "/foo", "/"]
        );
    }
}
