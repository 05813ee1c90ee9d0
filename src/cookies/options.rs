//! Jar-wide policy and per-call options.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// How `__Secure-` and `__Host-` name prefixes are enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefixSecurity {
    /// Violations are reported as errors.
    Strict,
    /// Violating cookies are dropped without an error.
    #[default]
    Silent,
    /// Prefixes carry no special meaning.
    Disabled,
}

/// Jar policy. Fixed once the jar is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieMonsterConfig {
    /// Refuse Domain attributes naming a public suffix.
    ///
    /// When off, such cookies are stored under the suffix and sent to every
    /// host below it.
    pub reject_public_suffixes: bool,

    /// Accept nameless cookies (`=value`, bare `value`).
    pub loose_mode: bool,

    /// Treat `localhost`, `*.test` and the other RFC 6761 names as registrable.
    pub allow_special_use_domain: bool,

    pub prefix_security: PrefixSecurity,
}

impl Default for CookieMonsterConfig {
    fn default() -> Self {
        Self {
            reject_public_suffixes: true,
            loose_mode: false,
            allow_special_use_domain: true,
            prefix_security: PrefixSecurity::Silent,
        }
    }
}

/// Same-site relationship between the request and its initiator, supplied
/// by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SameSiteContext {
    Strict,
    Lax,
    CrossSite,
}

impl SameSiteContext {
    /// `CrossSite` < `Lax` < `Strict`, on the same scale as
    /// [`SameSite::level`](crate::cookies::canonicalcookie::SameSite::level).
    pub fn level(&self) -> u8 {
        match self {
            SameSiteContext::CrossSite => 1,
            SameSiteContext::Lax => 2,
            SameSiteContext::Strict => 3,
        }
    }
}

/// Options for storing a cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetCookieOptions {
    /// The cookie arrived over HTTP rather than a script API.
    pub http: bool,

    /// Whether the request was secure. `None` derives it from the URL scheme.
    pub secure: Option<bool>,

    pub same_site_context: Option<SameSiteContext>,

    /// Turn exclusions into `Ok(None)` instead of errors.
    pub ignore_error: bool,

    /// Overrides the jar's loose mode for this call.
    pub loose: Option<bool>,

    /// Current time. `None` reads the system clock.
    pub now: Option<OffsetDateTime>,
}

impl Default for SetCookieOptions {
    fn default() -> Self {
        Self {
            http: true,
            secure: None,
            same_site_context: None,
            ignore_error: false,
            loose: None,
            now: None,
        }
    }
}

impl SetCookieOptions {
    /// Options for a script (non-HTTP) caller.
    pub fn non_http() -> Self {
        Self {
            http: false,
            ..Self::default()
        }
    }

    pub fn at(now: OffsetDateTime) -> Self {
        Self {
            now: Some(now),
            ..Self::default()
        }
    }
}

/// Options for retrieving cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetCookieOptions {
    /// Include HttpOnly cookies.
    pub http: bool,

    /// Whether the request is secure. `None` derives it from the URL scheme.
    pub secure: Option<bool>,

    pub same_site_context: Option<SameSiteContext>,

    /// Evict and skip expired cookies.
    pub expire: bool,

    /// Ignore the request path.
    pub all_paths: bool,

    /// Apply the retrieval order (longest path, then oldest).
    pub sort: bool,

    /// Current time. `None` reads the system clock.
    pub now: Option<OffsetDateTime>,
}

impl Default for GetCookieOptions {
    fn default() -> Self {
        Self {
            http: true,
            secure: None,
            same_site_context: None,
            expire: true,
            all_paths: false,
            sort: true,
            now: None,
        }
    }
}

impl GetCookieOptions {
    pub fn non_http() -> Self {
        Self {
            http: false,
            ..Self::default()
        }
    }

    pub fn at(now: OffsetDateTime) -> Self {
        Self {
            now: Some(now),
            ..Self::default()
        }
    }
}
