use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Why a cookie was not stored.
///
/// Mirrors Chromium's `CookieInclusionStatus::ExclusionReason`. Every variant
/// is a protocol-level rejection: expected, frequent, and never fatal.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ExclusionReason {
    #[error("Cookie failed to parse")]
    FailedToParse,
    #[error("Cookie has an empty name and an empty value")]
    NoCookieContent,
    #[error("Cookie name or value contains a control character")]
    DisallowedCharacter,
    #[error("Cookie name and value exceed the size limit")]
    NameValuePairExceedsMaxSize,
    #[error("Cookie domain attribute contains non-ASCII characters")]
    DomainNonAscii,
    #[error("Cookie has domain set to a public suffix")]
    PublicSuffix,
    #[error("Cookie has domain set to a special-use domain")]
    SpecialUseDomain,
    #[error("Cookie not in this host's domain")]
    DomainMismatch,
    #[error("Cookie is HttpOnly and this isn't an HTTP API")]
    HttpOnly,
    #[error("Cookie would overwrite a secure cookie from an insecure origin")]
    OverwriteSecure,
    #[error("Cookie is SameSite=None but not Secure")]
    SameSiteNoneInsecure,
    #[error("Cookie is SameSite but this is a cross-site request")]
    SameSiteCrossSite,
    #[error("Cookie has __Secure- prefix but Secure attribute is not set")]
    InvalidSecurePrefix,
    #[error("Cookie has __Host- prefix but Secure, host-only, or Path=/ is missing")]
    InvalidHostPrefix,
    #[error("Cookie has an empty name and a value starting with a reserved prefix")]
    HiddenPrefix,
    #[error("Old cookie is HttpOnly and this isn't an HTTP API")]
    OverwriteHttpOnly,
}

impl ExclusionReason {
    /// Returns the stable, machine-readable name of this reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExclusionReason::FailedToParse => "EXCLUDE_FAILURE_TO_STORE",
            ExclusionReason::NoCookieContent => "EXCLUDE_NO_COOKIE_CONTENT",
            ExclusionReason::DisallowedCharacter => "EXCLUDE_DISALLOWED_CHARACTER",
            ExclusionReason::NameValuePairExceedsMaxSize => {
                "EXCLUDE_NAME_VALUE_PAIR_EXCEEDS_MAX_SIZE"
            }
            ExclusionReason::DomainNonAscii => "EXCLUDE_DOMAIN_NON_ASCII",
            ExclusionReason::PublicSuffix => "EXCLUDE_INVALID_DOMAIN_PUBLIC_SUFFIX",
            ExclusionReason::SpecialUseDomain => "EXCLUDE_SPECIAL_USE_DOMAIN",
            ExclusionReason::DomainMismatch => "EXCLUDE_INVALID_DOMAIN",
            ExclusionReason::HttpOnly => "EXCLUDE_HTTP_ONLY",
            ExclusionReason::OverwriteSecure => "EXCLUDE_OVERWRITE_SECURE",
            ExclusionReason::SameSiteNoneInsecure => "EXCLUDE_SAMESITE_NONE_INSECURE",
            ExclusionReason::SameSiteCrossSite => "EXCLUDE_SAMESITE_CROSS_SITE",
            ExclusionReason::InvalidSecurePrefix => "EXCLUDE_INVALID_SECURE_PREFIX",
            ExclusionReason::InvalidHostPrefix => "EXCLUDE_INVALID_HOST_PREFIX",
            ExclusionReason::HiddenPrefix => "EXCLUDE_HIDDEN_PREFIX",
            ExclusionReason::OverwriteHttpOnly => "EXCLUDE_OVERWRITE_HTTP_ONLY",
        }
    }

    /// Whether this reason comes from `__Secure-`/`__Host-` prefix enforcement.
    pub fn is_prefix_violation(&self) -> bool {
        matches!(
            self,
            ExclusionReason::InvalidSecurePrefix | ExclusionReason::InvalidHostPrefix
        )
    }
}

/// Errors raised by a [`CookieStore`](crate::cookies::store::CookieStore) backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend does not implement an optional capability.
    #[error("Store does not support {0}")]
    Unsupported(&'static str),

    /// Backend I/O failure, surfaced verbatim.
    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Top-level error for jar operations.
#[derive(Debug, Error, Clone)]
pub enum CookieError {
    #[error("{0}")]
    Excluded(#[from] ExclusionReason),

    /// A blocking entry point was used against an asynchronous store.
    #[error("Synchronous API called on an asynchronous cookie store")]
    SyncOnAsyncStore,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("URL has no host: {url}")]
    InvalidUrl { url: String },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("Malformed cookie snapshot: {0}")]
    Json(String),

    #[error("Unsupported cookie snapshot version: {0}")]
    UnsupportedSnapshotVersion(String),
}

impl CookieError {
    /// Returns the exclusion reason if this error is a protocol-level rejection.
    pub fn exclusion_reason(&self) -> Option<ExclusionReason> {
        match self {
            CookieError::Excluded(reason) => Some(*reason),
            _ => None,
        }
    }

    pub fn invalid_url(url: impl Into<String>) -> Self {
        CookieError::InvalidUrl { url: url.into() }
    }
}

impl From<serde_json::Error> for CookieError {
    fn from(err: serde_json::Error) -> Self {
        CookieError::Json(err.to_string())
    }
}
