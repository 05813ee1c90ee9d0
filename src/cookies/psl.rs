//! Public Suffix List (PSL) lookups for cookie domain security.
//!
//! Prevents supercookie attacks by rejecting cookies set on public
//! suffixes like `.com`, `.co.uk`, etc.
//!
//! The jar consumes suffix data through the [`PublicSuffixList`] trait so
//! that embedders can supply their own list. [`MozillaPsl`] is the default,
//! backed by Mozilla's Public Suffix List via the `psl` crate.

use crate::base::cookieerror::ExclusionReason;
use psl::{List, Psl};

/// RFC 6761 special-use top-level domains.
pub const SPECIAL_USE_DOMAINS: [&str; 5] = ["local", "example", "invalid", "localhost", "test"];

/// Special-use domains that are registrable on their own.
const SPECIAL_TREATMENT_DOMAINS: [&str; 2] = ["localhost", "invalid"];

/// Source of public suffix data.
pub trait PublicSuffixList: Send + Sync {
    /// Returns true if `domain` itself is a public suffix.
    fn is_public_suffix(&self, domain: &str) -> bool;

    /// Returns the registrable domain (eTLD+1), or `None` for a public suffix.
    fn registrable_domain(&self, domain: &str) -> Option<String>;
}

/// Mozilla's Public Suffix List, compiled in by the `psl` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct MozillaPsl;

impl PublicSuffixList for MozillaPsl {
    fn is_public_suffix(&self, domain: &str) -> bool {
        is_public_suffix(domain)
    }

    fn registrable_domain(&self, domain: &str) -> Option<String> {
        registrable_domain(domain)
    }
}

/// Check if a domain is a public suffix (e.g., "com", "co.uk").
/// Returns true if the domain itself is a public suffix.
pub fn is_public_suffix(domain: &str) -> bool {
    let domain_lower = domain.to_lowercase();
    let domain_bytes = domain_lower.as_bytes();

    // Get the suffix for this domain
    if let Some(suffix) = List.suffix(domain_bytes) {
        // The domain is a public suffix if it equals its own suffix
        suffix.as_bytes() == domain_bytes
    } else {
        false
    }
}

/// Get the registrable domain (eTLD+1) for a domain.
/// For "sub.example.com", returns "example.com".
/// For "example.com", returns "example.com".
/// For "com" (public suffix), returns None.
pub fn registrable_domain(domain: &str) -> Option<String> {
    let domain_lower = domain.to_lowercase();
    psl::domain(domain_lower.as_bytes())
        .and_then(|d| std::str::from_utf8(d.as_bytes()).ok())
        .map(|s| s.to_string())
}

/// Resolve the registrable domain of `domain`, treating special-use TLDs
/// according to the jar's policy.
///
/// With `allow_special_use`, `foo.localhost` is registrable as itself and
/// the bare `localhost`/`invalid` names are too. Without it, any special-use
/// name is refused with [`ExclusionReason::SpecialUseDomain`].
pub fn registered_domain_for(
    list: &dyn PublicSuffixList,
    domain: &str,
    allow_special_use: bool,
) -> Result<Option<String>, ExclusionReason> {
    let mut labels = domain.rsplit('.');
    let top_level = labels.next().unwrap_or_default();

    if SPECIAL_USE_DOMAINS.contains(&top_level) {
        if !allow_special_use {
            return Err(ExclusionReason::SpecialUseDomain);
        }
        if let Some(second_level) = labels.next().filter(|l| !l.is_empty()) {
            return Ok(Some(format!("{}.{}", second_level, top_level)));
        }
        if SPECIAL_TREATMENT_DOMAINS.contains(&top_level) {
            return Ok(Some(top_level.to_string()));
        }
    }

    Ok(list.registrable_domain(domain))
}
