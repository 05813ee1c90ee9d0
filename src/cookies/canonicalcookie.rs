use crate::base::cookieerror::ExclusionReason;
use crate::cookies::cookiedate::format_cookie_date;
use crate::cookies::parsedcookie::ParsedCookie;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};

/// Process-wide creation sequence shared by every cookie ever constructed.
///
/// Only used to break ties between cookies created in the same instant when
/// sorting. It is not persisted: deserialized cookies draw fresh values in
/// load order, which preserves their relative order.
static CREATION_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Returns the next creation-sequence value. Strictly increasing.
pub fn next_creation_index() -> u64 {
    CREATION_SEQUENCE.fetch_add(1, AtomicOrdering::Relaxed) + 1
}

/// Represents a stored cookie.
/// Modeled after Chromium's `net::CanonicalCookie`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalCookie {
    pub name: String,
    pub value: String,
    /// Canonical lowercase domain. For host-only cookies, the setting host.
    pub domain: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<Expiry>,
    /// Takes precedence over `expires`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<MaxAge>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    pub host_only: bool,
    /// The path was derived from the request URI rather than a Path attribute.
    #[serde(default)]
    pub path_is_default: bool,
    #[serde(default)]
    pub same_site: SameSite,
    #[serde(with = "rfc3339")]
    pub creation: OffsetDateTime,
    #[serde(skip, default = "next_creation_index")]
    pub creation_index: u64,
    #[serde(with = "rfc3339")]
    pub last_accessed: OffsetDateTime,
    /// Unrecognized attributes, verbatim and in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    #[default]
    Unspecified,
    #[serde(rename = "none")]
    NoRestriction,
    Lax,
    Strict,
}

impl SameSite {
    /// Enforcement level: `NoRestriction`/`Unspecified` < `Lax` < `Strict`.
    pub fn level(&self) -> u8 {
        match self {
            SameSite::Unspecified | SameSite::NoRestriction => 1,
            SameSite::Lax => 2,
            SameSite::Strict => 3,
        }
    }

    /// Case-insensitive `SameSite` attribute value; anything unknown is unspecified.
    pub fn from_attribute(value: &str) -> Self {
        if value.eq_ignore_ascii_case("strict") {
            SameSite::Strict
        } else if value.eq_ignore_ascii_case("lax") {
            SameSite::Lax
        } else if value.eq_ignore_ascii_case("none") {
            SameSite::NoRestriction
        } else {
            SameSite::Unspecified
        }
    }
}

/// Value of the Expires attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    At(OffsetDateTime),
    /// Explicitly never expires.
    Never,
}

/// Value of the Max-Age attribute, in seconds relative to creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxAge {
    Seconds(i64),
    Infinity,
    NegInfinity,
}

impl CanonicalCookie {
    /// Construct a host-only session cookie created at `creation`.
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
        path: impl Into<String>,
        creation: OffsetDateTime,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: path.into(),
            expires: None,
            max_age: None,
            secure: false,
            http_only: false,
            host_only: true,
            path_is_default: false,
            same_site: SameSite::Unspecified,
            creation,
            creation_index: next_creation_index(),
            last_accessed: creation,
            extensions: Vec::new(),
        }
    }

    /// Finalize a parsed candidate once the acceptance pipeline has resolved
    /// its scope.
    ///
    /// A positive Max-Age is anchored at `creation` and stored as an absolute
    /// Expires, so replacing the cookie later keeps the lifetime it was
    /// received with. Non-positive values are kept as given.
    pub fn from_parsed(
        parsed: ParsedCookie,
        domain: String,
        path: String,
        host_only: bool,
        path_is_default: bool,
        creation: OffsetDateTime,
    ) -> Self {
        let (expires, max_age) = match parsed.max_age {
            Some(secs) if secs > 0 => match creation.checked_add(Duration::seconds(secs)) {
                Some(at) => (Some(Expiry::At(at)), None),
                None => (parsed.expires.map(Expiry::At), Some(MaxAge::Seconds(secs))),
            },
            max_age => (parsed.expires.map(Expiry::At), max_age.map(MaxAge::Seconds)),
        };

        Self {
            name: parsed.name,
            value: parsed.value,
            domain,
            path,
            expires,
            max_age,
            secure: parsed.secure,
            http_only: parsed.http_only,
            host_only,
            path_is_default,
            same_site: parsed.same_site,
            creation,
            creation_index: next_creation_index(),
            last_accessed: creation,
            extensions: parsed.extensions,
        }
    }

    /// Absolute expiry. `None` means the cookie never expires on its own.
    ///
    /// Max-Age wins over Expires and counts from creation; a non-positive
    /// Max-Age yields the earliest representable instant.
    pub fn expiry_time(&self) -> Option<OffsetDateTime> {
        let already_expired = PrimitiveDateTime::MIN.assume_utc();
        match self.max_age {
            Some(MaxAge::Seconds(secs)) if secs <= 0 => Some(already_expired),
            Some(MaxAge::Seconds(secs)) => self.creation.checked_add(Duration::seconds(secs)),
            Some(MaxAge::Infinity) => None,
            Some(MaxAge::NegInfinity) => Some(already_expired),
            None => match self.expires {
                Some(Expiry::At(at)) => Some(at),
                Some(Expiry::Never) | None => None,
            },
        }
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expiry_time().is_some_and(|expiry| expiry <= now)
    }

    /// Whether the cookie outlives the session.
    pub fn is_persistent(&self) -> bool {
        self.max_age.is_some() || matches!(self.expires, Some(Expiry::At(_)))
    }

    /// Remaining lifetime, `None` if unbounded.
    pub fn ttl(&self, now: OffsetDateTime) -> Option<Duration> {
        self.expiry_time()
            .map(|expiry| (expiry - now).max(Duration::ZERO))
    }

    /// The `name=value` form used in a `Cookie` request header.
    pub fn cookie_string(&self) -> String {
        if self.name.is_empty() {
            self.value.clone()
        } else {
            format!("{}={}", self.name, self.value)
        }
    }

    /// Check `__Secure-` and `__Host-` name prefix requirements.
    pub fn validate_prefix(&self, secure_origin: bool) -> Result<(), ExclusionReason> {
        if self.name.starts_with("__Secure-") && (!self.secure || !secure_origin) {
            return Err(ExclusionReason::InvalidSecurePrefix);
        }

        if self.name.starts_with("__Host-") {
            // __Host- requires: Secure flag, Path="/", host-only (no Domain), secure origin
            if !self.secure || self.path != "/" || !self.host_only || !secure_origin {
                return Err(ExclusionReason::InvalidHostPrefix);
            }
        }

        Ok(())
    }

    /// A nameless cookie whose value would read as a prefixed name.
    pub fn has_hidden_prefix(&self) -> bool {
        self.name.is_empty()
            && (self.value.starts_with("__Secure-") || self.value.starts_with("__Host-"))
    }
}

/// Renders the cookie in `Set-Cookie` form.
impl fmt::Display for CanonicalCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cookie_string())?;

        if let Some(Expiry::At(at)) = self.expires {
            if let Some(date) = format_cookie_date(at) {
                write!(f, "; Expires={}", date)?;
            }
        }
        if let Some(MaxAge::Seconds(secs)) = self.max_age {
            write!(f, "; Max-Age={}", secs)?;
        }
        if !self.host_only {
            write!(f, "; Domain={}", self.domain)?;
        }
        write!(f, "; Path={}", self.path)?;
        if self.secure {
            f.write_str("; Secure")?;
        }
        if self.http_only {
            f.write_str("; HttpOnly")?;
        }
        match self.same_site {
            SameSite::Strict => f.write_str("; SameSite=Strict")?,
            SameSite::Lax => f.write_str("; SameSite=Lax")?,
            SameSite::NoRestriction | SameSite::Unspecified => {}
        }
        for extension in &self.extensions {
            write!(f, "; {}", extension)?;
        }
        Ok(())
    }
}

/// Retrieval order: longer paths first, then older cookies, then lower
/// creation sequence.
pub fn cookie_compare(a: &CanonicalCookie, b: &CanonicalCookie) -> Ordering {
    b.path
        .len()
        .cmp(&a.path.len())
        .then_with(|| a.creation.cmp(&b.creation))
        .then_with(|| a.creation_index.cmp(&b.creation_index))
}

const INFINITY: &str = "Infinity";
const NEG_INFINITY: &str = "-Infinity";

mod rfc3339 {
    use super::*;

    pub fn serialize<S: Serializer>(at: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        let text = at.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&text, &Rfc3339).map_err(de::Error::custom)
    }
}

impl Serialize for Expiry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Expiry::At(at) => rfc3339::serialize(at, serializer),
            Expiry::Never => serializer.serialize_str(INFINITY),
        }
    }
}

impl<'de> Deserialize<'de> for Expiry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        if text == INFINITY {
            return Ok(Expiry::Never);
        }
        OffsetDateTime::parse(&text, &Rfc3339)
            .map(Expiry::At)
            .map_err(de::Error::custom)
    }
}

impl Serialize for MaxAge {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MaxAge::Seconds(secs) => serializer.serialize_i64(*secs),
            MaxAge::Infinity => serializer.serialize_str(INFINITY),
            MaxAge::NegInfinity => serializer.serialize_str(NEG_INFINITY),
        }
    }
}

struct MaxAgeVisitor;

impl<'de> Visitor<'de> for MaxAgeVisitor {
    type Value = MaxAge;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer number of seconds, \"Infinity\" or \"-Infinity\"")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<MaxAge, E> {
        Ok(MaxAge::Seconds(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<MaxAge, E> {
        Ok(i64::try_from(v).map_or(MaxAge::Infinity, MaxAge::Seconds))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<MaxAge, E> {
        match v {
            INFINITY => Ok(MaxAge::Infinity),
            NEG_INFINITY => Ok(MaxAge::NegInfinity),
            other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
        }
    }
}

impl<'de> Deserialize<'de> for MaxAge {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(MaxAgeVisitor)
    }
}
