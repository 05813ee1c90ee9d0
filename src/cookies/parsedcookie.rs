//! `Set-Cookie` text parsing per RFC 6265bis section 5.6.
//!
//! Produces a [`ParsedCookie`] candidate: name, value, and typed attributes.
//! Scope (domain, path, host-only) is resolved later by the jar against the
//! request URL.

use crate::base::cookieerror::ExclusionReason;
use crate::cookies::canonicalcookie::SameSite;
use crate::cookies::cookiedate::parse_cookie_date;
use std::str::FromStr;
use time::{Duration, OffsetDateTime};

/// Maximum combined length of a cookie's name and value.
pub const MAX_NAME_VALUE_SIZE: usize = 4096;

/// Maximum combined length of one attribute's name and value.
pub const MAX_ATTRIBUTE_SIZE: usize = 1024;

/// Upper bound on cookie lifetime: 400 days.
pub const MAX_AGE_CEILING_SECS: i64 = 400 * 24 * 60 * 60;

/// Options controlling [`ParsedCookie::parse`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Accept cookies without a name (`=value` or bare `value`).
    pub loose: bool,
    /// Reference time for the lifetime ceiling; defaults to the current time.
    pub now: Option<OffsetDateTime>,
}

/// A cookie candidate as written by the server.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedCookie {
    pub name: String,
    pub value: String,
    pub expires: Option<OffsetDateTime>,
    /// Seconds, clamped to the ceiling. Non-positive values are kept as given.
    pub max_age: Option<i64>,
    /// Lowercased, without its leading dot.
    pub domain: Option<String>,
    /// `None` means the default path must be used.
    pub path: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub extensions: Vec<String>,
}

// CTL characters other than horizontal tab.
pub(crate) fn is_disallowed_control(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0A}'..='\u{1F}' | '\u{7F}')
}

fn is_max_age_value(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn split_once_trimmed(pair: &str) -> (&str, Option<&str>) {
    match pair.split_once('=') {
        Some((name, value)) => (name.trim(), Some(value.trim())),
        None => (pair.trim(), None),
    }
}

impl ParsedCookie {
    /// Parse `Set-Cookie` text.
    ///
    /// Fails only when no cookie can be produced at all. Malformed
    /// attributes are dropped individually.
    pub fn parse(text: &str, options: &ParseOptions) -> Result<Self, ExclusionReason> {
        if text.chars().any(is_disallowed_control) {
            return Err(ExclusionReason::DisallowedCharacter);
        }

        let text = text.trim();
        let (name_value, attributes) = match text.split_once(';') {
            Some((nv, rest)) => (nv, Some(rest)),
            None => (text, None),
        };

        let (name, value) = Self::parse_name_value(name_value, options.loose)?;
        if name.len() + value.len() > MAX_NAME_VALUE_SIZE {
            return Err(ExclusionReason::NameValuePairExceedsMaxSize);
        }

        let mut cookie = ParsedCookie {
            name: name.to_string(),
            value: value.to_string(),
            ..Default::default()
        };

        let now = options.now.unwrap_or_else(OffsetDateTime::now_utc);
        for attribute in attributes.into_iter().flat_map(|a| a.split(';')) {
            let attribute = attribute.trim();
            if attribute.is_empty() {
                continue;
            }
            cookie.apply_attribute(attribute, now);
        }

        Ok(cookie)
    }

    fn parse_name_value(pair: &str, loose: bool) -> Result<(&str, &str), ExclusionReason> {
        let mut pair = pair;
        let mut eq = pair.find('=');

        if loose {
            if eq == Some(0) {
                pair = &pair[1..];
                eq = pair.find('=');
            }
        } else if eq.is_none() || eq == Some(0) {
            return Err(ExclusionReason::FailedToParse);
        }

        match eq {
            Some(idx) if idx > 0 => Ok((pair[..idx].trim(), pair[idx + 1..].trim())),
            _ => Ok(("", pair.trim())),
        }
    }

    fn apply_attribute(&mut self, attribute: &str, now: OffsetDateTime) {
        let (name, value) = split_once_trimmed(attribute);
        if name.len() + value.map_or(0, str::len) > MAX_ATTRIBUTE_SIZE {
            tracing::trace!(attribute = name, "skipping oversized cookie attribute");
            return;
        }

        let value = value.unwrap_or_default();
        match name.to_ascii_lowercase().as_str() {
            "expires" => {
                if let Some(expires) = parse_cookie_date(value) {
                    let ceiling = now + Duration::seconds(MAX_AGE_CEILING_SECS);
                    self.expires = Some(expires.min(ceiling));
                }
            }
            "max-age" => {
                if is_max_age_value(value) {
                    let negative = value.starts_with('-');
                    let secs = value
                        .parse::<i64>()
                        .unwrap_or(if negative { i64::MIN } else { i64::MAX });
                    self.max_age = Some(secs.min(MAX_AGE_CEILING_SECS));
                }
            }
            "domain" => {
                let domain = value.strip_prefix('.').unwrap_or(value);
                if !domain.is_empty() {
                    self.domain = Some(domain.to_lowercase());
                }
            }
            "path" => {
                self.path = value
                    .starts_with('/')
                    .then(|| value.to_string());
            }
            "secure" => self.secure = true,
            "httponly" => self.http_only = true,
            "samesite" => self.same_site = SameSite::from_attribute(value),
            _ => self.extensions.push(attribute.to_string()),
        }
    }
}

impl FromStr for ParsedCookie {
    type Err = ExclusionReason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParsedCookie::parse(s, &ParseOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn parse(text: &str) -> Result<ParsedCookie, ExclusionReason> {
        ParsedCookie::parse(
            text,
            &ParseOptions {
                loose: false,
                now: Some(datetime!(2020-01-01 00:00:00 UTC)),
            },
        )
    }

    fn parse_loose(text: &str) -> Result<ParsedCookie, ExclusionReason> {
        ParsedCookie::parse(
            text,
            &ParseOptions {
                loose: true,
                now: None,
            },
        )
    }

    #[test]
    fn test_name_value() {
        let c = parse("  foo = bar baz  ").unwrap();
        assert_eq!(c.name, "foo");
        assert_eq!(c.value, "bar baz");
        assert!(c.extensions.is_empty());
    }

    #[test]
    fn test_value_keeps_later_equals() {
        let c = parse("token=a=b=c; Path=/").unwrap();
        assert_eq!(c.name, "token");
        assert_eq!(c.value, "a=b=c");
    }

    #[test]
    fn test_strict_rejects_nameless() {
        assert_eq!(parse("=bar"), Err(ExclusionReason::FailedToParse));
        assert_eq!(parse("bar"), Err(ExclusionReason::FailedToParse));
    }

    #[test]
    fn test_loose_accepts_nameless() {
        let c = parse_loose("=bar").unwrap();
        assert_eq!(c.name, "");
        assert_eq!(c.value, "bar");

        let c = parse_loose("bar").unwrap();
        assert_eq!(c.name, "");
        assert_eq!(c.value, "bar");

        let c = parse_loose("=a=b").unwrap();
        assert_eq!(c.name, "a");
        assert_eq!(c.value, "b");
    }

    #[test]
    fn test_control_characters() {
        assert_eq!(
            parse("foo=b\u{1}ar"),
            Err(ExclusionReason::DisallowedCharacter)
        );
        assert_eq!(
            parse("foo=bar\nbaz"),
            Err(ExclusionReason::DisallowedCharacter)
        );
        assert_eq!(
            parse("foo=bar; Path=/\u{7f}"),
            Err(ExclusionReason::DisallowedCharacter)
        );
        assert!(parse("foo=bar\tbaz").is_ok());
    }

    #[test]
    fn test_name_value_size() {
        let value = "x".repeat(MAX_NAME_VALUE_SIZE - 3);
        assert!(parse(&format!("abc={}", value)).is_ok());
        assert_eq!(
            parse(&format!("abcd={}", value)),
            Err(ExclusionReason::NameValuePairExceedsMaxSize)
        );
    }

    #[test]
    fn test_oversized_attribute_skipped() {
        let long = "a".repeat(MAX_ATTRIBUTE_SIZE);
        let c = parse(&format!("foo=bar; Path=/{}; Secure", long)).unwrap();
        assert_eq!(c.path, None);
        assert!(c.secure);
    }

    #[test]
    fn test_expires() {
        let c = parse("a=b; Expires=Wed, 09 Jun 2021 10:18:14 GMT").unwrap();
        assert_eq!(c.expires, Some(datetime!(2021-06-09 10:18:14 UTC)));

        let c = parse("a=b; Expires=garbage").unwrap();
        assert_eq!(c.expires, None);
    }

    #[test]
    fn test_expires_clamped() {
        let c = parse("a=b; Expires=Fri, 01 Jan 2100 00:00:00 GMT").unwrap();
        assert_eq!(
            c.expires,
            Some(datetime!(2020-01-01 00:00:00 UTC) + Duration::days(400))
        );
    }

    #[test]
    fn test_max_age() {
        assert_eq!(parse("a=b; Max-Age=60").unwrap().max_age, Some(60));
        assert_eq!(parse("a=b; max-age=-1").unwrap().max_age, Some(-1));
        assert_eq!(parse("a=b; Max-Age=0").unwrap().max_age, Some(0));
        assert_eq!(parse("a=b; Max-Age=1.5").unwrap().max_age, None);
        assert_eq!(parse("a=b; Max-Age=+5").unwrap().max_age, None);
        assert_eq!(parse("a=b; Max-Age=").unwrap().max_age, None);
        assert_eq!(
            parse("a=b; Max-Age=99999999999999999999999").unwrap().max_age,
            Some(MAX_AGE_CEILING_SECS)
        );
    }

    #[test]
    fn test_domain() {
        let c = parse("a=b; Domain=.Example.COM").unwrap();
        assert_eq!(c.domain.as_deref(), Some("example.com"));

        let c = parse("a=b; Domain=example.com; Domain=").unwrap();
        assert_eq!(c.domain.as_deref(), Some("example.com"));
    }

    #[test]
    fn test_path() {
        assert_eq!(parse("a=b; Path=/foo").unwrap().path.as_deref(), Some("/foo"));
        assert_eq!(parse("a=b; Path=foo").unwrap().path, None);
        assert_eq!(parse("a=b; Path=").unwrap().path, None);
        assert_eq!(parse("a=b; Path=/foo; Path=bar").unwrap().path, None);
    }

    #[test]
    fn test_flags() {
        let c = parse("a=b; secure; HTTPONLY=no").unwrap();
        assert!(c.secure);
        assert!(c.http_only);
    }

    #[test]
    fn test_same_site() {
        assert_eq!(parse("a=b; SameSite=strict").unwrap().same_site, SameSite::Strict);
        assert_eq!(parse("a=b; SameSite=LAX").unwrap().same_site, SameSite::Lax);
        assert_eq!(
            parse("a=b; SameSite=None").unwrap().same_site,
            SameSite::NoRestriction
        );
        assert_eq!(
            parse("a=b; SameSite=bogus").unwrap().same_site,
            SameSite::Unspecified
        );
        assert_eq!(parse("a=b").unwrap().same_site, SameSite::Unspecified);
    }

    #[test]
    fn test_extensions_preserved_in_order() {
        let c = parse("a=b; Priority=High;  Partitioned ; x=y=z").unwrap();
        assert_eq!(c.extensions, vec!["Priority=High", "Partitioned", "x=y=z"]);
    }

    #[test]
    fn test_last_attribute_wins() {
        let c = parse("a=b; Max-Age=10; Max-Age=20; SameSite=Lax; SameSite=Strict").unwrap();
        assert_eq!(c.max_age, Some(20));
        assert_eq!(c.same_site, SameSite::Strict);
    }

    #[test]
    fn test_from_str() {
        let c: ParsedCookie = "foo=bar; HttpOnly".parse().unwrap();
        assert_eq!(c.name, "foo");
        assert!(c.http_only);
    }
}
