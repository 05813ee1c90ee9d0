//! RFC 6265bis cookie jar.
//!
//! This module provides a complete cookie management system including:
//!
//! - **Parsing**: `Set-Cookie` lines ([`ParsedCookie`](parsedcookie::ParsedCookie))
//!   and cookie dates ([`cookiedate`])
//! - **Validation**: the acceptance pipeline in [`CookieMonster`](monster::CookieMonster),
//!   backed by Public Suffix List checks ([`psl`])
//! - **Storage**: pluggable backends ([`CookieStore`](store::CookieStore)) with an
//!   in-memory default ([`MemoryCookieStore`](memorystore::MemoryCookieStore))
//! - **Retrieval**: domain/path matching and ordering for outgoing requests
//! - **Persistence**: JSON snapshots saved to and loaded from disk
//!
//! # Architecture
//!
//! This implementation mirrors Chromium's cookie storage architecture:
//!
//! | Chromium (C++) | cookiemonster (Rust) | Responsibility |
//! |----------------|----------------------|----------------|
//! | `net::CookieMonster` | [`CookieMonster`](monster::CookieMonster) | Acceptance and retrieval |
//! | `net::CanonicalCookie` | [`CanonicalCookie`](canonicalcookie::CanonicalCookie) | Single cookie representation |
//! | `net::ParsedCookie` | [`ParsedCookie`](parsedcookie::ParsedCookie) | `Set-Cookie` tokenizer |
//! | `net::cookie_util` | [`cookieutil`] | Host canonicalization, matching |
//! | `CookieMonster::PersistentCookieStore` | [`CookieStore`](store::CookieStore) | Backend seam |
//!
//! # Example
//!
//! ```rust
//! use cookiemonster::cookies::monster::CookieMonster;
//! use cookiemonster::cookies::options::{GetCookieOptions, SetCookieOptions};
//! use url::Url;
//!
//! let mut jar = CookieMonster::new();
//! let url = Url::parse("https://example.com/account/login").unwrap();
//!
//! jar.set_cookie("sid=abc; Secure; HttpOnly; Path=/", &url, &SetCookieOptions::default())?;
//! jar.set_cookie("theme=dark", &url, &SetCookieOptions::default())?;
//!
//! let header = jar.get_cookie_string(&url, &GetCookieOptions::default())?;
//! assert_eq!(header, "theme=dark; sid=abc");
//! # Ok::<(), cookiemonster::base::cookieerror::CookieError>(())
//! ```
//!
//! # Chromium References
//!
//! - Cookie monster: `net/cookies/cookie_monster.cc`
//! - Parsing: `net/cookies/parsed_cookie.cc`
//! - Date parsing: `net/cookies/cookie_util.cc`

pub mod canonicalcookie;
pub mod cookiedate;
pub mod cookieutil;
pub mod memorystore;
pub mod monster;
pub mod options;
pub mod parsedcookie;
pub mod persistence;
pub mod psl;
pub mod store;
