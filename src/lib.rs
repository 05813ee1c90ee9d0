//! # cookiemonster
//!
//! A Chromium-inspired RFC 6265bis cookie jar for Rust.
//!
//! `cookiemonster` implements the cookie handling a user agent needs:
//! parsing `Set-Cookie` lines, deciding which cookies to accept, storing
//! them, and choosing which ones to send back with each request.
//!
//! ## Features
//!
//! - **RFC 6265bis Parsing**: Permissive `Set-Cookie` tokenizer and cookie-date grammar
//! - **Acceptance Rules**: Domain and path scoping, HttpOnly, SameSite, `__Secure-`/`__Host-` prefixes
//! - **Public Suffix List**: Supercookie rejection via Mozilla's PSL, with special-use domains
//! - **Pluggable Storage**: Synchronous and asynchronous backends behind one trait
//! - **Persistence**: JSON snapshots on disk, blocking or with tokio
//!
//! ## Quick Start
//!
//! ```rust
//! use cookiemonster::cookies::monster::CookieMonster;
//! use cookiemonster::cookies::options::{GetCookieOptions, SetCookieOptions};
//! use url::Url;
//!
//! let mut jar = CookieMonster::new();
//! let url = Url::parse("http://example.com/").unwrap();
//!
//! jar.set_cookie("a=1; Domain=example.com; Path=/", &url, &SetCookieOptions::default())?;
//!
//! let sub = Url::parse("http://www.example.com/").unwrap();
//! assert_eq!(jar.get_cookie_string(&sub, &GetCookieOptions::default())?, "a=1");
//! # Ok::<(), cookiemonster::base::cookieerror::CookieError>(())
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error types and error context helpers
//! - [`cookies`] - Parsing, validation, storage, retrieval and persistence
//!
//! ## Security
//!
//! This library implements several security features from Chromium:
//! - Public Suffix List validation to prevent supercookie attacks
//! - Cookie name prefixes (`__Secure-`, `__Host-`)
//! - Protection of secure cookies from insecure overwrites

pub mod base;
pub mod cookies;
