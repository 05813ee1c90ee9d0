//! Storage backend abstraction for the cookie jar.
//!
//! [`CookieStore`] is the seam between [`CookieMonster`] and wherever cookies
//! actually live. Every operation returns a boxed future so that disk or
//! network backed stores can suspend on I/O; purely in-memory stores return
//! already-completed futures and report [`is_synchronous`] so the jar's
//! blocking entry points can drive them without an executor.
//!
//! # Contract
//!
//! - Cookies are keyed by `(domain, path, name)`. `put_cookie` and
//!   `update_cookie` overwrite an entry with the same key.
//! - The store never touches creation times: the jar carries them forward
//!   before calling `update_cookie`.
//! - Read operations never mutate. Write operations are idempotent under
//!   repeated identical calls.
//!
//! [`CookieMonster`]: crate::cookies::monster::CookieMonster
//! [`is_synchronous`]: CookieStore::is_synchronous

use crate::base::cookieerror::StoreError;
use crate::cookies::canonicalcookie::CanonicalCookie;
use std::{future::Future, pin::Pin};

/// Alias for the `Future` type returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Trait for cookie storage backends.
///
/// Equivalent to Chromium's `CookieMonster::PersistentCookieStore`, widened
/// to cover the in-memory index as well.
pub trait CookieStore: Send + Sync {
    /// Whether every returned future completes on its first poll.
    ///
    /// The jar's blocking API refuses to run against stores that return
    /// `false` here.
    fn is_synchronous(&self) -> bool;

    /// Short diagnostic name, recorded in snapshots.
    fn store_type(&self) -> &'static str;

    /// Look up the cookie with exactly this key.
    fn find_cookie<'a>(
        &'a self,
        domain: &'a str,
        path: &'a str,
        name: &'a str,
    ) -> StoreFuture<'a, Option<CanonicalCookie>>;

    /// Every cookie whose domain is `domain` or one of its parent domains up
    /// to the registrable domain.
    ///
    /// With `path == None` every path is returned, otherwise only cookies
    /// whose path path-matches `path`.
    fn find_cookies<'a>(
        &'a self,
        domain: &'a str,
        path: Option<&'a str>,
        allow_special_use: bool,
    ) -> StoreFuture<'a, Vec<CanonicalCookie>>;

    fn put_cookie(&mut self, cookie: CanonicalCookie) -> StoreFuture<'_, ()>;

    /// Replace `old` with `new`. Both share the same key.
    fn update_cookie(
        &mut self,
        old: CanonicalCookie,
        new: CanonicalCookie,
    ) -> StoreFuture<'_, ()>;

    /// Remove the cookie with this key. Removing a missing cookie succeeds.
    fn remove_cookie<'a>(
        &'a mut self,
        domain: &'a str,
        path: &'a str,
        name: &'a str,
    ) -> StoreFuture<'a, ()>;

    /// Remove every cookie stored under exactly `domain`, restricted to
    /// `path` when given.
    fn remove_cookies<'a>(
        &'a mut self,
        domain: &'a str,
        path: Option<&'a str>,
    ) -> StoreFuture<'a, ()>;

    /// Remove everything. Optional.
    fn remove_all_cookies(&mut self) -> StoreFuture<'_, ()> {
        Box::pin(std::future::ready(Err(StoreError::Unsupported(
            "remove_all_cookies",
        ))))
    }

    /// Every stored cookie in creation-sequence order. Optional.
    fn get_all_cookies(&self) -> StoreFuture<'_, Vec<CanonicalCookie>> {
        Box::pin(std::future::ready(Err(StoreError::Unsupported(
            "get_all_cookies",
        ))))
    }

    /// Every cookie stored under the registrable domain of `domain`, at any
    /// depth and any path, in no particular order. Optional.
    ///
    /// Special-use names count as registrable here regardless of jar policy.
    fn find_site_cookies<'a>(&'a self, _domain: &'a str) -> StoreFuture<'a, Vec<CanonicalCookie>> {
        Box::pin(std::future::ready(Err(StoreError::Unsupported(
            "find_site_cookies",
        ))))
    }
}
