//! Base types and error handling.
//!
//! Provides foundational types shared by the cookie modules:
//! - [`CookieError`](cookieerror::CookieError): jar-level errors
//! - [`ExclusionReason`](cookieerror::ExclusionReason): why a cookie was not stored
//! - [`StoreError`](cookieerror::StoreError): backend failures and missing capabilities

pub mod context;
pub mod cookieerror;
