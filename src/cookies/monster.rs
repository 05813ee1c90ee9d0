use crate::base::cookieerror::{CookieError, ExclusionReason, StoreError};
use crate::cookies::canonicalcookie::{cookie_compare, CanonicalCookie, SameSite};
use crate::cookies::cookieutil::{
    canonical_host_for_url, canonicalize_host, default_path, domain_match, is_ip_address,
    path_match, suffix_domains,
};
use crate::cookies::memorystore::MemoryCookieStore;
use crate::cookies::options::{
    CookieMonsterConfig, GetCookieOptions, PrefixSecurity, SameSiteContext, SetCookieOptions,
};
use crate::cookies::parsedcookie::{
    is_disallowed_control, ParseOptions, ParsedCookie, MAX_ATTRIBUTE_SIZE, MAX_NAME_VALUE_SIZE,
};
use crate::cookies::persistence::{JarSnapshot, SNAPSHOT_VERSION};
use crate::cookies::psl::{registered_domain_for, MozillaPsl, PublicSuffixList};
use crate::cookies::store::CookieStore;
use futures::FutureExt;
use std::future::Future;
use std::sync::Arc;
use time::OffsetDateTime;
use url::Url;

/// The main entry point for cookie management.
/// Modeled after Chromium's `net::CookieMonster`.
///
/// The jar validates incoming cookies against RFC 6265bis, keeps them in a
/// [`CookieStore`], and selects the cookies to send with a request. Each
/// operation has a blocking form and an `_async` form that share one
/// implementation; the blocking form only works on synchronous stores and
/// fails with [`CookieError::SyncOnAsyncStore`] otherwise.
///
/// The jar performs no internal locking. Writes to one jar must be
/// serialized by the caller, which `&mut self` enforces.
pub struct CookieMonster<S = MemoryCookieStore> {
    store: S,
    config: CookieMonsterConfig,
    psl: Arc<dyn PublicSuffixList>,
}

impl Default for CookieMonster {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieMonster {
    /// In-memory jar with the default policy.
    pub fn new() -> Self {
        Self::with_store(MemoryCookieStore::new(), CookieMonsterConfig::default())
    }

    pub fn with_config(config: CookieMonsterConfig) -> Self {
        Self::with_store(MemoryCookieStore::new(), config)
    }
}

impl<S: CookieStore> CookieMonster<S> {
    pub fn with_store(store: S, config: CookieMonsterConfig) -> Self {
        Self {
            store,
            config,
            psl: Arc::new(MozillaPsl),
        }
    }

    /// Replace the public suffix data used for domain validation.
    pub fn with_public_suffix_list(mut self, psl: Arc<dyn PublicSuffixList>) -> Self {
        self.psl = psl;
        self
    }

    pub fn config(&self) -> &CookieMonsterConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Parse a `Set-Cookie` value received for `url` and store it.
    ///
    /// Returns the stored cookie, `Ok(None)` when the cookie was dropped
    /// silently, or the reason it was excluded.
    pub fn set_cookie(
        &mut self,
        cookie_line: &str,
        url: &Url,
        options: &SetCookieOptions,
    ) -> Result<Option<CanonicalCookie>, CookieError> {
        let synchronous = self.store.is_synchronous();
        complete_sync(synchronous, self.set_cookie_async(cookie_line, url, options))
    }

    pub async fn set_cookie_async(
        &mut self,
        cookie_line: &str,
        url: &Url,
        options: &SetCookieOptions,
    ) -> Result<Option<CanonicalCookie>, CookieError> {
        let parse_options = ParseOptions {
            loose: options.loose.unwrap_or(self.config.loose_mode),
            now: options.now,
        };
        match ParsedCookie::parse(cookie_line, &parse_options) {
            Ok(parsed) => self.set_parsed_cookie_async(parsed, url, options).await,
            Err(reason) => {
                let host = url.host_str().unwrap_or_default();
                tracing::debug!(reason = reason.as_str(), host, "cookie failed to parse");
                excluded(reason, options)
            }
        }
    }

    /// Store an already parsed cookie received for `url`.
    pub fn set_parsed_cookie(
        &mut self,
        parsed: ParsedCookie,
        url: &Url,
        options: &SetCookieOptions,
    ) -> Result<Option<CanonicalCookie>, CookieError> {
        let synchronous = self.store.is_synchronous();
        complete_sync(synchronous, self.set_parsed_cookie_async(parsed, url, options))
    }

    pub async fn set_parsed_cookie_async(
        &mut self,
        parsed: ParsedCookie,
        url: &Url,
        options: &SetCookieOptions,
    ) -> Result<Option<CanonicalCookie>, CookieError> {
        let host =
            canonical_host_for_url(url).ok_or_else(|| CookieError::invalid_url(url.as_str()))?;
        let name = parsed.name.clone();

        match self.accept(parsed, &host, url, options).await {
            Ok(cookie) => {
                tracing::trace!(name = cookie.name.as_str(), host = host.as_str(), "cookie stored");
                Ok(Some(cookie))
            }
            Err(Rejection::Silent(reason)) => {
                tracing::debug!(
                    reason = reason.as_str(),
                    name = name.as_str(),
                    host = host.as_str(),
                    "cookie dropped"
                );
                Ok(None)
            }
            Err(Rejection::Excluded(reason)) => {
                tracing::debug!(
                    reason = reason.as_str(),
                    name = name.as_str(),
                    host = host.as_str(),
                    "cookie excluded"
                );
                excluded(reason, options)
            }
            Err(Rejection::Failed(err)) => Err(err),
        }
    }

    /// The acceptance pipeline. Steps run in RFC 6265bis order and the first
    /// failing step decides the outcome.
    async fn accept(
        &mut self,
        parsed: ParsedCookie,
        host: &str,
        url: &Url,
        options: &SetCookieOptions,
    ) -> Result<CanonicalCookie, Rejection> {
        let now = options.now.unwrap_or_else(OffsetDateTime::now_utc);
        let allow_special_use = self.config.allow_special_use_domain;

        if parsed.name.is_empty() && parsed.value.is_empty() {
            return Err(ExclusionReason::NoCookieContent.into());
        }
        if parsed.name.chars().any(is_disallowed_control)
            || parsed.value.chars().any(is_disallowed_control)
        {
            return Err(ExclusionReason::DisallowedCharacter.into());
        }
        if parsed.name.len() + parsed.value.len() > MAX_NAME_VALUE_SIZE {
            return Err(ExclusionReason::NameValuePairExceedsMaxSize.into());
        }

        let raw_domain = parsed
            .domain
            .as_deref()
            .filter(|domain| domain.len() <= MAX_ATTRIBUTE_SIZE)
            .unwrap_or_default();
        if !raw_domain.is_ascii() {
            return Err(ExclusionReason::DomainNonAscii.into());
        }
        let mut domain_attr = canonicalize_host(raw_domain);

        if self.config.reject_public_suffixes
            && !domain_attr.is_empty()
            && !is_ip_address(&domain_attr)
        {
            // A name that is its own registrable domain is never a suffix
            let refusal =
                match registered_domain_for(self.psl.as_ref(), &domain_attr, allow_special_use) {
                    Err(reason) => Some(reason),
                    Ok(Some(registered)) if registered == domain_attr => None,
                    Ok(_) => self
                        .psl
                        .is_public_suffix(&domain_attr)
                        .then_some(ExclusionReason::PublicSuffix),
                };
            if let Some(reason) = refusal {
                if domain_attr != host {
                    return Err(reason.into());
                }
                domain_attr.clear();
            }
        }

        let (domain, host_only) = if domain_attr.is_empty() {
            (host.to_string(), true)
        } else {
            if !domain_match(host, &domain_attr) {
                return Err(ExclusionReason::DomainMismatch.into());
            }
            (domain_attr, false)
        };

        let (path, path_is_default) = match parsed
            .path
            .as_deref()
            .filter(|path| path.len() <= MAX_ATTRIBUTE_SIZE)
        {
            Some(path) => (path.to_string(), false),
            None => (default_path(url.path()).to_string(), true),
        };

        let secure_origin = options.secure.unwrap_or_else(|| is_secure_scheme(url));
        if parsed.http_only && !options.http {
            return Err(ExclusionReason::HttpOnly.into());
        }

        let cookie =
            CanonicalCookie::from_parsed(parsed, domain, path, host_only, path_is_default, now);

        if !cookie.secure && !secure_origin && self.would_shadow_secure(&cookie).await? {
            return Err(ExclusionReason::OverwriteSecure.into());
        }

        match cookie.same_site {
            SameSite::NoRestriction if !cookie.secure => {
                return Err(ExclusionReason::SameSiteNoneInsecure.into());
            }
            SameSite::Strict | SameSite::Lax
                if options.same_site_context == Some(SameSiteContext::CrossSite) =>
            {
                return Err(ExclusionReason::SameSiteCrossSite.into());
            }
            _ => {}
        }

        match self.config.prefix_security {
            PrefixSecurity::Disabled => {}
            PrefixSecurity::Silent => cookie
                .validate_prefix(secure_origin)
                .map_err(Rejection::Silent)?,
            PrefixSecurity::Strict => cookie.validate_prefix(secure_origin)?,
        }

        if cookie.has_hidden_prefix() {
            return Err(ExclusionReason::HiddenPrefix.into());
        }

        self.store_accepted(cookie, options.http, now).await
    }

    /// Whether a secure cookie with the same name would be shadowed.
    ///
    /// Stores without a per-site lookup only report cookies on the new
    /// cookie's domain and its parents.
    async fn would_shadow_secure(&self, cookie: &CanonicalCookie) -> Result<bool, Rejection> {
        let existing = match self.store.find_site_cookies(&cookie.domain).await {
            Ok(site) => site,
            Err(StoreError::Unsupported(_)) => {
                self.store
                    .find_cookies(&cookie.domain, None, self.config.allow_special_use_domain)
                    .await?
            }
            Err(err) => return Err(Rejection::Failed(err.into())),
        };

        Ok(existing.iter().any(|old| {
            old.secure
                && old.name == cookie.name
                && (domain_match(&old.domain, &cookie.domain)
                    || domain_match(&cookie.domain, &old.domain))
                && path_match(&cookie.path, &old.path)
        }))
    }

    async fn store_accepted(
        &mut self,
        mut cookie: CanonicalCookie,
        http: bool,
        now: OffsetDateTime,
    ) -> Result<CanonicalCookie, Rejection> {
        let existing = self
            .store
            .find_cookie(&cookie.domain, &cookie.path, &cookie.name)
            .await?;

        match existing {
            Some(old) => {
                if old.http_only && !http {
                    return Err(ExclusionReason::OverwriteHttpOnly.into());
                }
                cookie.creation = old.creation;
                cookie.creation_index = old.creation_index;
                cookie.last_accessed = now;
                self.store.update_cookie(old, cookie.clone()).await?;
            }
            None => {
                cookie.creation = now;
                cookie.last_accessed = now;
                self.store.put_cookie(cookie.clone()).await?;
            }
        }

        Ok(cookie)
    }

    /// Cookies to send with a request to `url`, in retrieval order.
    pub fn get_cookies(
        &mut self,
        url: &Url,
        options: &GetCookieOptions,
    ) -> Result<Vec<CanonicalCookie>, CookieError> {
        let synchronous = self.store.is_synchronous();
        complete_sync(synchronous, self.get_cookies_async(url, options))
    }

    pub async fn get_cookies_async(
        &mut self,
        url: &Url,
        options: &GetCookieOptions,
    ) -> Result<Vec<CanonicalCookie>, CookieError> {
        let Some(host) = canonical_host_for_url(url) else {
            return Ok(Vec::new());
        };
        let path = match url.path() {
            "" => "/",
            path => path,
        };
        let now = options.now.unwrap_or_else(OffsetDateTime::now_utc);
        let secure = options.secure.unwrap_or_else(|| is_secure_scheme(url));

        let allow_special_use = self.config.allow_special_use_domain;
        let path_filter = (!options.all_paths).then_some(path);
        let mut candidates = self
            .store
            .find_cookies(&host, path_filter, allow_special_use)
            .await?;
        if !self.config.reject_public_suffixes {
            for suffix in suffix_domains(&host, self.psl.as_ref(), allow_special_use) {
                let scoped = self
                    .store
                    .find_cookies(&suffix, path_filter, allow_special_use)
                    .await?;
                candidates.extend(scoped);
            }
        }

        let mut matched = Vec::with_capacity(candidates.len());
        for cookie in candidates {
            if cookie.host_only {
                if cookie.domain != host {
                    continue;
                }
            } else if !domain_match(&host, &cookie.domain) {
                continue;
            }
            if !options.all_paths && !path_match(path, &cookie.path) {
                continue;
            }
            if cookie.secure && !secure {
                continue;
            }
            if cookie.http_only && !options.http {
                continue;
            }
            if let Some(context) = options.same_site_context {
                if cookie.same_site.level() > context.level() {
                    continue;
                }
            }
            if options.expire && cookie.is_expired(now) {
                if let Err(err) = self
                    .store
                    .remove_cookie(&cookie.domain, &cookie.path, &cookie.name)
                    .await
                {
                    tracing::warn!(
                        name = cookie.name.as_str(),
                        domain = cookie.domain.as_str(),
                        error = %err,
                        "failed to evict expired cookie"
                    );
                }
                continue;
            }
            matched.push(cookie);
        }

        if options.sort {
            matched.sort_by(cookie_compare);
        }

        for cookie in &mut matched {
            let old = cookie.clone();
            cookie.last_accessed = now;
            self.store.update_cookie(old, cookie.clone()).await?;
        }

        tracing::trace!(host = host.as_str(), path, count = matched.len(), "cookies selected");
        Ok(matched)
    }

    /// The `Cookie` request header value for `url`.
    pub fn get_cookie_string(
        &mut self,
        url: &Url,
        options: &GetCookieOptions,
    ) -> Result<String, CookieError> {
        let synchronous = self.store.is_synchronous();
        complete_sync(synchronous, self.get_cookie_string_async(url, options))
    }

    pub async fn get_cookie_string_async(
        &mut self,
        url: &Url,
        options: &GetCookieOptions,
    ) -> Result<String, CookieError> {
        let cookies = self.get_cookies_async(url, options).await?;
        Ok(cookies
            .iter()
            .map(CanonicalCookie::cookie_string)
            .collect::<Vec<_>>()
            .join("; "))
    }

    /// Matching cookies rendered in `Set-Cookie` form.
    pub fn get_set_cookie_strings(
        &mut self,
        url: &Url,
        options: &GetCookieOptions,
    ) -> Result<Vec<String>, CookieError> {
        let synchronous = self.store.is_synchronous();
        complete_sync(synchronous, self.get_set_cookie_strings_async(url, options))
    }

    pub async fn get_set_cookie_strings_async(
        &mut self,
        url: &Url,
        options: &GetCookieOptions,
    ) -> Result<Vec<String>, CookieError> {
        let cookies = self.get_cookies_async(url, options).await?;
        Ok(cookies.iter().map(ToString::to_string).collect())
    }

    /// Remove every cookie from the store.
    pub fn remove_all_cookies(&mut self) -> Result<(), CookieError> {
        let synchronous = self.store.is_synchronous();
        complete_sync(synchronous, self.remove_all_cookies_async())
    }

    pub async fn remove_all_cookies_async(&mut self) -> Result<(), CookieError> {
        match self.store.remove_all_cookies().await {
            Err(StoreError::Unsupported(_)) => {}
            result => return result.map_err(CookieError::from),
        }

        // Fall back to one removal per cookie
        let cookies = self.store.get_all_cookies().await?;
        for cookie in &cookies {
            self.store
                .remove_cookie(&cookie.domain, &cookie.path, &cookie.name)
                .await?;
        }
        Ok(())
    }

    /// Serializable copy of the policy and every stored cookie.
    pub fn snapshot(&self) -> Result<JarSnapshot, CookieError> {
        let synchronous = self.store.is_synchronous();
        complete_sync(synchronous, self.snapshot_async())
    }

    pub async fn snapshot_async(&self) -> Result<JarSnapshot, CookieError> {
        let cookies = self.store.get_all_cookies().await?;
        Ok(JarSnapshot {
            version: SNAPSHOT_VERSION.to_string(),
            store_type: Some(self.store.store_type().to_string()),
            reject_public_suffixes: self.config.reject_public_suffixes,
            enable_loose_mode: self.config.loose_mode,
            allow_special_use_domain: self.config.allow_special_use_domain,
            prefix_security: self.config.prefix_security,
            cookies,
        })
    }

    /// Rebuild a jar from `snapshot` on top of `store`.
    pub fn from_snapshot(snapshot: JarSnapshot, store: S) -> Result<Self, CookieError> {
        let synchronous = store.is_synchronous();
        complete_sync(synchronous, Self::from_snapshot_async(snapshot, store))
    }

    pub async fn from_snapshot_async(snapshot: JarSnapshot, store: S) -> Result<Self, CookieError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(CookieError::UnsupportedSnapshotVersion(snapshot.version));
        }

        let mut jar = Self::with_store(store, snapshot.config());
        for cookie in snapshot.cookies {
            jar.store.put_cookie(cookie).await?;
        }
        Ok(jar)
    }

    /// Copy this jar's policy and cookies onto `store`.
    pub fn clone_into<T: CookieStore>(&self, store: T) -> Result<CookieMonster<T>, CookieError> {
        let synchronous = self.store.is_synchronous() && store.is_synchronous();
        complete_sync(synchronous, self.clone_into_async(store))
    }

    pub async fn clone_into_async<T: CookieStore>(
        &self,
        store: T,
    ) -> Result<CookieMonster<T>, CookieError> {
        let snapshot = self.snapshot_async().await?;
        let jar = CookieMonster::from_snapshot_async(snapshot, store).await?;
        Ok(jar.with_public_suffix_list(Arc::clone(&self.psl)))
    }
}

/// Ways the acceptance pipeline can end without storing a cookie.
enum Rejection {
    Excluded(ExclusionReason),
    /// Dropped without reporting an error.
    Silent(ExclusionReason),
    Failed(CookieError),
}

impl From<ExclusionReason> for Rejection {
    fn from(reason: ExclusionReason) -> Self {
        Rejection::Excluded(reason)
    }
}

impl From<StoreError> for Rejection {
    fn from(err: StoreError) -> Self {
        Rejection::Failed(err.into())
    }
}

fn excluded(
    reason: ExclusionReason,
    options: &SetCookieOptions,
) -> Result<Option<CanonicalCookie>, CookieError> {
    if options.ignore_error {
        Ok(None)
    } else {
        Err(reason.into())
    }
}

/// Drive a jar future to completion without an executor.
///
/// Only valid for synchronous stores, whose futures are ready on first poll.
fn complete_sync<T>(
    synchronous: bool,
    fut: impl Future<Output = Result<T, CookieError>>,
) -> Result<T, CookieError> {
    if !synchronous {
        return Err(CookieError::SyncOnAsyncStore);
    }
    fut.now_or_never()
        .unwrap_or(Err(CookieError::SyncOnAsyncStore))
}

fn is_secure_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "https" | "wss")
}
