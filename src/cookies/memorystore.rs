use crate::base::cookieerror::StoreError;
use crate::cookies::canonicalcookie::CanonicalCookie;
use crate::cookies::cookieutil::{is_ip_address, path_match, permute_domain};
use crate::cookies::psl::{registered_domain_for, MozillaPsl, PublicSuffixList};
use crate::cookies::store::{CookieStore, StoreFuture};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

// Index: domain -> path -> name -> cookie
type PathIndex = HashMap<String, HashMap<String, CanonicalCookie>>;

/// The reference in-memory store.
///
/// Cookies are indexed by domain, then path, then name, so lookups walk the
/// domain permutations of the request host and hit each bucket directly.
/// A second index groups the domain buckets by registrable domain.
/// Every operation completes immediately.
pub struct MemoryCookieStore {
    idx: HashMap<String, PathIndex>,
    // registrable domain -> domains with a bucket in `idx`
    sites: HashMap<String, HashSet<String>>,
    psl: Arc<dyn PublicSuffixList>,
}

impl Default for MemoryCookieStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryCookieStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCookieStore")
            .field("len", &self.len())
            .finish()
    }
}

impl MemoryCookieStore {
    pub fn new() -> Self {
        Self::with_public_suffix_list(Arc::new(MozillaPsl))
    }

    /// Use `psl` to compute the domain buckets a lookup visits.
    pub fn with_public_suffix_list(psl: Arc<dyn PublicSuffixList>) -> Self {
        Self {
            idx: HashMap::new(),
            sites: HashMap::new(),
            psl,
        }
    }

    /// Total number of stored cookies.
    pub fn len(&self) -> usize {
        self.idx
            .values()
            .flat_map(|paths| paths.values())
            .map(|names| names.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn site_of(&self, domain: &str) -> String {
        if is_ip_address(domain) {
            return domain.to_string();
        }
        match registered_domain_for(self.psl.as_ref(), domain, true) {
            Ok(Some(site)) => site,
            _ => domain.to_string(),
        }
    }

    fn insert(&mut self, cookie: CanonicalCookie) {
        if !self.idx.contains_key(&cookie.domain) {
            let site = self.site_of(&cookie.domain);
            self.sites
                .entry(site)
                .or_default()
                .insert(cookie.domain.clone());
        }
        self.idx
            .entry(cookie.domain.clone())
            .or_default()
            .entry(cookie.path.clone())
            .or_default()
            .insert(cookie.name.clone(), cookie);
    }

    fn lookup(&self, domain: &str, path: &str, name: &str) -> Option<CanonicalCookie> {
        self.idx.get(domain)?.get(path)?.get(name).cloned()
    }

    fn collect(
        &self,
        domain: &str,
        path: Option<&str>,
        allow_special_use: bool,
    ) -> Vec<CanonicalCookie> {
        if domain.is_empty() {
            return Vec::new();
        }

        let mut results = Vec::new();
        for bucket in permute_domain(domain, self.psl.as_ref(), allow_special_use) {
            let Some(paths) = self.idx.get(&bucket) else {
                continue;
            };
            for (cookie_path, names) in paths {
                if path.is_some_and(|request_path| !path_match(request_path, cookie_path)) {
                    continue;
                }
                results.extend(names.values().cloned());
            }
        }

        tracing::trace!(domain, path, found = results.len(), "cookie store lookup");
        results
    }

    fn delete(&mut self, domain: &str, path: &str, name: &str) {
        let Some(paths) = self.idx.get_mut(domain) else {
            return;
        };
        if let Some(names) = paths.get_mut(path) {
            names.remove(name);
            if names.is_empty() {
                paths.remove(path);
            }
        }
        if paths.is_empty() {
            self.drop_bucket(domain);
        }
    }

    fn delete_domain(&mut self, domain: &str, path: Option<&str>) {
        match path {
            None => self.drop_bucket(domain),
            Some(path) => {
                if let Some(paths) = self.idx.get_mut(domain) {
                    paths.remove(path);
                    if paths.is_empty() {
                        self.drop_bucket(domain);
                    }
                }
            }
        }
    }

    fn drop_bucket(&mut self, domain: &str) {
        if self.idx.remove(domain).is_none() {
            return;
        }
        let site = self.site_of(domain);
        if let Some(domains) = self.sites.get_mut(&site) {
            domains.remove(domain);
            if domains.is_empty() {
                self.sites.remove(&site);
            }
        }
    }

    fn collect_site(&self, domain: &str) -> Vec<CanonicalCookie> {
        let site = self.site_of(domain);
        let Some(domains) = self.sites.get(&site) else {
            return Vec::new();
        };
        domains
            .iter()
            .filter_map(|bucket| self.idx.get(bucket))
            .flat_map(|paths| paths.values())
            .flat_map(|names| names.values().cloned())
            .collect()
    }

    fn all(&self) -> Vec<CanonicalCookie> {
        let mut cookies: Vec<CanonicalCookie> = self
            .idx
            .values()
            .flat_map(|paths| paths.values())
            .flat_map(|names| names.values().cloned())
            .collect();
        cookies.sort_by_key(|cookie| cookie.creation_index);
        cookies
    }
}

fn ready<'a, T: Send + 'a>(value: T) -> StoreFuture<'a, T> {
    Box::pin(std::future::ready(Ok::<T, StoreError>(value)))
}

impl CookieStore for MemoryCookieStore {
    fn is_synchronous(&self) -> bool {
        true
    }

    fn store_type(&self) -> &'static str {
        "MemoryCookieStore"
    }

    fn find_cookie<'a>(
        &'a self,
        domain: &'a str,
        path: &'a str,
        name: &'a str,
    ) -> StoreFuture<'a, Option<CanonicalCookie>> {
        ready(self.lookup(domain, path, name))
    }

    fn find_cookies<'a>(
        &'a self,
        domain: &'a str,
        path: Option<&'a str>,
        allow_special_use: bool,
    ) -> StoreFuture<'a, Vec<CanonicalCookie>> {
        ready(self.collect(domain, path, allow_special_use))
    }

    fn put_cookie(&mut self, cookie: CanonicalCookie) -> StoreFuture<'_, ()> {
        self.insert(cookie);
        ready(())
    }

    fn update_cookie(
        &mut self,
        _old: CanonicalCookie,
        new: CanonicalCookie,
    ) -> StoreFuture<'_, ()> {
        self.insert(new);
        ready(())
    }

    fn remove_cookie<'a>(
        &'a mut self,
        domain: &'a str,
        path: &'a str,
        name: &'a str,
    ) -> StoreFuture<'a, ()> {
        self.delete(domain, path, name);
        ready(())
    }

    fn remove_cookies<'a>(
        &'a mut self,
        domain: &'a str,
        path: Option<&'a str>,
    ) -> StoreFuture<'a, ()> {
        self.delete_domain(domain, path);
        ready(())
    }

    fn remove_all_cookies(&mut self) -> StoreFuture<'_, ()> {
        self.idx.clear();
        self.sites.clear();
        ready(())
    }

    fn get_all_cookies(&self) -> StoreFuture<'_, Vec<CanonicalCookie>> {
        ready(self.all())
    }

    fn find_site_cookies<'a>(&'a self, domain: &'a str) -> StoreFuture<'a, Vec<CanonicalCookie>> {
        ready(self.collect_site(domain))
    }
}
