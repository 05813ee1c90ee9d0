//! Cookie persistence - save and load cookies to/from disk.
//!
//! A jar is persisted as a JSON [`JarSnapshot`]: the policy it was built
//! with plus every stored cookie in creation order. Creation sequence
//! numbers are not written; loading assigns fresh ones in array order so
//! relative ordering survives the round trip.

use crate::base::context::IoResultExt;
use crate::base::cookieerror::CookieError;
use crate::cookies::canonicalcookie::CanonicalCookie;
use crate::cookies::memorystore::MemoryCookieStore;
use crate::cookies::monster::CookieMonster;
use crate::cookies::options::{CookieMonsterConfig, PrefixSecurity};
use crate::cookies::store::CookieStore;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Format tag written into every snapshot.
pub const SNAPSHOT_VERSION: &str = "cookiemonster/1";

/// Serializable representation of a jar.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JarSnapshot {
    pub version: String,
    /// Diagnostic only; ignored when loading.
    #[serde(default)]
    pub store_type: Option<String>,
    pub reject_public_suffixes: bool,
    pub enable_loose_mode: bool,
    pub allow_special_use_domain: bool,
    #[serde(default)]
    pub prefix_security: PrefixSecurity,
    pub cookies: Vec<CanonicalCookie>,
}

impl JarSnapshot {
    /// The jar policy recorded in this snapshot.
    pub fn config(&self) -> CookieMonsterConfig {
        CookieMonsterConfig {
            reject_public_suffixes: self.reject_public_suffixes,
            loose_mode: self.enable_loose_mode,
            allow_special_use_domain: self.allow_special_use_domain,
            prefix_security: self.prefix_security,
        }
    }

    pub fn to_json(&self) -> Result<String, CookieError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, CookieError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Save cookies from a CookieMonster to a file.
///
/// # Example
/// ```ignore
/// persistence::save_cookies(&monster, Path::new("/path/to/cookies.json"))?;
/// ```
pub fn save_cookies<S: CookieStore>(
    monster: &CookieMonster<S>,
    path: &Path,
) -> Result<(), CookieError> {
    let json = monster.snapshot()?.to_json()?;
    fs::write(path, json).path_context(path)?;
    tracing::debug!(path = %path.display(), "saved cookie jar");
    Ok(())
}

/// Load cookies from a file into a new in-memory CookieMonster.
///
/// Expired cookies are loaded as well; retrieval evicts them.
pub fn load_cookies(path: &Path) -> Result<CookieMonster, CookieError> {
    load_cookies_into(path, MemoryCookieStore::new())
}

/// Load cookies from a file into a jar backed by `store`.
pub fn load_cookies_into<S: CookieStore>(
    path: &Path,
    store: S,
) -> Result<CookieMonster<S>, CookieError> {
    let json = fs::read_to_string(path).path_context(path)?;
    let snapshot = JarSnapshot::from_json(&json)?;
    tracing::debug!(path = %path.display(), count = snapshot.cookies.len(), "loading cookie jar");
    CookieMonster::from_snapshot(snapshot, store)
}

/// Async variant of [`save_cookies`], for jars on asynchronous stores.
pub async fn save_cookies_async<S: CookieStore>(
    monster: &CookieMonster<S>,
    path: &Path,
) -> Result<(), CookieError> {
    let json = monster.snapshot_async().await?.to_json()?;
    tokio::fs::write(path, json).await.path_context(path)?;
    tracing::debug!(path = %path.display(), "saved cookie jar");
    Ok(())
}

/// Async variant of [`load_cookies_into`].
pub async fn load_cookies_async<S: CookieStore>(
    path: &Path,
    store: S,
) -> Result<CookieMonster<S>, CookieError> {
    let json = tokio::fs::read_to_string(path).await.path_context(path)?;
    let snapshot = JarSnapshot::from_json(&json)?;
    tracing::debug!(path = %path.display(), count = snapshot.cookies.len(), "loading cookie jar");
    CookieMonster::from_snapshot_async(snapshot, store).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::options::{GetCookieOptions, SetCookieOptions};
    use tempfile::tempdir;
    use time::macros::datetime;
    use time::OffsetDateTime;
    use url::Url;

    const NOW: OffsetDateTime = datetime!(2024-06-01 12:00:00 UTC);

    fn populated_jar() -> CookieMonster {
        let mut jar = CookieMonster::new();
        let url = Url::parse("https://example.com/app/index.html").unwrap();
        for line in [
            "session=abc123; Secure; HttpOnly",
            "theme=dark; Path=/; Max-Age=3600",
            "lang=en; Domain=example.com; Expires=Wed, 01 Jan 2025 00:00:00 GMT",
        ] {
            jar.set_cookie(line, &url, &SetCookieOptions::at(NOW))
                .unwrap()
                .unwrap();
        }
        jar
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut jar = populated_jar();

        let dir = tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        save_cookies(&jar, &path).unwrap();

        let mut loaded = load_cookies(&path).unwrap();
        assert_eq!(loaded.config(), jar.config());
        assert_eq!(loaded.store().len(), 3);

        let url = Url::parse("https://example.com/app/x").unwrap();
        let options = GetCookieOptions::at(NOW);
        assert_eq!(
            loaded.get_cookie_string(&url, &options).unwrap(),
            jar.get_cookie_string(&url, &options).unwrap()
        );
    }

    #[test]
    fn test_snapshot_json_shape() {
        let jar = populated_jar();
        let json: serde_json::Value =
            serde_json::from_str(&jar.snapshot().unwrap().to_json().unwrap()).unwrap();

        assert_eq!(json["version"], SNAPSHOT_VERSION);
        assert_eq!(json["storeType"], "MemoryCookieStore");
        assert_eq!(json["rejectPublicSuffixes"], true);
        assert_eq!(json["enableLooseMode"], false);
        assert_eq!(json["prefixSecurity"], "silent");

        let cookies = json["cookies"].as_array().unwrap();
        assert_eq!(cookies[0]["name"], "session");
        assert_eq!(cookies[1]["expires"], "2024-06-01T13:00:00Z");
        assert!(cookies[1].get("maxAge").is_none());
        assert_eq!(cookies[2]["expires"], "2025-01-01T00:00:00Z");
        assert!(cookies.iter().all(|c| c.get("creationIndex").is_none()));
    }

    #[test]
    fn test_load_preserves_relative_order() {
        let jar = populated_jar();
        let snapshot = jar.snapshot().unwrap();
        let reloaded = JarSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();

        let indices: Vec<u64> = reloaded.cookies.iter().map(|c| c.creation_index).collect();
        assert!(indices.windows(2).all(|w| w[0] < w[1]));

        for (before, after) in snapshot.cookies.iter().zip(&reloaded.cookies) {
            let mut after = after.clone();
            after.creation_index = before.creation_index;
            assert_eq!(&after, before);
        }
    }

    #[test]
    fn test_unsupported_version() {
        let mut snapshot = populated_jar().snapshot().unwrap();
        snapshot.version = "legacy/0".to_string();
        let result = CookieMonster::from_snapshot(snapshot, MemoryCookieStore::new());
        assert!(matches!(
            result,
            Err(CookieError::UnsupportedSnapshotVersion(v)) if v == "legacy/0"
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.json");
        match load_cookies(&path) {
            Err(CookieError::Io { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected Io error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_cookies(&path), Err(CookieError::Json(_))));
    }

    #[tokio::test]
    async fn test_async_roundtrip() {
        let jar = populated_jar();
        let dir = tempdir().unwrap();
        let path = dir.path().join("cookies.json");

        save_cookies_async(&jar, &path).await.unwrap();
        let loaded = load_cookies_async(&path, MemoryCookieStore::new())
            .await
            .unwrap();
        assert_eq!(loaded.store().len(), jar.store().len());
    }
}
