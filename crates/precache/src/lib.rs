use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Versioned list of asset URLs to cache ahead of first use.
///
/// The cache name is derived from the URL list itself, so any change to the
/// list yields a new generation and the previous cache is invalidated
/// wholesale on install; there is no per-entry versioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecacheManifest {
    pub cache_name: String,
    pub urls: Vec<String>,
}

impl PrecacheManifest {
    pub fn new(urls: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut urls: Vec<String> = urls.into_iter().map(Into::into).collect();
        urls.sort();
        urls.dedup();
        let cache_name = cache_name_for_urls(&urls);
        Self { cache_name, urls }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, PrecacheError> {
        serde_json::from_str(raw).map_err(|e| PrecacheError::Corrupt(e.to_string()))
    }

    pub fn to_json_string(&self) -> Result<String, PrecacheError> {
        serde_json::to_string(self).map_err(|e| PrecacheError::Io(e.to_string()))
    }
}

/// Content-derived cache generation name.
pub fn cache_name_for_urls(urls: &[String]) -> String {
    let mut hasher = blake3::Hasher::new();
    for url in urls {
        hasher.update(url.as_bytes());
        hasher.update(b"\n");
    }
    let hex = hasher.finalize().to_hex();
    format!("showfloor-{}", &hex.as_str()[..16])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrecacheError {
    StorageUnavailable,
    Corrupt(String),
    Io(String),
    Fetch { url: String, detail: String },
}

impl std::fmt::Display for PrecacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrecacheError::StorageUnavailable => write!(f, "browser storage unavailable"),
            PrecacheError::Corrupt(msg) => write!(f, "precache storage corrupt: {msg}"),
            PrecacheError::Io(msg) => write!(f, "precache storage error: {msg}"),
            PrecacheError::Fetch { url, detail } => {
                write!(f, "failed to fetch {url}: {detail}")
            }
        }
    }
}

impl std::error::Error for PrecacheError {}

/// Byte store behind the offline cache.
///
/// One generation is live at a time; `install` wipes stored entries whenever
/// the manifest's cache name differs from the stored generation.
pub trait PrecacheStore {
    fn generation(&self) -> Result<Option<String>, PrecacheError>;
    fn set_generation(&mut self, name: &str) -> Result<(), PrecacheError>;
    fn put(&mut self, url: &str, bytes: &[u8]) -> Result<(), PrecacheError>;
    fn lookup(&self, url: &str) -> Result<Option<Vec<u8>>, PrecacheError>;
    fn remove(&mut self, url: &str) -> Result<bool, PrecacheError>;
    fn stored_urls(&self) -> Result<Vec<String>, PrecacheError>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub fetched: usize,
    pub already_cached: usize,
    pub evicted: usize,
    pub failed: Vec<String>,
}

/// Installs a manifest: fetch and store every URL under the current cache
/// name, evicting any previous generation wholesale first.
///
/// A URL that fails to fetch is recorded in the report and does not abort
/// the remaining installs.
pub fn install(
    manifest: &PrecacheManifest,
    store: &mut dyn PrecacheStore,
    fetch: &mut dyn FnMut(&str) -> Result<Vec<u8>, PrecacheError>,
) -> Result<InstallReport, PrecacheError> {
    let mut report = InstallReport::default();

    if store.generation()?.as_deref() != Some(manifest.cache_name.as_str()) {
        for url in store.stored_urls()? {
            if store.remove(&url)? {
                report.evicted += 1;
            }
        }
        store.set_generation(&manifest.cache_name)?;
    }

    for url in &manifest.urls {
        if store.lookup(url)?.is_some() {
            report.already_cached += 1;
            continue;
        }
        match fetch(url) {
            Ok(bytes) => {
                store.put(url, &bytes)?;
                report.fetched += 1;
            }
            Err(_) => report.failed.push(url.clone()),
        }
    }

    Ok(report)
}

/// Cache-first read; `None` tells the caller to fall back to the network.
pub fn lookup(store: &dyn PrecacheStore, url: &str) -> Result<Option<Vec<u8>>, PrecacheError> {
    store.lookup(url)
}

pub fn bytes_to_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

pub fn base64_to_bytes(raw: &str) -> Result<Vec<u8>, PrecacheError> {
    base64::engine::general_purpose::STANDARD
        .decode(raw)
        .map_err(|e| PrecacheError::Corrupt(e.to_string()))
}

#[derive(Debug, Default)]
pub struct InMemoryPrecacheStore {
    generation: Option<String>,
    entries: BTreeMap<String, Vec<u8>>,
}

impl InMemoryPrecacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PrecacheStore for InMemoryPrecacheStore {
    fn generation(&self) -> Result<Option<String>, PrecacheError> {
        Ok(self.generation.clone())
    }

    fn set_generation(&mut self, name: &str) -> Result<(), PrecacheError> {
        self.generation = Some(name.to_string());
        Ok(())
    }

    fn put(&mut self, url: &str, bytes: &[u8]) -> Result<(), PrecacheError> {
        self.entries.insert(url.to_string(), bytes.to_vec());
        Ok(())
    }

    fn lookup(&self, url: &str) -> Result<Option<Vec<u8>>, PrecacheError> {
        Ok(self.entries.get(url).cloned())
    }

    fn remove(&mut self, url: &str) -> Result<bool, PrecacheError> {
        Ok(self.entries.remove(url).is_some())
    }

    fn stored_urls(&self) -> Result<Vec<String>, PrecacheError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

#[cfg(target_arch = "wasm32")]
mod wasm_storage {
    use super::{PrecacheError, PrecacheStore, base64_to_bytes};
    use base64::Engine as _;

    // Keep per-chunk strings relatively small to reduce peak wasm allocations.
    // IMPORTANT: must be a multiple of 4 to preserve base64 quartet boundaries.
    const ASSET_CHUNK_CHARS: usize = 64_000;

    /// `localStorage`-backed precache store.
    ///
    /// Layout under `key_prefix`:
    /// - `{prefix}.generation`: the live cache name
    /// - `{prefix}.index`: JSON list of stored URLs
    /// - `{prefix}.asset.{url}.count`: chunk count per URL
    /// - `{prefix}.asset.{url}.{i}`: base64 chunks
    #[derive(Debug)]
    pub struct LocalStoragePrecacheStore {
        key_prefix: String,
    }

    impl LocalStoragePrecacheStore {
        pub fn new(key_prefix: impl Into<String>) -> Result<Self, PrecacheError> {
            // Probe storage availability up front.
            let _ = window_local_storage()?;
            Ok(Self {
                key_prefix: key_prefix.into(),
            })
        }

        fn generation_key(&self) -> String {
            format!("{}.generation", self.key_prefix)
        }

        fn index_key(&self) -> String {
            format!("{}.index", self.key_prefix)
        }

        fn count_key(&self, url: &str) -> String {
            format!("{}.asset.{}.count", self.key_prefix, url)
        }

        fn chunk_key(&self, url: &str, idx: usize) -> String {
            format!("{}.asset.{}.{}", self.key_prefix, url, idx)
        }

        fn load_index(&self) -> Result<Vec<String>, PrecacheError> {
            let storage = window_local_storage()?;
            let raw = storage
                .get_item(&self.index_key())
                .map_err(|e| PrecacheError::Io(format!("get_item(index) failed: {:?}", e)))?;
            let Some(raw) = raw else {
                return Ok(Vec::new());
            };
            if raw.trim().is_empty() {
                return Ok(Vec::new());
            }
            let mut urls = serde_json::from_str::<Vec<String>>(&raw)
                .map_err(|e| PrecacheError::Corrupt(e.to_string()))?;
            urls.sort();
            urls.dedup();
            Ok(urls)
        }

        fn save_index(&self, mut urls: Vec<String>) -> Result<(), PrecacheError> {
            urls.sort();
            urls.dedup();
            let storage = window_local_storage()?;
            let raw =
                serde_json::to_string(&urls).map_err(|e| PrecacheError::Io(e.to_string()))?;
            storage
                .set_item(&self.index_key(), &raw)
                .map_err(|e| PrecacheError::Io(format!("set_item(index) failed: {:?}", e)))?;
            Ok(())
        }

        fn load_chunk_count(&self, url: &str) -> Result<usize, PrecacheError> {
            let storage = window_local_storage()?;
            let raw = storage
                .get_item(&self.count_key(url))
                .map_err(|e| PrecacheError::Io(format!("get_item(count) failed: {:?}", e)))?;
            let Some(raw) = raw else {
                return Ok(0);
            };
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(0);
            }
            raw.parse::<usize>()
                .map_err(|e| PrecacheError::Corrupt(format!("invalid chunk count: {e}")))
        }

        fn remove_chunks(&self, url: &str) -> Result<(), PrecacheError> {
            let storage = window_local_storage()?;
            let count = self.load_chunk_count(url)?;
            for i in 0..count {
                let _ = storage.remove_item(&self.chunk_key(url, i));
            }
            let _ = storage.remove_item(&self.count_key(url));
            Ok(())
        }
    }

    impl PrecacheStore for LocalStoragePrecacheStore {
        fn generation(&self) -> Result<Option<String>, PrecacheError> {
            let storage = window_local_storage()?;
            storage
                .get_item(&self.generation_key())
                .map_err(|e| PrecacheError::Io(format!("get_item(generation) failed: {:?}", e)))
        }

        fn set_generation(&mut self, name: &str) -> Result<(), PrecacheError> {
            let storage = window_local_storage()?;
            storage
                .set_item(&self.generation_key(), name)
                .map_err(|e| PrecacheError::Io(format!("set_item(generation) failed: {:?}", e)))
        }

        fn put(&mut self, url: &str, bytes: &[u8]) -> Result<(), PrecacheError> {
            let storage = window_local_storage()?;

            // Convert max output chars to a safe input chunk size.
            let chunk_bytes = (ASSET_CHUNK_CHARS / 4) * 3;
            let chunk_bytes = chunk_bytes.max(3);

            // Clean up any previous chunk data for this url first.
            self.remove_chunks(url)?;

            let mut count = 0usize;
            for (i, chunk) in bytes.chunks(chunk_bytes).enumerate() {
                let b64 = base64::engine::general_purpose::STANDARD.encode(chunk);
                storage
                    .set_item(&self.chunk_key(url, i), &b64)
                    .map_err(|e| PrecacheError::Io(format!("set_item(chunk) failed: {:?}", e)))?;
                count = i + 1;
            }
            storage
                .set_item(&self.count_key(url), &count.to_string())
                .map_err(|e| PrecacheError::Io(format!("set_item(count) failed: {:?}", e)))?;

            let mut urls = self.load_index()?;
            if !urls.iter().any(|u| u == url) {
                urls.push(url.to_string());
                self.save_index(urls)?;
            }
            Ok(())
        }

        fn lookup(&self, url: &str) -> Result<Option<Vec<u8>>, PrecacheError> {
            let count = self.load_chunk_count(url)?;
            if count == 0 {
                return Ok(None);
            }
            let storage = window_local_storage()?;
            let mut out: Vec<u8> = Vec::new();
            for i in 0..count {
                let raw = storage
                    .get_item(&self.chunk_key(url, i))
                    .map_err(|e| PrecacheError::Io(format!("get_item(chunk) failed: {:?}", e)))?
                    .ok_or_else(|| PrecacheError::Corrupt("missing asset chunk".to_string()))?;
                let bytes = base64_to_bytes(&raw)?;
                out.extend_from_slice(&bytes);
            }
            Ok(Some(out))
        }

        fn remove(&mut self, url: &str) -> Result<bool, PrecacheError> {
            let existed = self.load_chunk_count(url)? > 0;
            self.remove_chunks(url)?;
            let mut urls = self.load_index()?;
            let before = urls.len();
            urls.retain(|u| u != url);
            if urls.len() != before {
                self.save_index(urls)?;
            }
            Ok(existed)
        }

        fn stored_urls(&self) -> Result<Vec<String>, PrecacheError> {
            self.load_index()
        }
    }

    fn window_local_storage() -> Result<web_sys::Storage, PrecacheError> {
        let win = web_sys::window().ok_or(PrecacheError::StorageUnavailable)?;
        win.local_storage()
            .map_err(|e| PrecacheError::Io(format!("localStorage error: {:?}", e)))?
            .ok_or(PrecacheError::StorageUnavailable)
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_storage::LocalStoragePrecacheStore;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct LocalStoragePrecacheStore;

#[cfg(not(target_arch = "wasm32"))]
impl LocalStoragePrecacheStore {
    pub fn new(_key_prefix: impl Into<String>) -> Result<Self, PrecacheError> {
        Err(PrecacheError::StorageUnavailable)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl PrecacheStore for LocalStoragePrecacheStore {
    fn generation(&self) -> Result<Option<String>, PrecacheError> {
        Err(PrecacheError::StorageUnavailable)
    }

    fn set_generation(&mut self, _name: &str) -> Result<(), PrecacheError> {
        Err(PrecacheError::StorageUnavailable)
    }

    fn put(&mut self, _url: &str, _bytes: &[u8]) -> Result<(), PrecacheError> {
        Err(PrecacheError::StorageUnavailable)
    }

    fn lookup(&self, _url: &str) -> Result<Option<Vec<u8>>, PrecacheError> {
        Err(PrecacheError::StorageUnavailable)
    }

    fn remove(&mut self, _url: &str) -> Result<bool, PrecacheError> {
        Err(PrecacheError::StorageUnavailable)
    }

    fn stored_urls(&self) -> Result<Vec<String>, PrecacheError> {
        Err(PrecacheError::StorageUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        InMemoryPrecacheStore, PrecacheError, PrecacheManifest, PrecacheStore, install, lookup,
    };
    use pretty_assertions::assert_eq;

    fn showcase_manifest() -> PrecacheManifest {
        PrecacheManifest::new([
            "./index.html",
            "./style.css",
            "assets/images/bg.exr",
            "assets/images/blackSupraComp2.glb",
            "assets/images/phoneV2Comp.glb",
            "assets/images/tabletV2Comp.glb",
            "assets/images/manualComp.glb",
        ])
    }

    #[test]
    fn cache_name_tracks_the_url_list() {
        let a = showcase_manifest();
        let b = showcase_manifest();
        assert_eq!(a.cache_name, b.cache_name);

        let changed = PrecacheManifest::new(["./index.html"]);
        assert_ne!(a.cache_name, changed.cache_name);
        assert!(a.cache_name.starts_with("showfloor-"));
    }

    #[test]
    fn url_order_does_not_change_the_generation() {
        let a = PrecacheManifest::new(["b", "a"]);
        let b = PrecacheManifest::new(["a", "b"]);
        assert_eq!(a.cache_name, b.cache_name);
        assert_eq!(a.urls, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn install_fetches_and_stores_every_url() {
        let manifest = showcase_manifest();
        let mut store = InMemoryPrecacheStore::new();
        let mut fetch =
            |url: &str| -> Result<Vec<u8>, PrecacheError> { Ok(url.as_bytes().to_vec()) };

        let report = install(&manifest, &mut store, &mut fetch).unwrap();
        assert_eq!(report.fetched, manifest.urls.len());
        assert!(report.failed.is_empty());
        assert_eq!(
            lookup(&store, "assets/images/bg.exr").unwrap(),
            Some(b"assets/images/bg.exr".to_vec())
        );
        assert_eq!(store.generation().unwrap(), Some(manifest.cache_name));
    }

    #[test]
    fn reinstalling_the_same_generation_skips_cached_urls() {
        let manifest = showcase_manifest();
        let mut store = InMemoryPrecacheStore::new();
        let mut fetches = 0usize;
        let mut fetch = |url: &str| -> Result<Vec<u8>, PrecacheError> {
            fetches += 1;
            Ok(url.as_bytes().to_vec())
        };

        install(&manifest, &mut store, &mut fetch).unwrap();
        let report = install(&manifest, &mut store, &mut fetch).unwrap();
        assert_eq!(report.already_cached, manifest.urls.len());
        assert_eq!(report.fetched, 0);
        assert_eq!(fetches, manifest.urls.len());
    }

    #[test]
    fn version_bump_evicts_the_previous_generation_wholesale() {
        let old = PrecacheManifest::new(["a", "b"]);
        let mut store = InMemoryPrecacheStore::new();
        let mut fetch =
            |url: &str| -> Result<Vec<u8>, PrecacheError> { Ok(url.as_bytes().to_vec()) };
        install(&old, &mut store, &mut fetch).unwrap();

        let new = PrecacheManifest::new(["b", "c"]);
        let report = install(&new, &mut store, &mut fetch).unwrap();
        assert_eq!(report.evicted, 2);
        // "b" was evicted with the old generation and fetched again.
        assert_eq!(report.fetched, 2);
        assert_eq!(lookup(&store, "a").unwrap(), None);
        assert!(lookup(&store, "b").unwrap().is_some());
        assert!(lookup(&store, "c").unwrap().is_some());
    }

    #[test]
    fn a_failed_url_does_not_abort_the_rest() {
        let manifest = PrecacheManifest::new(["bad", "good"]);
        let mut store = InMemoryPrecacheStore::new();
        let mut fetch = |url: &str| {
            if url == "bad" {
                Err(PrecacheError::Fetch {
                    url: url.to_string(),
                    detail: "offline".to_string(),
                })
            } else {
                Ok(vec![1, 2, 3])
            }
        };

        let report = install(&manifest, &mut store, &mut fetch).unwrap();
        assert_eq!(report.failed, vec!["bad".to_string()]);
        assert_eq!(report.fetched, 1);
        assert_eq!(lookup(&store, "good").unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(lookup(&store, "bad").unwrap(), None);
    }

    #[test]
    fn manifest_round_trips_through_json() {
        let manifest = showcase_manifest();
        let json = manifest.to_json_string().unwrap();
        assert_eq!(PrecacheManifest::from_json_str(&json).unwrap(), manifest);
    }

    #[test]
    fn base64_round_trip() {
        let bytes = vec![0u8, 1, 2, 250, 251, 252];
        let encoded = super::bytes_to_base64(&bytes);
        assert_eq!(super::base64_to_bytes(&encoded).unwrap(), bytes);
    }
}
