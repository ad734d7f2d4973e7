use anyhow::anyhow;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

use super::codegen::generate_short_code;
use super::error::{ShortenerError, ShortenerResult};
use crate::models::UrlRecord;
use crate::storage::{Storage, StorageError};

pub const DEFAULT_BASE_URL: &str = "http://shrt.est/";

#[derive(Debug, Clone)]
pub struct ShortenerConfig {
    /// Prefix joined verbatim with a code to form a short URL
    pub base_url: String,
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Check that `candidate` is an absolute URL with a scheme and a non-empty host.
///
/// The raw text must already be `scheme://authority...`; inputs the URL
/// parser would repair (`http:example.com`, backslashes) are rejected.
pub fn is_valid_url(candidate: &str) -> bool {
    if candidate.is_empty()
        || candidate.contains('\\')
        || candidate.chars().any(char::is_whitespace)
    {
        return false;
    }

    let Some((scheme, rest)) = candidate.split_once("://") else {
        return false;
    };
    let scheme_ok = scheme
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !scheme_ok || rest.starts_with('/') {
        return false;
    }

    match Url::parse(candidate) {
        Ok(url) => url.host_str().is_some_and(|host| !host.is_empty()),
        Err(_) => false,
    }
}

pub struct Shortener {
    storage: Arc<dyn Storage>,
    config: ShortenerConfig,
}

impl Shortener {
    pub fn new(storage: Arc<dyn Storage>, config: ShortenerConfig) -> Self {
        Self { storage, config }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn short_url(&self, short_code: &str) -> String {
        format!("{}{}", self.config.base_url, short_code)
    }

    /// Strip every occurrence of the base prefix. Input without the prefix
    /// is taken as a bare code.
    pub fn extract_code(&self, short_url: &str) -> String {
        if self.config.base_url.is_empty() {
            return short_url.to_string();
        }
        short_url.replace(&self.config.base_url, "")
    }

    /// Map a long URL to its short URL, creating the record on first use.
    pub async fn encode(&self, long_url: &str) -> ShortenerResult<String> {
        if !is_valid_url(long_url) {
            return Err(ShortenerError::InvalidUrl);
        }

        if let Some(record) = self.storage.find_by_url(long_url).await? {
            let short_code = self.code_of(record).await?;
            return Ok(self.short_url(&short_code));
        }

        match self.storage.insert(long_url).await {
            Ok(id) => {
                let short_code = self.assign_code(id).await?;
                info!(id, short_code = %short_code, "created short URL");
                Ok(self.short_url(&short_code))
            }
            Err(StorageError::Conflict) => {
                // Another request inserted the same URL between our lookup and insert
                warn!(long_url, "insert raced with a concurrent encode, reusing its record");
                let record = self.storage.find_by_url(long_url).await?.ok_or_else(|| {
                    StorageError::Other(anyhow!("record for {long_url} missing after conflict"))
                })?;
                let short_code = self.code_of(record).await?;
                Ok(self.short_url(&short_code))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a short URL (or bare code) to the long URL it was created for.
    pub async fn decode(&self, short_url: &str) -> ShortenerResult<String> {
        let short_code = self.extract_code(short_url);

        match self.storage.find_by_code(&short_code).await? {
            Some(record) => Ok(record.long_url),
            None => Err(ShortenerError::NotFound),
        }
    }

    async fn code_of(&self, record: UrlRecord) -> ShortenerResult<String> {
        match record.short_code {
            Some(short_code) if !short_code.is_empty() => Ok(short_code),
            _ => {
                warn!(id = record.id, "record has no short code, assigning it now");
                self.assign_code(record.id).await
            }
        }
    }

    async fn assign_code(&self, id: i64) -> ShortenerResult<String> {
        let numeric_id = u64::try_from(id)
            .map_err(|_| StorageError::Other(anyhow!("storage returned negative id {id}")))?;
        let short_code = generate_short_code(numeric_id);
        self.storage.set_code(id, &short_code).await?;
        Ok(short_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, StorageResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Wraps `MemoryStorage` to count writes and optionally fail `set_code`
    #[derive(Default)]
    struct ProbeStorage {
        inner: MemoryStorage,
        writes: AtomicUsize,
        fail_set_code: AtomicBool,
    }

    #[async_trait]
    impl Storage for ProbeStorage {
        async fn init(&self) -> anyhow::Result<()> {
            self.inner.init().await
        }

        async fn find_by_url(&self, long_url: &str) -> StorageResult<Option<UrlRecord>> {
            self.inner.find_by_url(long_url).await
        }

        async fn find_by_code(&self, short_code: &str) -> StorageResult<Option<UrlRecord>> {
            self.inner.find_by_code(short_code).await
        }

        async fn insert(&self, long_url: &str) -> StorageResult<i64> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.insert(long_url).await
        }

        async fn set_code(&self, id: i64, short_code: &str) -> StorageResult<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail_set_code.load(Ordering::SeqCst) {
                return Err(StorageError::Other(anyhow!("connection lost")));
            }
            self.inner.set_code(id, short_code).await
        }
    }

    fn shortener_with(storage: Arc<ProbeStorage>) -> Shortener {
        Shortener::new(storage, ShortenerConfig::default())
    }

    #[test]
    fn test_url_validation() {
        assert!(is_valid_url("https://example.com/page"));
        assert!(is_valid_url("http://localhost:8080/a?b=c#d"));
        assert!(is_valid_url("ftp://files.example.org/pub"));

        assert!(!is_valid_url(""));
        assert!(!is_valid_url("not-a-url"));
        assert!(!is_valid_url("example.com/page"));
        assert!(!is_valid_url("http://"));
        assert!(!is_valid_url("mailto:someone@example.com"));
        assert!(!is_valid_url("https://exa mple.com"));
        assert!(!is_valid_url(" https://example.com"));

        // Forms the URL parser would silently repair into a host
        assert!(!is_valid_url("http:example.com"));
        assert!(!is_valid_url("http:/example.com"));
        assert!(!is_valid_url("http:///example.com"));
        assert!(!is_valid_url("https:\\\\example.com\\x"));
        assert!(!is_valid_url("http://example.com\\path"));
        assert!(!is_valid_url("1http://example.com"));
    }

    #[tokio::test]
    async fn test_repairable_url_is_rejected_without_writes() {
        let storage = Arc::new(ProbeStorage::default());
        let shortener = shortener_with(Arc::clone(&storage));

        for long_url in ["http:example.com", "http://example.com\\path"] {
            let err = shortener.encode(long_url).await.unwrap_err();
            assert!(matches!(err, ShortenerError::InvalidUrl), "{long_url}");
        }
        assert_eq!(storage.writes.load(Ordering::SeqCst), 0);
        assert!(storage.inner.is_empty().await);
    }

    #[test]
    fn test_extract_code() {
        let shortener = shortener_with(Arc::default());

        assert_eq!(shortener.extract_code("http://shrt.est/000001"), "000001");
        assert_eq!(shortener.extract_code("000001"), "000001");
        assert_eq!(shortener.extract_code("https://shrt.est/000001"), "https://shrt.est/000001");
    }

    #[tokio::test]
    async fn test_first_encode_on_empty_store() {
        let storage = Arc::new(ProbeStorage::default());
        let shortener = shortener_with(Arc::clone(&storage));

        let short_url = shortener.encode("https://example.com/page").await.unwrap();
        assert_eq!(short_url, "http://shrt.est/000001");

        let record = storage.find_by_code("000001").await.unwrap().unwrap();
        assert_eq!(record.id, 1);
        assert_eq!(record.long_url, "https://example.com/page");
    }

    #[tokio::test]
    async fn test_round_trip() {
        let shortener = shortener_with(Arc::default());

        for long_url in [
            "https://example.com/a",
            "https://example.com/b?q=1",
            "http://192.168.0.1:9000/path#frag",
        ] {
            let short_url = shortener.encode(long_url).await.unwrap();
            assert_eq!(shortener.decode(&short_url).await.unwrap(), long_url);
        }
    }

    #[tokio::test]
    async fn test_encode_is_idempotent() {
        let storage = Arc::new(ProbeStorage::default());
        let shortener = shortener_with(Arc::clone(&storage));

        let first = shortener.encode("https://example.com").await.unwrap();
        let writes = storage.writes.load(Ordering::SeqCst);
        let second = shortener.encode("https://example.com").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(storage.writes.load(Ordering::SeqCst), writes);
        assert_eq!(storage.inner.len().await, 1);
    }

    #[tokio::test]
    async fn test_invalid_url_writes_nothing() {
        let storage = Arc::new(ProbeStorage::default());
        let shortener = shortener_with(Arc::clone(&storage));

        let err = shortener.encode("not-a-url").await.unwrap_err();
        assert!(matches!(err, ShortenerError::InvalidUrl));
        assert_eq!(err.to_string(), "Invalid URL");
        assert_eq!(storage.writes.load(Ordering::SeqCst), 0);
        assert!(storage.inner.is_empty().await);
    }

    #[tokio::test]
    async fn test_decode_unknown_code() {
        let shortener = shortener_with(Arc::default());
        shortener.encode("https://example.com").await.unwrap();

        let err = shortener.decode("http://shrt.est/zzzzzz").await.unwrap_err();
        assert!(matches!(err, ShortenerError::NotFound));
        assert_eq!(err.to_string(), "Short URL not found");
    }

    #[tokio::test]
    async fn test_decode_accepts_bare_code() {
        let shortener = shortener_with(Arc::default());
        shortener.encode("https://example.com").await.unwrap();

        assert_eq!(shortener.decode("000001").await.unwrap(), "https://example.com");
    }

    #[tokio::test]
    async fn test_custom_base_url() {
        let shortener = Shortener::new(
            Arc::new(MemoryStorage::new()),
            ShortenerConfig {
                base_url: "https://s.test/x/".to_string(),
            },
        );

        let short_url = shortener.encode("https://example.com").await.unwrap();
        assert_eq!(short_url, "https://s.test/x/000001");
        assert_eq!(shortener.decode(&short_url).await.unwrap(), "https://example.com");
        assert!(matches!(
            shortener.decode("http://shrt.est/000001").await,
            Err(ShortenerError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_failure_between_insert_and_set_code_is_repaired() {
        let storage = Arc::new(ProbeStorage::default());
        let shortener = shortener_with(Arc::clone(&storage));

        storage.fail_set_code.store(true, Ordering::SeqCst);
        let err = shortener.encode("https://example.com/orphan").await.unwrap_err();
        assert!(matches!(err, ShortenerError::Storage(_)));

        // The row exists without a code and cannot be decoded
        let orphan = storage
            .find_by_url("https://example.com/orphan")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(orphan.short_code, None);
        assert!(matches!(
            shortener.decode("http://shrt.est/000001").await,
            Err(ShortenerError::NotFound)
        ));

        // The next encode assigns the id-derived code instead of inserting again
        storage.fail_set_code.store(false, Ordering::SeqCst);
        let short_url = shortener.encode("https://example.com/orphan").await.unwrap();
        assert_eq!(short_url, "http://shrt.est/000001");
        assert_eq!(storage.inner.len().await, 1);
        assert_eq!(
            shortener.decode(&short_url).await.unwrap(),
            "https://example.com/orphan"
        );
    }

    #[tokio::test]
    async fn test_concurrent_encode_of_same_url() {
        let shortener = Arc::new(shortener_with(Arc::default()));

        let mut handles = vec![];
        for _ in 0..16 {
            let shortener = Arc::clone(&shortener);
            handles.push(tokio::spawn(async move {
                shortener.encode("https://example.com/hot").await
            }));
        }

        for handle in handles {
            let short_url = handle.await.unwrap().unwrap();
            assert_eq!(short_url, "http://shrt.est/000001");
        }
    }
}
