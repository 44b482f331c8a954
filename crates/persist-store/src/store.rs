use std::path::Path;
use std::sync::Arc;

use persist_blob::{BlobError, BlobStore, FsBlobStore, CONTENT_TYPE_JSON};
use persist_lock::LockCoordinator;
use persist_types::{Clock, OwnerId, RecordKey, SystemClock};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};

/// Whether an operation takes part in the lock protocol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LockMode {
    /// Consult the `.lock` blob before touching the document.
    #[default]
    Respect,
    /// Skip every lock-blob operation.
    Ignore,
}

/// JSON documents keyed by name, each guarded by an advisory lock blob.
pub struct KeyedObjectStore<S: BlobStore + ?Sized> {
    blobs: Arc<S>,
    locks: LockCoordinator<S>,
    config: StoreConfig,
}

impl<S: BlobStore + ?Sized> Clone for KeyedObjectStore<S> {
    fn clone(&self) -> Self {
        Self {
            blobs: Arc::clone(&self.blobs),
            locks: self.locks.clone(),
            config: self.config.clone(),
        }
    }
}

impl KeyedObjectStore<FsBlobStore> {
    /// Open a store whose bucket is the directory `<root>/<bucket_name>`.
    pub async fn open_dir(
        root: impl AsRef<Path>,
        config: StoreConfig,
        owner: OwnerId,
    ) -> StoreResult<Self> {
        let blobs = Arc::new(FsBlobStore::new(root, config.bucket_name.clone()));
        Self::open(blobs, config, owner).await
    }
}

impl<S: BlobStore + ?Sized> KeyedObjectStore<S> {
    /// Open a store over `blobs`, failing if the bucket does not exist.
    pub async fn open(blobs: Arc<S>, config: StoreConfig, owner: OwnerId) -> StoreResult<Self> {
        Self::open_with_clock(blobs, config, owner, Arc::new(SystemClock)).await
    }

    /// Like [`open`](Self::open) with an explicit wall clock.
    pub async fn open_with_clock(
        blobs: Arc<S>,
        config: StoreConfig,
        owner: OwnerId,
        clock: Arc<dyn Clock>,
    ) -> StoreResult<Self> {
        config.validate()?;
        if blobs.bucket() != config.bucket_name {
            return Err(StoreError::InvalidConfig(format!(
                "store addresses bucket '{}' but bucket_name is '{}'",
                blobs.bucket(),
                config.bucket_name
            )));
        }
        if !blobs.bucket_exists().await? {
            return Err(StoreError::BucketNotFound {
                bucket: config.bucket_name.clone(),
            });
        }

        let locks = LockCoordinator::new(Arc::clone(&blobs), owner, config.coordinator_config())
            .with_clock(clock);
        info!(
            bucket = %config.bucket_name,
            folder = %config.folder_name,
            owner = %locks.owner(),
            "keyed object store opened"
        );
        Ok(Self {
            blobs,
            locks,
            config,
        })
    }

    pub fn owner(&self) -> &OwnerId {
        self.locks.owner()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Path of the lock blob for `key`.
    pub fn lock_path(&self, key: &str) -> StoreResult<String> {
        Ok(RecordKey::parse(key)?.lock_path(&self.config.folder_name))
    }

    /// Path of the document blob for `key`.
    pub fn data_path(&self, key: &str) -> StoreResult<String> {
        Ok(RecordKey::parse(key)?.data_path(&self.config.folder_name))
    }

    /// Read the document stored under `key`.
    ///
    /// With [`LockMode::Respect`] the key's lock is claimed for this owner
    /// first, and stays claimed after the call returns.
    pub async fn fetch(&self, key: &str, mode: LockMode) -> StoreResult<Value> {
        self.fetch_as(key, mode).await
    }

    /// [`fetch`](Self::fetch), decoding into `T`.
    pub async fn fetch_as<T: DeserializeOwned>(&self, key: &str, mode: LockMode) -> StoreResult<T> {
        let key = RecordKey::parse(key)?;
        let folder = &self.config.folder_name;

        if mode == LockMode::Respect {
            self.locks.acquire(&key.lock_path(folder)).await?;
        }

        let data_path = key.data_path(folder);
        let bytes = self
            .blobs
            .read_all(&data_path)
            .await
            .map_err(|e| match e {
                BlobError::NotFound { .. } => StoreError::NotFound {
                    key: key.to_string(),
                },
                source => StoreError::ReadFailed {
                    key: key.to_string(),
                    source,
                },
            })?;

        let value = serde_json::from_slice(&bytes).map_err(|source| StoreError::DecodeFailed {
            key: key.to_string(),
            source,
        })?;
        debug!(key = %key, len = bytes.len(), ?mode, "document fetched");
        Ok(value)
    }

    /// Write `value` as the document under `key`, replacing any previous one.
    ///
    /// With [`LockMode::Respect`] the write waits out a foreign lock and fails
    /// on a corrupted one. The lock blob itself is never created, refreshed,
    /// or deleted here.
    pub async fn persist<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        mode: LockMode,
    ) -> StoreResult<()> {
        let key = RecordKey::parse(key)?;
        let folder = &self.config.folder_name;

        if mode == LockMode::Respect {
            self.locks.resolve_for_write(&key.lock_path(folder)).await?;
        }

        let bytes = serde_json::to_vec(value).map_err(|source| StoreError::EncodeFailed {
            key: key.to_string(),
            source,
        })?;
        self.blobs
            .write_all(&key.data_path(folder), &bytes, CONTENT_TYPE_JSON)
            .await?;
        debug!(key = %key, len = bytes.len(), ?mode, "document persisted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::time::Duration;

    use persist_blob::{BlobOpKind, InMemoryBlobStore, CONTENT_TYPE_TEXT};
    use persist_lock::LockError;
    use persist_types::{LockToken, ManualClock};
    use proptest::prelude::*;
    use serde::Deserialize;
    use serde_json::json;
    use tokio::time::Instant;

    const NOW: i64 = 1_700_000_000_000;
    const HOUR_MS: i64 = 60 * 60 * 1000;
    const LOCK: &str = "gcr-persist/roster.lock";
    const DATA: &str = "gcr-persist/roster.json";
    const WAIT: Duration = Duration::from_secs(2);

    struct Fixture {
        blobs: Arc<InMemoryBlobStore>,
        clock: Arc<ManualClock>,
        store: KeyedObjectStore<InMemoryBlobStore>,
    }

    async fn fixture_as(owner: &str) -> Fixture {
        let blobs = Arc::new(InMemoryBlobStore::new("bucket"));
        let clock = Arc::new(ManualClock::new(NOW));
        let store = KeyedObjectStore::open_with_clock(
            Arc::clone(&blobs),
            StoreConfig::new("bucket"),
            OwnerId::new(owner).unwrap(),
            clock.clone(),
        )
        .await
        .unwrap();
        Fixture {
            blobs,
            clock,
            store,
        }
    }

    async fn fixture() -> Fixture {
        fixture_as("me").await
    }

    impl Fixture {
        fn seed_document(&self, value: &Value) {
            self.blobs
                .put(DATA, serde_json::to_vec(value).unwrap(), CONTENT_TYPE_JSON);
        }

        fn seed_lock(&self, content: &str) {
            self.blobs.put(LOCK, content, CONTENT_TYPE_TEXT);
        }

        fn lock_token(&self) -> LockToken {
            LockToken::decode(&self.blobs.get_string(LOCK).expect("lock present")).unwrap()
        }
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn open_fails_when_bucket_is_missing() {
        let blobs = Arc::new(InMemoryBlobStore::new("bucket"));
        blobs.remove_bucket();
        let err = KeyedObjectStore::open(blobs, StoreConfig::new("bucket"), OwnerId::generate())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::BucketNotFound { bucket } if bucket == "bucket"));
    }

    #[tokio::test]
    async fn open_rejects_mismatched_bucket() {
        let blobs = Arc::new(InMemoryBlobStore::new("bucket"));
        let err = KeyedObjectStore::open(blobs, StoreConfig::new("other"), OwnerId::generate())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn open_rejects_invalid_config() {
        let blobs = Arc::new(InMemoryBlobStore::new("bucket"));
        let config = StoreConfig::new("bucket").with_folder("");
        assert!(KeyedObjectStore::open(blobs, config, OwnerId::generate())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn paths_use_configured_folder() {
        let blobs = Arc::new(InMemoryBlobStore::new("bucket"));
        let store = KeyedObjectStore::open(
            blobs,
            StoreConfig::new("bucket").with_folder("jobs"),
            OwnerId::generate(),
        )
        .await
        .unwrap();
        assert_eq!(store.lock_path("k").unwrap(), "jobs/k.lock");
        assert_eq!(store.data_path("k").unwrap(), "jobs/k.json");
        assert!(store.lock_path("").is_err());
    }

    // -----------------------------------------------------------------------
    // fetch
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn fetch_without_lock_claims_it() {
        let f = fixture().await;
        f.seed_document(&json!({"players": 11}));

        let value = f.store.fetch("roster", LockMode::Respect).await.unwrap();
        assert_eq!(value, json!({"players": 11}));

        let token = f.lock_token();
        assert_eq!(token.owner, "me");
        assert_eq!(token.acquired_at_ms, NOW);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_leaves_lock_in_place() {
        let f = fixture().await;
        f.seed_document(&json!(1));
        f.store.fetch("roster", LockMode::Respect).await.unwrap();
        assert!(f.blobs.contains(LOCK));
        assert_eq!(f.blobs.count(BlobOpKind::Delete, LOCK), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_with_system_clock_stamps_current_time() {
        let blobs = Arc::new(InMemoryBlobStore::new("bucket"));
        let store = KeyedObjectStore::open(
            Arc::clone(&blobs),
            StoreConfig::new("bucket"),
            OwnerId::new("me").unwrap(),
        )
        .await
        .unwrap();
        blobs.put(DATA, "{}", CONTENT_TYPE_JSON);

        let before = SystemClock.now_millis();
        store.fetch("roster", LockMode::Respect).await.unwrap();
        let after = SystemClock.now_millis();

        let token = LockToken::decode(&blobs.get_string(LOCK).unwrap()).unwrap();
        assert!(token.acquired_at_ms >= before && token.acquired_at_ms <= after);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_reclaims_three_hour_old_foreign_lock() {
        let f = fixture().await;
        f.seed_document(&json!("v"));
        f.seed_lock(&format!("owner-A:{}", NOW - 3 * HOUR_MS));

        let start = Instant::now();
        f.store.fetch("roster", LockMode::Respect).await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(f.blobs.count(BlobOpKind::Delete, LOCK), 1);
        assert_eq!(f.lock_token().owner, "me");
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_reclaims_own_lock_regardless_of_age() {
        let f = fixture().await;
        f.seed_document(&json!([]));
        f.seed_lock(&format!("me:{}", NOW - 1));

        f.clock.advance(Duration::from_secs(5));
        let start = Instant::now();
        f.store.fetch("roster", LockMode::Respect).await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(f.lock_token().acquired_at_ms, NOW + 5000);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_twice_by_same_owner_does_not_wait() {
        let f = fixture().await;
        f.seed_document(&json!({}));
        f.store.fetch("roster", LockMode::Respect).await.unwrap();

        let start = Instant::now();
        f.store.fetch("roster", LockMode::Respect).await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_against_fresh_foreign_lock_fails_after_two_waits() {
        let f = fixture().await;
        f.seed_document(&json!({}));
        f.seed_lock(&format!("owner-A:{NOW}"));

        let start = Instant::now();
        let err = f.store.fetch("roster", LockMode::Respect).await.unwrap_err();
        assert_eq!(start.elapsed(), 2 * WAIT);
        assert!(err.is_locked());
        assert_eq!(f.blobs.count(BlobOpKind::Read, DATA), 0);
        assert_eq!(f.lock_token().owner, "owner-A");
    }

    #[tokio::test(start_paused = true)]
    async fn second_owner_is_locked_out_by_first_fetch() {
        let first = fixture_as("alpha").await;
        first.seed_document(&json!({"n": 1}));
        first.store.fetch("roster", LockMode::Respect).await.unwrap();

        let second = KeyedObjectStore::open_with_clock(
            Arc::clone(&first.blobs),
            StoreConfig::new("bucket"),
            OwnerId::new("beta").unwrap(),
            first.clock.clone(),
        )
        .await
        .unwrap();

        let err = second.fetch("roster", LockMode::Respect).await.unwrap_err();
        assert!(err.is_locked());
        let err = second
            .persist("roster", &json!({"n": 2}), LockMode::Respect)
            .await
            .unwrap_err();
        assert!(err.is_locked());

        first.clock.advance(Duration::from_millis(2 * HOUR_MS as u64 + 1));
        second.fetch("roster", LockMode::Respect).await.unwrap();
        assert_eq!(first.lock_token().owner, "beta");
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_deletes_corrupted_lock_and_proceeds() {
        let f = fixture().await;
        f.seed_document(&json!(true));
        f.seed_lock("garbage");

        assert_eq!(
            f.store.fetch("roster", LockMode::Respect).await.unwrap(),
            json!(true)
        );
        assert_eq!(f.blobs.count(BlobOpKind::Delete, LOCK), 1);
        assert_eq!(f.lock_token().owner, "me");
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_missing_document_is_not_found() {
        let f = fixture().await;
        let err = f.store.fetch("roster", LockMode::Respect).await.unwrap_err();
        assert!(err.is_not_found());
        // The lock was still claimed before the read.
        assert!(f.blobs.contains(LOCK));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_unreadable_document_is_read_failed() {
        let f = fixture().await;
        f.seed_document(&json!({}));
        f.blobs.fail_next(BlobOpKind::Read, DATA);
        let err = f.store.fetch("roster", LockMode::Ignore).await.unwrap_err();
        assert!(matches!(err, StoreError::ReadFailed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_malformed_document_is_decode_failed() {
        let f = fixture().await;
        f.blobs.put(DATA, "{not json", CONTENT_TYPE_JSON);
        let err = f.store.fetch("roster", LockMode::Respect).await.unwrap_err();
        assert!(matches!(err, StoreError::DecodeFailed { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_lock_check_failure_is_surfaced() {
        let f = fixture().await;
        f.seed_document(&json!({}));
        f.blobs.fail_next(BlobOpKind::Exists, LOCK);
        let err = f.store.fetch("roster", LockMode::Respect).await.unwrap_err();
        assert!(matches!(err, StoreError::Lock(LockError::CheckFailed { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_lock_write_failure_is_propagated() {
        let f = fixture().await;
        f.seed_document(&json!({}));
        f.blobs.fail_next(BlobOpKind::Write, LOCK);
        let err = f.store.fetch("roster", LockMode::Respect).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(BlobError::Io { .. })));
        assert_eq!(f.blobs.count(BlobOpKind::Read, DATA), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_as_decodes_typed_documents() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Roster {
            players: Vec<String>,
        }

        let f = fixture().await;
        f.seed_document(&json!({"players": ["ada", "lin"]}));
        let roster: Roster = f.store.fetch_as("roster", LockMode::Respect).await.unwrap();
        assert_eq!(roster.players, vec!["ada", "lin"]);
    }

    #[tokio::test]
    async fn invalid_key_is_rejected_before_io() {
        let f = fixture().await;
        let err = f.store.fetch("../etc", LockMode::Respect).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
        assert!(f.blobs.ops().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_waits_on_foreign_lock_with_unparsable_timestamp() {
        let f = fixture().await;
        f.seed_document(&json!({}));
        f.seed_lock("owner-A:soon");

        let start = Instant::now();
        let err = f.store.fetch("roster", LockMode::Respect).await.unwrap_err();
        assert_eq!(start.elapsed(), 2 * WAIT);
        assert!(err.is_locked());
        assert_eq!(f.blobs.count(BlobOpKind::Delete, LOCK), 0);
        assert_eq!(f.blobs.get_string(LOCK).unwrap(), "owner-A:soon");
    }

    #[tokio::test(start_paused = true)]
    async fn keys_resembling_suffixes_round_trip() {
        let f = fixture().await;
        for (i, key) in ["report.json", "state.lock", "v1..v2"].into_iter().enumerate() {
            f.store.persist(key, &json!(i), LockMode::Respect).await.unwrap();
            assert_eq!(f.store.fetch(key, LockMode::Respect).await.unwrap(), json!(i));
        }
        assert!(f.blobs.contains("gcr-persist/report.json.json"));
        assert!(f.blobs.contains("gcr-persist/state.lock.lock"));
        assert!(f.blobs.contains("gcr-persist/v1..v2.json"));
    }

    // -----------------------------------------------------------------------
    // persist
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn persist_without_lock_writes_immediately() {
        let f = fixture().await;
        let start = Instant::now();
        f.store
            .persist("roster", &json!({"n": 1}), LockMode::Respect)
            .await
            .unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(f.blobs.get_string(DATA).unwrap(), r#"{"n":1}"#);
        assert_eq!(f.blobs.content_type(DATA).as_deref(), Some(CONTENT_TYPE_JSON));
        assert!(!f.blobs.contains(LOCK));
    }

    #[tokio::test(start_paused = true)]
    async fn persist_under_own_lock_leaves_lock_untouched() {
        let f = fixture().await;
        f.seed_document(&json!({"n": 1}));
        f.store.fetch("roster", LockMode::Respect).await.unwrap();
        let before = f.blobs.get_string(LOCK).unwrap();
        f.blobs.clear_ops();

        let start = Instant::now();
        f.store
            .persist("roster", &json!({"n": 2}), LockMode::Respect)
            .await
            .unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(f.blobs.get_string(LOCK).unwrap(), before);
        assert_eq!(f.blobs.count(BlobOpKind::Write, LOCK), 0);
        assert_eq!(f.blobs.count(BlobOpKind::Delete, LOCK), 0);
        assert_eq!(f.blobs.get_string(DATA).unwrap(), r#"{"n":2}"#);
    }

    #[tokio::test(start_paused = true)]
    async fn persist_against_foreign_lock_fails_after_two_waits() {
        let f = fixture().await;
        f.seed_document(&json!("old"));
        f.seed_lock(&format!("owner-A:{NOW}"));

        let start = Instant::now();
        let err = f
            .store
            .persist("roster", &json!("new"), LockMode::Respect)
            .await
            .unwrap_err();
        assert_eq!(start.elapsed(), 2 * WAIT);
        assert!(err.is_locked());
        assert_eq!(f.blobs.get_string(DATA).unwrap(), r#""old""#);
        assert_eq!(f.blobs.count(BlobOpKind::Write, LOCK), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn persist_against_corrupted_lock_fails() {
        let f = fixture().await;
        f.seed_lock("garbage");
        let err = f
            .store
            .persist("roster", &json!(1), LockMode::Respect)
            .await
            .unwrap_err();
        assert!(err.is_corrupted());
        assert!(!f.blobs.contains(DATA));
        assert_eq!(f.blobs.get_string(LOCK).unwrap(), "garbage");
    }

    #[tokio::test(start_paused = true)]
    async fn persist_does_not_treat_well_formed_lock_as_corrupted() {
        let f = fixture().await;
        f.seed_lock(&format!("me:{NOW}"));
        f.store
            .persist("roster", &json!(1), LockMode::Respect)
            .await
            .unwrap();
        assert_eq!(f.blobs.get_string(DATA).unwrap(), "1");
    }

    #[tokio::test(start_paused = true)]
    async fn persist_write_failure_is_io() {
        let f = fixture().await;
        f.blobs.fail_next(BlobOpKind::Write, DATA);
        let err = f
            .store
            .persist("roster", &json!(1), LockMode::Respect)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Io(BlobError::Io { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn persist_unencodable_value_is_encode_failed() {
        let f = fixture().await;
        let mut bad = BTreeMap::new();
        bad.insert(vec![1u8], "non-string key");
        let err = f
            .store
            .persist("roster", &bad, LockMode::Ignore)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::EncodeFailed { .. }));
        assert!(!f.blobs.contains(DATA));
    }

    // -----------------------------------------------------------------------
    // LockMode::Ignore
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn ignore_mode_performs_no_lock_io() {
        let f = fixture().await;
        f.seed_lock(&format!("owner-A:{NOW}"));

        let start = Instant::now();
        f.store
            .persist("roster", &json!({"k": "v"}), LockMode::Ignore)
            .await
            .unwrap();
        let value = f.store.fetch("roster", LockMode::Ignore).await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(value, json!({"k": "v"}));
        assert!(f.blobs.ops_for(LOCK).is_empty());
        assert_eq!(f.blobs.get_string(LOCK).unwrap(), format!("owner-A:{NOW}"));
    }

    // -----------------------------------------------------------------------
    // Directory-backed bucket
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn open_dir_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig::new("state");

        let missing = KeyedObjectStore::open_dir(dir.path(), config.clone(), OwnerId::generate())
            .await
            .err()
            .unwrap();
        assert!(matches!(missing, StoreError::BucketNotFound { .. }));

        std::fs::create_dir(dir.path().join("state")).unwrap();
        let store = KeyedObjectStore::open_dir(dir.path(), config, OwnerId::generate())
            .await
            .unwrap();
        store
            .persist("team/blue", &json!({"score": 3}), LockMode::Respect)
            .await
            .unwrap();
        let value = store.fetch("team/blue", LockMode::Respect).await.unwrap();
        assert_eq!(value, json!({"score": 3}));

        let lock = std::fs::read_to_string(dir.path().join("state/gcr-persist/team/blue.lock"))
            .unwrap();
        assert!(lock.starts_with(&format!("{}:", store.owner())));
    }

    // -----------------------------------------------------------------------
    // Round trip property
    // -----------------------------------------------------------------------

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-zA-Z0-9 _:-]{0,16}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn persist_then_fetch_ignoring_lock_returns_equal_value(value in arb_json()) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            let fetched = rt.block_on(async {
                let f = fixture().await;
                f.store.persist("roster", &value, LockMode::Respect).await.unwrap();
                f.store.fetch("roster", LockMode::Ignore).await.unwrap()
            });
            prop_assert_eq!(fetched, value);
        }
    }
}
