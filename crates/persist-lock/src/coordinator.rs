use std::sync::Arc;
use std::time::Duration;

use persist_blob::{BlobError, BlobStore, CONTENT_TYPE_TEXT};
use persist_types::{Clock, LockToken, OwnerId, SystemClock};
use tracing::{debug, info, warn};

use crate::decision::{decide_read, decide_retry, decide_write, Decision, ReclaimReason};
use crate::error::{LockError, LockResult};
use crate::retry::RetryPolicy;

/// Default age after which a foreign lock is stale (2 hours).
pub const DEFAULT_MAX_LOCK_TIME: Duration = Duration::from_secs(2 * 60 * 60);

/// Tuning for a [`LockCoordinator`].
#[derive(Clone, Debug)]
pub struct CoordinatorConfig {
    /// Foreign locks older than this are reclaimed by reads.
    pub max_lock_time: Duration,
    /// Existence-check schedule under contention.
    pub retry: RetryPolicy,
    /// Re-read a still-present foreign lock on every retry and reclaim it if
    /// it has gone stale. Off by default: staleness is judged once, at the
    /// first sighting.
    pub recheck_staleness: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_lock_time: DEFAULT_MAX_LOCK_TIME,
            retry: RetryPolicy::default(),
            recheck_staleness: false,
        }
    }
}

/// What lock resolution did before letting the caller through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Existence checks made, including the first.
    pub checks: u32,
    /// Set when a lock blob was deleted to make way.
    pub reclaimed: Option<ReclaimReason>,
}

impl Resolution {
    fn clear(checks: u32) -> Self {
        Self {
            checks,
            reclaimed: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Intent {
    Read,
    Write,
}

/// Resolves advisory locks held as blobs in a [`BlobStore`].
///
/// The coordinator never holds in-process state about locks; everything it
/// knows comes from the blob on each call.
pub struct LockCoordinator<S: BlobStore + ?Sized> {
    store: Arc<S>,
    owner: OwnerId,
    clock: Arc<dyn Clock>,
    config: CoordinatorConfig,
}

impl<S: BlobStore + ?Sized> Clone for LockCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            owner: self.owner.clone(),
            clock: Arc::clone(&self.clock),
            config: self.config.clone(),
        }
    }
}

impl<S: BlobStore + ?Sized> LockCoordinator<S> {
    pub fn new(store: Arc<S>, owner: OwnerId, config: CoordinatorConfig) -> Self {
        Self {
            store,
            owner,
            clock: Arc::new(SystemClock),
            config,
        }
    }

    /// Replace the wall clock used for timestamps and staleness.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Resolve the lock ahead of a read, then claim it.
    ///
    /// On success the lock blob holds a fresh token for this owner. The lock
    /// is not released afterwards; it lapses after `max_lock_time` or is
    /// reclaimed by this owner's next read.
    pub async fn acquire(&self, lock_path: &str) -> LockResult<LockToken> {
        self.resolve_for_read(lock_path).await?;
        let token = LockToken::new(&self.owner, self.clock.now_millis());
        self.store
            .write_all(lock_path, token.encode().as_bytes(), CONTENT_TYPE_TEXT)
            .await?;
        debug!(path = lock_path, token = %token, "lock acquired");
        Ok(token)
    }

    /// Decide whether a read may go ahead, deleting the lock blob when it is
    /// corrupted, stale, or left behind by this owner.
    pub async fn resolve_for_read(&self, lock_path: &str) -> LockResult<Resolution> {
        let Some(content) = self.observe(lock_path).await? else {
            return Ok(Resolution::clear(1));
        };

        let decision = decide_read(
            Some(&content),
            &self.owner,
            self.clock.now_millis(),
            self.config.max_lock_time,
        );
        match decision {
            Decision::Proceed => Ok(Resolution::clear(1)),
            Decision::Reclaim(reason) => {
                self.reclaim(lock_path, reason, &content).await?;
                Ok(Resolution {
                    checks: 1,
                    reclaimed: Some(reason),
                })
            }
            Decision::WaitAndRetry => {
                self.wait_for_release(lock_path, &content, Intent::Read)
                    .await
            }
            Decision::Fail(_) => Err(LockError::Corrupted {
                path: lock_path.to_string(),
                content,
            }),
        }
    }

    /// Decide whether a write may go ahead. Never modifies the lock blob.
    pub async fn resolve_for_write(&self, lock_path: &str) -> LockResult<Resolution> {
        let Some(content) = self.observe(lock_path).await? else {
            return Ok(Resolution::clear(1));
        };

        match decide_write(Some(&content), &self.owner) {
            Decision::Proceed | Decision::Reclaim(_) => Ok(Resolution::clear(1)),
            Decision::WaitAndRetry => {
                self.wait_for_release(lock_path, &content, Intent::Write)
                    .await
            }
            Decision::Fail(_) => {
                warn!(path = lock_path, content = %content, "lock is corrupted; refusing to write");
                Err(LockError::Corrupted {
                    path: lock_path.to_string(),
                    content,
                })
            }
        }
    }

    /// First sighting: `None` if the blob is absent, otherwise its content.
    async fn observe(&self, lock_path: &str) -> LockResult<Option<String>> {
        if !self.check(lock_path).await? {
            return Ok(None);
        }
        self.read_content(lock_path).await
    }

    async fn check(&self, lock_path: &str) -> LockResult<bool> {
        self.store
            .exists(lock_path)
            .await
            .map_err(|source| LockError::CheckFailed {
                path: lock_path.to_string(),
                source,
            })
    }

    /// Read lock content; a blob that vanished since the existence check is `None`.
    async fn read_content(&self, lock_path: &str) -> LockResult<Option<String>> {
        match self.store.read_all(lock_path).await {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.is_not_found() => {
                debug!(path = lock_path, "lock vanished before it could be read");
                Ok(None)
            }
            Err(source) => Err(LockError::ReadFailed {
                path: lock_path.to_string(),
                source,
            }),
        }
    }

    async fn reclaim(
        &self,
        lock_path: &str,
        reason: ReclaimReason,
        content: &str,
    ) -> LockResult<()> {
        match reason {
            ReclaimReason::Corrupted => {
                warn!(path = lock_path, content, "lock is corrupted; deleting")
            }
            ReclaimReason::Stale => info!(path = lock_path, content, "lock is stale; deleting"),
            ReclaimReason::SelfOwned => {
                debug!(path = lock_path, "lock was left by this owner; deleting")
            }
        }
        match self.store.delete(lock_path).await {
            Ok(()) => Ok(()),
            Err(BlobError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Wait out a foreign lock, re-checking existence on the retry schedule.
    async fn wait_for_release(
        &self,
        lock_path: &str,
        first_seen: &str,
        intent: Intent,
    ) -> LockResult<Resolution> {
        let holder = LockToken::split_parts(first_seen)
            .map(|(owner, _)| owner.to_string())
            .unwrap_or_else(|_| first_seen.to_string());
        let policy = &self.config.retry;

        let mut checks = 1;
        let mut decision = decide_retry(true, checks, policy);
        loop {
            match decision {
                Decision::Proceed => {
                    debug!(path = lock_path, checks, "lock released");
                    return Ok(Resolution::clear(checks));
                }
                Decision::WaitAndRetry => {
                    let delay = policy.delay(checks - 1);
                    debug!(
                        path = lock_path,
                        holder = %holder,
                        checks,
                        delay_ms = delay.as_millis() as u64,
                        "lock held; waiting"
                    );
                    tokio::time::sleep(delay).await;

                    let present = self.check(lock_path).await?;
                    checks += 1;
                    if present && intent == Intent::Read && self.config.recheck_staleness {
                        if let Some(resolution) = self.recheck(lock_path, checks).await? {
                            return Ok(resolution);
                        }
                    }
                    decision = decide_retry(present, checks, policy);
                }
                Decision::Fail(_) | Decision::Reclaim(_) => {
                    warn!(path = lock_path, holder = %holder, checks, "lock still held; giving up");
                    return Err(LockError::Locked {
                        path: lock_path.to_string(),
                        holder,
                        attempts: checks,
                    });
                }
            }
        }
    }

    /// Re-judge a lock that is still present during the wait loop.
    ///
    /// Returns a resolution when the caller may proceed: the lock vanished in
    /// between, or it has gone stale and was reclaimed.
    async fn recheck(&self, lock_path: &str, checks: u32) -> LockResult<Option<Resolution>> {
        let Some(content) = self.read_content(lock_path).await? else {
            return Ok(Some(Resolution::clear(checks)));
        };
        let decision = decide_read(
            Some(&content),
            &self.owner,
            self.clock.now_millis(),
            self.config.max_lock_time,
        );
        match decision {
            Decision::Reclaim(reason) => {
                self.reclaim(lock_path, reason, &content).await?;
                Ok(Some(Resolution {
                    checks,
                    reclaimed: Some(reason),
                }))
            }
            Decision::Proceed => Ok(Some(Resolution::clear(checks))),
            Decision::WaitAndRetry | Decision::Fail(_) => Ok(None),
        }
    }
}
