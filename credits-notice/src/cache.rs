//! Memoizing cache for expensive (async) lookups
//!
//! Results are stored in nested partitions addressed by key components: the
//! last component is the lookup key, all preceding components name
//! partitions (e.g. entity type, then name). Partitions are created lazily.
//!
//! A cache may be backed by a [`KeyValueStore`]; `load`/`store` move the whole
//! partition tree as one JSON blob stored under the cache name.
//!
//! Concurrent lookups of the same missing key may each run the computation;
//! the computations wrapped here are idempotent (fetch by immutable id) or cheap.

use crate::client::EntityProvider;
use crate::entity::Entity;
use crate::{ResolveError, Result};
use credits_common::storage::KeyValueStore;
use futures::future::{self, BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Storage key of the persisted name → MBID mapping
pub const NAME_CACHE_NAME: &str = "nameToMBIDCache";

const DEFAULT_CACHE_NAME: &str = "defaultCache";

/// Children of one partition
pub type Partition<R> = BTreeMap<String, CacheNode<R>>;

/// Node of the partition tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheNode<R> {
    /// Cached result
    Value(R),
    /// Nested partition
    Partition(Partition<R>),
}

type ComputeFn<P, R> = Box<dyn Fn(P) -> BoxFuture<'static, Result<Option<R>>> + Send + Sync>;
type KeyMapper<P> = Box<dyn Fn(&P) -> Vec<String> + Send + Sync>;

/// Async memoizing cache
///
/// `P` are the parameters of the expensive computation, `R` its result.
pub struct MemoCache<P, R> {
    name: String,
    compute: ComputeFn<P, R>,
    key_mapper: KeyMapper<P>,
    storage: Option<Arc<dyn KeyValueStore>>,
    data: Mutex<Partition<R>>,
}

impl<P, R> MemoCache<P, R>
where
    P: Send + 'static,
    R: Clone + Send + Serialize + DeserializeOwned + 'static,
{
    /// Cache over `compute`, keyed by the components `key_mapper` derives
    ///
    /// A computation returning `Ok(None)` leaves the key absent.
    pub fn new<F, Fut, K>(compute: F, key_mapper: K) -> Self
    where
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<R>>> + Send + 'static,
        K: Fn(&P) -> Vec<String> + Send + Sync + 'static,
    {
        Self {
            name: DEFAULT_CACHE_NAME.to_string(),
            compute: Box::new(move |params| compute(params).boxed()),
            key_mapper: Box::new(key_mapper),
            storage: None,
            data: Mutex::new(Partition::new()),
        }
    }

    /// Cache without a computation: only `set` entries are ever returned
    pub fn memo_only<K>(key_mapper: K) -> Self
    where
        K: Fn(&P) -> Vec<String> + Send + Sync + 'static,
    {
        Self::new(|_| future::ready(Ok(None)), key_mapper)
    }

    /// Persist under `name` in `storage`
    pub fn with_storage(mut self, name: impl Into<String>, storage: Arc<dyn KeyValueStore>) -> Self {
        self.name = name.into();
        self.storage = Some(storage);
        self
    }

    /// Start from existing entries instead of an empty tree
    pub fn with_data(self, data: Partition<R>) -> Self {
        *self.lock() = data;
        self
    }

    /// Looks up the result for `params`, computing and caching it on a miss
    ///
    /// An empty last key component is a miss that neither computes nor
    /// touches the tree. Computation errors propagate and are not cached.
    pub async fn get(&self, params: P) -> Result<Option<R>> {
        let mut keys = (self.key_mapper)(&params);
        let last_key = match keys.pop() {
            Some(key) if !key.is_empty() => key,
            _ => return Ok(None),
        };

        {
            let mut data = self.lock();
            if let Some(CacheNode::Value(value)) = partition_mut(&mut data, &keys).get(&last_key) {
                debug!(cache = %self.name, key = %last_key, "Cache hit");
                return Ok(Some(value.clone()));
            }
        }

        debug!(cache = %self.name, key = %last_key, "Cache miss, computing");
        let entry = (self.compute)(params).await?;

        if let Some(value) = &entry {
            let mut data = self.lock();
            partition_mut(&mut data, &keys).insert(last_key, CacheNode::Value(value.clone()));
        }
        Ok(entry)
    }

    /// Overwrites the entry at `keys`, creating partitions as needed
    pub fn set(&self, mut keys: Vec<String>, value: R) {
        let last_key = match keys.pop() {
            Some(key) if !key.is_empty() => key,
            _ => {
                warn!(cache = %self.name, "Ignoring cache write without a key");
                return;
            }
        };
        let mut data = self.lock();
        partition_mut(&mut data, &keys).insert(last_key, CacheNode::Value(value));
    }

    /// Number of cached values across all partitions
    pub fn len(&self) -> usize {
        count_values(&self.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Partition tree as JSON
    pub fn to_json(&self) -> Result<String> {
        let data = self.lock();
        serde_json::to_string(&*data).map_err(|e| credits_common::Error::from(e).into())
    }

    /// Replaces the in-memory tree with the persisted one (if any)
    pub fn load(&self) -> Result<()> {
        let Some(storage) = &self.storage else {
            return Ok(());
        };
        if let Some(stored) = storage.get_item(&self.name)? {
            if stored.trim().is_empty() {
                return Ok(());
            }
            let data: Partition<R> =
                serde_json::from_str(&stored).map_err(credits_common::Error::from)?;
            *self.lock() = data;
            debug!(cache = %self.name, entries = self.len(), "Cache loaded");
        }
        Ok(())
    }

    /// Persists the whole tree
    pub fn store(&self) -> Result<()> {
        let Some(storage) = &self.storage else {
            return Ok(());
        };
        let json = self.to_json()?;
        storage.set_item(&self.name, &json)?;
        debug!(cache = %self.name, "Cache stored");
        Ok(())
    }

    /// Drops all entries and persists the empty tree
    pub fn clear(&self) -> Result<()> {
        self.lock().clear();
        self.store()
    }

    fn lock(&self) -> MutexGuard<'_, Partition<R>> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Walks down to the partition addressed by `keys`, creating missing ones
///
/// A value sitting where a partition is expected is replaced.
fn partition_mut<'a, R>(root: &'a mut Partition<R>, keys: &[String]) -> &'a mut Partition<R> {
    let mut partition = root;
    for key in keys {
        let node = partition
            .entry(key.clone())
            .or_insert_with(|| CacheNode::Partition(Partition::new()));
        if matches!(node, CacheNode::Value(_)) {
            *node = CacheNode::Partition(Partition::new());
        }
        partition = match node {
            CacheNode::Partition(children) => children,
            CacheNode::Value(_) => unreachable!("value nodes were replaced above"),
        };
    }
    partition
}

fn count_values<R>(partition: &Partition<R>) -> usize {
    partition
        .values()
        .map(|node| match node {
            CacheNode::Value(_) => 1,
            CacheNode::Partition(children) => count_values(children),
        })
        .sum()
}

/// Session cache of entities fetched by MBID
pub fn entity_cache(provider: Arc<dyn EntityProvider>) -> MemoCache<String, Entity> {
    MemoCache::new(
        move |id: String| {
            let provider = Arc::clone(&provider);
            async move { Ok::<_, ResolveError>(Some(provider.fetch_entity(&id).await?)) }
        },
        |id: &String| vec![id.clone()],
    )
}

/// Learned mapping `(entity type, name) → MBID`, optionally persisted
pub fn name_cache(storage: Option<Arc<dyn KeyValueStore>>) -> MemoCache<(String, String), String> {
    let cache = MemoCache::memo_only(|(entity_type, name): &(String, String)| {
        vec![entity_type.clone(), name.clone()]
    });
    match storage {
        Some(storage) => cache.with_storage(NAME_CACHE_NAME, storage),
        None => cache,
    }
}
