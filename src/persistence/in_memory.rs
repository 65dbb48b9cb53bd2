//! Volatile, process-local implementation of [`PersistenceProvider`].

use crate::persistence::{PersistenceError, PersistenceProvider};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Events of one persistence id.
///
/// `last_index` is the high-water mark, so indexes stay unique even after
/// compaction empties `entries`.
struct EventLog<E> {
    entries: BTreeMap<u64, E>,
    last_index: u64,
}

impl<E> Default for EventLog<E> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            last_index: 0,
        }
    }
}

/// In-memory event log and snapshot store.
///
/// Snapshots are deep-copied through a `serde_json` round trip on write, so the
/// stored value shares nothing with the live aggregate. Nothing survives a
/// process restart.
pub struct InMemoryProvider<E, S> {
    events: Mutex<HashMap<String, EventLog<E>>>,
    snapshots: Mutex<HashMap<String, BTreeMap<u64, S>>>,
}

impl<E, S> Default for InMemoryProvider<E, S> {
    fn default() -> Self {
        Self {
            events: Mutex::new(HashMap::new()),
            snapshots: Mutex::new(HashMap::new()),
        }
    }
}

impl<E, S> InMemoryProvider<E, S>
where
    E: Clone,
    S: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn events(&self) -> Result<MutexGuard<'_, HashMap<String, EventLog<E>>>, PersistenceError> {
        self.events.lock().map_err(|_| PersistenceError::Poisoned)
    }

    fn snapshots(&self) -> Result<MutexGuard<'_, HashMap<String, BTreeMap<u64, S>>>, PersistenceError> {
        self.snapshots.lock().map_err(|_| PersistenceError::Poisoned)
    }

    /// All stored events of `persistence_id` in index order.
    pub fn stored_events(&self, persistence_id: &str) -> Result<Vec<(u64, E)>, PersistenceError> {
        Ok(self
            .events()?
            .get(persistence_id)
            .map(|log| log.entries.iter().map(|(i, e)| (*i, e.clone())).collect())
            .unwrap_or_default())
    }

    /// Indexes of all stored snapshots of `persistence_id`, ascending.
    pub fn snapshot_indexes(&self, persistence_id: &str) -> Result<Vec<u64>, PersistenceError> {
        Ok(self
            .snapshots()?
            .get(persistence_id)
            .map(|snaps| snaps.keys().copied().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl<E, S> PersistenceProvider<E, S> for InMemoryProvider<E, S>
where
    E: Clone + Send + 'static,
    S: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn read_latest_snapshot(
        &self,
        persistence_id: &str,
    ) -> Result<Option<(S, u64)>, PersistenceError> {
        let snapshots = self.snapshots()?;
        Ok(snapshots
            .get(persistence_id)
            .and_then(|snaps| snaps.iter().next_back())
            .map(|(index, snapshot)| (snapshot.clone(), *index)))
    }

    async fn read_events(
        &self,
        persistence_id: &str,
        from_index: u64,
        to_index: u64,
        visitor: &mut (dyn FnMut(u64, E) + Send),
    ) -> Result<u64, PersistenceError> {
        if from_index > to_index {
            return Ok(0);
        }
        // Copy the range out first so the visitor never runs under the lock.
        let selected: Vec<(u64, E)> = {
            let events = self.events()?;
            match events.get(persistence_id) {
                Some(log) => log
                    .entries
                    .range(from_index..=to_index)
                    .map(|(i, e)| (*i, e.clone()))
                    .collect(),
                None => Vec::new(),
            }
        };
        let visited = selected.len() as u64;
        for (index, event) in selected {
            visitor(index, event);
        }
        Ok(visited)
    }

    async fn append_event(&self, persistence_id: &str, event: E) -> Result<u64, PersistenceError> {
        let mut events = self.events()?;
        let log = events.entry(persistence_id.to_string()).or_default();
        let index = log.last_index + 1;
        log.entries.insert(index, event);
        log.last_index = index;
        debug!(persistence_id, index, "Event appended");
        Ok(index)
    }

    async fn write_snapshot(
        &self,
        persistence_id: &str,
        index: u64,
        snapshot: &S,
    ) -> Result<(), PersistenceError> {
        let copy: S = serde_json::from_value(serde_json::to_value(snapshot)?)?;
        self.snapshots()?
            .entry(persistence_id.to_string())
            .or_default()
            .insert(index, copy);
        debug!(persistence_id, index, "Snapshot written");
        Ok(())
    }

    async fn delete_events(
        &self,
        persistence_id: &str,
        through_index: u64,
    ) -> Result<(), PersistenceError> {
        if let Some(log) = self.events()?.get_mut(persistence_id) {
            log.entries.retain(|index, _| *index > through_index);
        }
        Ok(())
    }

    async fn delete_snapshots(
        &self,
        persistence_id: &str,
        through_index: u64,
    ) -> Result<(), PersistenceError> {
        if let Some(snaps) = self.snapshots()?.get_mut(persistence_id) {
            snaps.retain(|index, _| *index > through_index);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Tally {
        names: Vec<String>,
    }

    type Provider = InMemoryProvider<String, Tally>;

    async fn collect(provider: &Provider, id: &str, from: u64, to: u64) -> Vec<(u64, String)> {
        let mut seen = Vec::new();
        provider
            .read_events(id, from, to, &mut |index, event| seen.push((index, event)))
            .await
            .unwrap();
        seen
    }

    #[tokio::test]
    async fn test_append_assigns_increasing_indexes_from_one() {
        let provider = Provider::new();
        assert_eq!(provider.append_event("a", "first".into()).await.unwrap(), 1);
        assert_eq!(provider.append_event("a", "second".into()).await.unwrap(), 2);
        // Other ids have their own log.
        assert_eq!(provider.append_event("b", "other".into()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_read_events_visits_range_in_order() {
        let provider = Provider::new();
        for name in ["a", "b", "c", "d"] {
            provider.append_event("log", name.into()).await.unwrap();
        }

        let seen = collect(&provider, "log", 2, 3).await;
        assert_eq!(seen, vec![(2, "b".to_string()), (3, "c".to_string())]);

        let all = collect(&provider, "log", 1, u64::MAX).await;
        assert_eq!(all.len(), 4);

        assert!(collect(&provider, "missing", 1, u64::MAX).await.is_empty());
    }

    #[tokio::test]
    async fn test_latest_snapshot_is_highest_index() {
        let provider = Provider::new();
        assert!(provider.read_latest_snapshot("s").await.unwrap().is_none());

        let first = Tally { names: vec!["a".into()] };
        let second = Tally { names: vec!["a".into(), "b".into()] };
        provider.write_snapshot("s", 1, &first).await.unwrap();
        provider.write_snapshot("s", 2, &second).await.unwrap();

        let (snapshot, index) = provider.read_latest_snapshot("s").await.unwrap().unwrap();
        assert_eq!(index, 2);
        assert_eq!(snapshot, second);
    }

    #[tokio::test]
    async fn test_snapshot_is_independent_of_live_value() {
        let provider = Provider::new();
        let mut live = Tally { names: vec!["alice".into()] };
        provider.write_snapshot("s", 1, &live).await.unwrap();

        live.names.push("bob".into());
        live.names[0] = "mallory".into();

        let (stored, _) = provider.read_latest_snapshot("s").await.unwrap().unwrap();
        assert_eq!(stored.names, vec!["alice".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_events_through_index() {
        let provider = Provider::new();
        for name in ["a", "b", "c"] {
            provider.append_event("log", name.into()).await.unwrap();
        }
        provider.delete_events("log", 2).await.unwrap();

        let remaining = provider.stored_events("log").unwrap();
        assert_eq!(remaining, vec![(3, "c".to_string())]);
    }

    #[tokio::test]
    async fn test_indexes_are_not_reused_after_compaction() {
        let provider = Provider::new();
        provider.append_event("log", "a".into()).await.unwrap();
        provider.append_event("log", "b".into()).await.unwrap();
        provider.delete_events("log", 2).await.unwrap();

        assert_eq!(provider.append_event("log", "c".into()).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_delete_snapshots_through_index() {
        let provider = Provider::new();
        for index in 1..=3 {
            let tally = Tally { names: vec![index.to_string()] };
            provider.write_snapshot("s", index, &tally).await.unwrap();
        }
        provider.delete_snapshots("s", 2).await.unwrap();
        assert_eq!(provider.snapshot_indexes("s").unwrap(), vec![3]);

        // Deleting on an unknown id is a no-op.
        provider.delete_snapshots("unknown", 10).await.unwrap();
        provider.delete_events("unknown", 10).await.unwrap();
    }
}
