use std::sync::Arc;

use tokio::sync::RwLock;

/// Shared set of game ids currently in progress.
///
/// Written by the active game tracker, read by the refresh loop and the HTTP
/// layer. Writes replace the whole set and reads copy the whole set, so a
/// reader never sees a half-updated list.
#[derive(Debug, Clone, Default)]
pub struct LiveGameSet {
    inner: Arc<RwLock<Vec<String>>>,
}

impl LiveGameSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current ids, in tracker order
    pub async fn snapshot(&self) -> Vec<String> {
        self.inner.read().await.clone()
    }

    /// Replace the whole set; duplicates are dropped keeping first occurrence
    pub async fn replace(&self, ids: Vec<String>) {
        let mut deduped: Vec<String> = Vec::with_capacity(ids.len());
        for id in ids {
            if !deduped.contains(&id) {
                deduped.push(id);
            }
        }

        let mut current = self.inner.write().await;
        *current = deduped;
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
