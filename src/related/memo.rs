//! Request-scoped memoization of related-skills computations
//!
//! A server-rendered page may ask for the same related list several times
//! (header widget, sidebar, structured-data block). One [`RenderMemo`] is
//! created per request and dropped with it; identical calls within that
//! lifetime share a single underlying computation. This is pure
//! deduplication, not a cache: there is no TTL and nothing survives the
//! request.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::Result;
use crate::related::engine::{RelatedSkillsEngine, RelatedSkillsResult};

type MemoKey = (String, i64);

/// Per-request memo over [`RelatedSkillsEngine::compute`]
#[derive(Default)]
pub struct RenderMemo {
    // The async mutex is held across the computation, so a duplicate call
    // arriving mid-compute waits for the first result instead of recomputing.
    entries: Mutex<HashMap<MemoKey, Option<Arc<RelatedSkillsResult>>>>,
}

impl RenderMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute (or reuse) the related skills for `skill_id` within this request.
    ///
    /// Errors propagate without being memoized; a later identical call
    /// re-attempts the computation.
    pub async fn related(
        &self,
        engine: &RelatedSkillsEngine,
        skill_id: &str,
        limit: i64,
    ) -> Result<Option<Arc<RelatedSkillsResult>>> {
        let key = (skill_id.to_string(), limit);
        let mut entries = self.entries.lock().await;
        if let Some(memoized) = entries.get(&key) {
            return Ok(memoized.clone());
        }

        let computed = engine.compute(skill_id, limit).await?.map(Arc::new);
        entries.insert(key, computed.clone());
        Ok(computed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::related::test_support::{skill, StaticSource};

    fn fixture() -> (Arc<StaticSource>, RelatedSkillsEngine) {
        let source = Arc::new(StaticSource::new(vec![
            skill("src", "fast-deploy", "acme", &["python"], 10),
            skill("c1", "fast-tool", "acme", &["python"], 100),
        ]));
        let engine = RelatedSkillsEngine::new(source.clone());
        (source, engine)
    }

    #[tokio::test]
    async fn repeated_calls_compute_once() {
        let (source, engine) = fixture();
        let memo = RenderMemo::new();

        let first = memo.related(&engine, "src", 6).await.unwrap().unwrap();
        let second = memo.related(&engine, "src", 6).await.unwrap().unwrap();

        assert_eq!(source.pool_fetches(), 1);
        assert_eq!(first.related.len(), second.related.len());
    }

    #[tokio::test]
    async fn distinct_arguments_compute_separately() {
        let (source, engine) = fixture();
        let memo = RenderMemo::new();

        memo.related(&engine, "src", 6).await.unwrap();
        memo.related(&engine, "src", 3).await.unwrap();

        assert_eq!(source.pool_fetches(), 2);
    }

    #[tokio::test]
    async fn concurrent_duplicates_collapse() {
        let (source, engine) = fixture();
        let memo = RenderMemo::new();

        let (a, b) = tokio::join!(
            memo.related(&engine, "src", 6),
            memo.related(&engine, "src", 6),
        );
        a.unwrap();
        b.unwrap();

        assert_eq!(source.pool_fetches(), 1);
    }

    #[tokio::test]
    async fn not_found_is_memoized_within_request() {
        let (source, engine) = fixture();
        let memo = RenderMemo::new();

        assert!(memo.related(&engine, "missing", 6).await.unwrap().is_none());
        assert!(memo.related(&engine, "missing", 6).await.unwrap().is_none());
        assert_eq!(source.pool_fetches(), 1);
    }

    #[tokio::test]
    async fn errors_are_not_memoized() {
        let source = Arc::new(StaticSource::new(vec![
            skill("src", "fast-deploy", "acme", &["python"], 10),
        ]));
        source.fail_next(1);
        let engine = RelatedSkillsEngine::new(source.clone());
        let memo = RenderMemo::new();

        assert!(memo.related(&engine, "src", 6).await.is_err());
        // the failure was not recorded; this call computes for real
        assert!(memo.related(&engine, "src", 6).await.unwrap().is_some());
    }
}
