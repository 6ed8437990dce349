//! Related-skills computation
//!
//! Given a source skill, scores a bounded pool of approved candidates and
//! returns the top matches. The data-access side is abstracted behind
//! [`SkillSource`] so the engine can run against the Postgres store in
//! production and an in-memory stub in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::database::Skill;
use crate::error::Result;
use crate::related::scorer::Scorer;

/// Candidate pool size cap. Scoring is O(candidates); only the most popular
/// approved skills are considered, trading completeness for latency.
pub const CANDIDATE_POOL_SIZE: i64 = 100;

/// Inclusive bounds on the requested result count
pub const MIN_LIMIT: i64 = 1;
pub const MAX_LIMIT: i64 = 20;

/// Default result count when the caller does not ask for one
pub const DEFAULT_LIMIT: i64 = 6;

/// Data-access contract consumed by the engine
#[async_trait]
pub trait SkillSource: Send + Sync {
    /// Look up one skill by its identifier
    async fn skill_by_id(&self, id: &str) -> Result<Option<Skill>>;

    /// Fetch up to `limit` approved skills excluding `exclude_id`, ordered by
    /// descending star count
    async fn approved_candidates(&self, exclude_id: &str, limit: i64) -> Result<Vec<Skill>>;
}

/// Floor a raw (possibly fractional or out-of-range) limit into [1, 20]
pub fn clamp_limit(raw: f64) -> i64 {
    (raw.floor() as i64).clamp(MIN_LIMIT, MAX_LIMIT)
}

/// Computation metadata returned alongside the related list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedMeta {
    pub source_id: String,
    pub candidates_scored: usize,
    pub topics_used: usize,
}

/// Result of one related-skills computation; immutable once returned and
/// safe to cache by value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedSkillsResult {
    pub related: Vec<Skill>,
    pub meta: RelatedMeta,
}

/// A candidate carrying its transient score; lives only for one scoring pass
struct ScoredCandidate {
    skill: Skill,
    score: f64,
}

/// Orchestrates fetch, scoring, ranking, and truncation
pub struct RelatedSkillsEngine {
    source: Arc<dyn SkillSource>,
}

impl RelatedSkillsEngine {
    pub fn new(source: Arc<dyn SkillSource>) -> Self {
        Self { source }
    }

    /// Compute the related skills for `skill_id`.
    ///
    /// Returns `Ok(None)` when the source skill does not exist; data-fetch
    /// failures propagate unchanged.
    pub async fn compute(
        &self,
        skill_id: &str,
        limit: i64,
    ) -> Result<Option<RelatedSkillsResult>> {
        let limit = limit.clamp(MIN_LIMIT, MAX_LIMIT) as usize;

        let (source_skill, candidates) = tokio::try_join!(
            self.source.skill_by_id(skill_id),
            self.source.approved_candidates(skill_id, CANDIDATE_POOL_SIZE),
        )?;

        let Some(source_skill) = source_skill else {
            return Ok(None);
        };

        let scorer = Scorer::new(&source_skill);
        let candidates_scored = candidates.len();

        let mut scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .map(|skill| ScoredCandidate {
                score: scorer.score(&skill),
                skill,
            })
            .collect();

        // Stable sort: equal scores keep pool order, which is descending
        // stars from the candidate query.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));

        let related: Vec<Skill> = scored
            .into_iter()
            .filter(|c| c.score > 0.0)
            .take(limit)
            .map(|c| c.skill)
            .collect();

        Ok(Some(RelatedSkillsResult {
            related,
            meta: RelatedMeta {
                source_id: skill_id.to_string(),
                candidates_scored,
                topics_used: scorer.topics_used(),
            },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::related::test_support::{skill, StaticSource};

    fn engine(skills: Vec<Skill>) -> RelatedSkillsEngine {
        RelatedSkillsEngine::new(Arc::new(StaticSource::new(skills)))
    }

    #[test]
    fn clamp_limit_bounds() {
        assert_eq!(clamp_limit(6.0), 6);
        assert_eq!(clamp_limit(2.7), 2);
        assert_eq!(clamp_limit(100.0), 20);
        assert_eq!(clamp_limit(0.0), 1);
        assert_eq!(clamp_limit(-5.3), 1);
    }

    #[tokio::test]
    async fn missing_source_returns_none() {
        let result = engine(vec![]).compute("missing-id", 6).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn scores_ranks_and_strips() {
        let source = skill("src", "fast-deploy", "acme", &["python", "cli"], 10);
        // strong: topic + owner + name word
        let strong = skill("strong", "fast-rollout", "acme", &["python"], 200);
        // weak: stars only
        let weak = skill("weak", "other-tool", "someone", &[], 500);
        // zero: shares nothing
        let zero = skill("zero", "unrelated", "someone", &[], 0);

        let result = engine(vec![source, weak, strong, zero])
            .compute("src", 6)
            .await
            .unwrap()
            .unwrap();

        let ids: Vec<&str> = result.related.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["strong", "weak"]);
        assert_eq!(result.meta.source_id, "src");
        assert_eq!(result.meta.candidates_scored, 3);
        assert_eq!(result.meta.topics_used, 2);
    }

    #[tokio::test]
    async fn source_skill_never_in_results() {
        let source = skill("src", "fast-deploy", "acme", &["python"], 100);
        let other = skill("other", "fast-ship", "acme", &["python"], 50);

        let result = engine(vec![source, other])
            .compute("src", 6)
            .await
            .unwrap()
            .unwrap();

        assert!(result.related.iter().all(|s| s.id != "src"));
    }

    #[tokio::test]
    async fn unapproved_candidates_are_excluded() {
        let source = skill("src", "fast-deploy", "acme", &["python"], 100);
        let mut pending = skill("pending", "fast-ship", "acme", &["python"], 50);
        pending.status = "pending".to_string();
        let mut rejected = skill("rejected", "fast-run", "acme", &["python"], 40);
        rejected.status = "rejected".to_string();

        let result = engine(vec![source, pending, rejected])
            .compute("src", 6)
            .await
            .unwrap()
            .unwrap();

        assert!(result.related.is_empty());
        assert_eq!(result.meta.candidates_scored, 0);
    }

    #[tokio::test]
    async fn limit_is_clamped_and_applied() {
        let source = skill("src", "deploy", "acme", &["python"], 0);
        let mut skills = vec![source];
        for i in 0..30 {
            skills.push(skill(
                &format!("c{i}"),
                "tool",
                "acme",
                &["python"],
                30 - i as i64,
            ));
        }

        let result = engine(skills.clone())
            .compute("src", 100)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.related.len(), 20);

        let result = engine(skills).compute("src", -3).await.unwrap().unwrap();
        assert_eq!(result.related.len(), 1);
    }

    #[tokio::test]
    async fn equal_scores_keep_pool_order() {
        let source = skill("src", "deploy", "acme", &["python"], 0);
        // b and c tie exactly (one topic + 300 stars each); a scores lower
        let c = skill("c", "toolc", "ownc", &["python"], 300);
        let a = skill("a", "toola", "owna", &["python"], 50);
        let b = skill("b", "toolb", "ownb", &["python"], 300);

        let result = engine(vec![source, c, a, b])
            .compute("src", 6)
            .await
            .unwrap()
            .unwrap();

        // the tie resolves to pool order: descending stars, input order within
        let ids: Vec<&str> = result.related.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn deterministic_across_calls() {
        let source = skill("src", "fast-deploy", "acme", &["python", "cli"], 10);
        let a = skill("a", "fast-tool", "acme", &["python"], 100);
        let b = skill("b", "cli-helper", "other", &["cli"], 100);
        let engine = engine(vec![source, a, b]);

        let first = engine.compute("src", 6).await.unwrap().unwrap();
        let second = engine.compute("src", 6).await.unwrap().unwrap();

        let ids = |r: &RelatedSkillsResult| -> Vec<String> {
            r.related.iter().map(|s| s.id.clone()).collect()
        };
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(first.meta, second.meta);
    }

    #[tokio::test]
    async fn malformed_source_topics_recover_silently() {
        let mut source = skill("src", "fast-deploy", "acme", &[], 10);
        source.topics = Some("{not json".to_string());
        let candidate = skill("c", "fast-tool", "other", &["python"], 100);

        let result = engine(vec![source, candidate])
            .compute("src", 6)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(result.meta.topics_used, 0);
        // name word "fast" still scores
        assert_eq!(result.related.len(), 1);
    }

    #[tokio::test]
    async fn upstream_failure_propagates() {
        let source = StaticSource::failing();
        let engine = RelatedSkillsEngine::new(Arc::new(source));
        assert!(engine.compute("src", 6).await.is_err());
    }
}
