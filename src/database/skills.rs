//! Skill catalog storage and read paths
//!
//! Skills are discovered by the external sync pipeline and reviewed through a
//! status lifecycle: pending → approved/rejected. Only approved skills are
//! served by the public directory endpoints.

use crate::database::PostgresPool;
use crate::error::Result;
use crate::related::topics::parse_topics;
use crate::related::SkillSource;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::HashMap;

/// Skill review status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillStatus {
    Pending,
    Approved,
    Rejected,
}

impl SkillStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SkillStatus::Pending => "pending",
            SkillStatus::Approved => "approved",
            SkillStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "approved" => SkillStatus::Approved,
            "rejected" => SkillStatus::Rejected,
            _ => SkillStatus::Pending,
        }
    }
}

impl std::fmt::Display for SkillStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A cataloged agent-skill package
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    /// Platform-derived unique identifier
    pub id: String,
    pub name: String,
    pub description: String,
    /// Repository owner; compared case-insensitively
    pub owner: String,
    pub repo: String,
    pub stars: Option<i64>,
    pub status: String,
    /// Serialized JSON array of topic strings; may be null or malformed
    pub topics: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Skill {
    pub fn status_enum(&self) -> SkillStatus {
        SkillStatus::from_str(&self.status)
    }
}

/// A topic with its occurrence count across approved skills
#[derive(Debug, Clone, Serialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: usize,
}

/// Skill store backed by PostgreSQL
#[derive(Clone)]
pub struct SkillStore {
    pool: PostgresPool,
}

impl SkillStore {
    pub fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }

    /// Get a skill by ID
    pub async fn get(&self, id: &str) -> Result<Option<Skill>> {
        let skill: Option<Skill> = sqlx::query_as("SELECT * FROM skills WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(skill)
    }

    /// Fetch the relatedness candidate pool: approved skills excluding the
    /// source, most popular first. Star ties fall back to recency then id so
    /// the pool order is deterministic for a given dataset.
    pub async fn approved_candidates(&self, exclude_id: &str, limit: i64) -> Result<Vec<Skill>> {
        let skills: Vec<Skill> = sqlx::query_as(r#"
            SELECT * FROM skills
            WHERE status = 'approved' AND id != $1
            ORDER BY stars DESC NULLS LAST, created_at DESC, id
            LIMIT $2
        "#)
        .bind(exclude_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(skills)
    }

    /// List skills for the directory, optionally filtered by status
    pub async fn list(
        &self,
        status: Option<SkillStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Skill>> {
        let skills: Vec<Skill> = sqlx::query_as(r#"
            SELECT * FROM skills
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY stars DESC NULLS LAST, created_at DESC
            LIMIT $2 OFFSET $3
        "#)
        .bind(status.map(|s| s.as_str().to_string()))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(skills)
    }

    /// Count skills grouped by status
    pub async fn count_by_status(&self) -> Result<HashMap<String, i64>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM skills GROUP BY status")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().collect())
    }

    /// Most common topics across approved skills, descending by count.
    ///
    /// Topics live in a serialized TEXT column, so the tally happens in
    /// process rather than in SQL; malformed rows contribute nothing.
    pub async fn topic_counts(&self, limit: usize) -> Result<Vec<TopicCount>> {
        let rows: Vec<(Option<String>,)> =
            sqlx::query_as("SELECT topics FROM skills WHERE status = 'approved'")
                .fetch_all(&self.pool)
                .await?;

        let mut counts: HashMap<String, usize> = HashMap::new();
        for (raw,) in &rows {
            for topic in parse_topics(raw.as_deref()) {
                *counts.entry(topic).or_insert(0) += 1;
            }
        }

        let mut topics: Vec<TopicCount> = counts
            .into_iter()
            .map(|(topic, count)| TopicCount { topic, count })
            .collect();
        topics.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.topic.cmp(&b.topic)));
        topics.truncate(limit);
        Ok(topics)
    }
}

#[async_trait]
impl SkillSource for SkillStore {
    async fn skill_by_id(&self, id: &str) -> Result<Option<Skill>> {
        self.get(id).await
    }

    async fn approved_candidates(&self, exclude_id: &str, limit: i64) -> Result<Vec<Skill>> {
        SkillStore::approved_candidates(self, exclude_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trip() {
        for status in [
            SkillStatus::Pending,
            SkillStatus::Approved,
            SkillStatus::Rejected,
        ] {
            assert_eq!(SkillStatus::from_str(status.as_str()), status);
        }
    }

    #[test]
    fn unknown_status_defaults_to_pending() {
        assert_eq!(SkillStatus::from_str("archived"), SkillStatus::Pending);
    }
}
