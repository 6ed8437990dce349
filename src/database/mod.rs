//! Database module - PostgreSQL
//!
//! Provides the skill catalog storage: the `skills` table populated by the
//! external synchronization pipeline, and the read paths the API serves from.

mod postgres;
mod skills;

pub use postgres::{init_pool, migrations, PostgresPool};
pub use skills::{Skill, SkillStatus, SkillStore, TopicCount};
