//! Related-skills scoring engine
//!
//! Leaf-to-root: topic normalization, pairwise similarity primitives, the
//! weighted scorer, the engine orchestrating fetch/score/rank, and a
//! request-scoped memo for server-rendered pages. Caching above the engine
//! lives in [`crate::cache`].

pub mod engine;
pub mod memo;
pub mod scorer;
pub mod similarity;
pub mod topics;

pub use engine::{
    clamp_limit, RelatedMeta, RelatedSkillsEngine, RelatedSkillsResult, SkillSource,
    CANDIDATE_POOL_SIZE, DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT,
};
pub use memo::RenderMemo;
