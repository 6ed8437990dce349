//! Cache layers
//!
//! Two independently-instantiated bounded caches with promotion-on-read and
//! TTL expiry: the server-wide [`SharedCache`] shared by unrelated read
//! endpoints, and the [`RelatedCache`] scoped to the related-skills route.
//! They share no storage or state.

mod related;
mod shared;

pub use related::{related_key, RelatedCache};
pub use shared::{CacheStats, SharedCache, TtlCache};
