//! Explicit cache seam.
//!
//! Used as a fallback copy of data whose primary store may be unreachable
//! (the persona, the recent conversation log).

/// Keyed cache of cloneable values.
#[async_trait::async_trait]
pub trait Cache<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Option<V>;

    async fn set(&self, key: &str, value: V);

    async fn invalidate(&self, key: &str);
}
