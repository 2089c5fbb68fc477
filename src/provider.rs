use async_trait::async_trait;

use crate::error::MediaError;

/// An upstream catalog that yields one kind of canonical media entity.
#[async_trait]
pub trait MediaProvider: Send + Sync {
    type Item: Send;

    /// Results are sorted by descending popularity.
    async fn search_by_name(&self, name: &str) -> Result<Vec<Self::Item>, MediaError>;

    async fn get_by_id(&self, id: &str) -> Result<Self::Item, MediaError>;
}
