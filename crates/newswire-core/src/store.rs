use crate::news::NewsItem;

/// Errors surfaced by the news store and the operations built on it.
#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    #[error("news {0} not found")]
    NotFound(i64),

    #[error("invalid count {0}: must be at least 1")]
    InvalidCount(i64),

    #[error("store error: {0}")]
    Store(String),
}

/// Storage collaborator for news items.
///
/// Mutating callers must treat `Err` as "nothing committed": no cache
/// invalidation or client notification may follow a failed call.
pub trait NewsStore: Send + Sync {
    fn create(&self, title: &str, content: &str) -> Result<NewsItem, NewsError>;

    fn get_by_id(&self, id: i64) -> Result<NewsItem, NewsError>;

    fn delete_by_id(&self, id: i64) -> Result<(), NewsError>;

    /// Delete every item; deleting from an empty store is success with 0.
    fn delete_all(&self) -> Result<usize, NewsError>;

    /// Full listing, newest first.
    fn list_all_descending(&self) -> Result<Vec<NewsItem>, NewsError>;
}
