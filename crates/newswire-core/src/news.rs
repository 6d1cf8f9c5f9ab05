use serde::{Deserialize, Serialize};

/// A published news item.
///
/// `id` is store-assigned and unique; `created_at` is an RFC 3339 timestamp.
/// Items are immutable once created — the only mutation is deletion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: String,
}
