use serde::{Deserialize, Serialize};

use crate::news::NewsItem;

/// Push notifications sent to connected WebSocket clients after an admin
/// mutation has committed. Ephemeral: never persisted, no replay — a client
/// that connects later simply misses earlier events.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NewsEvent {
    #[serde(rename = "new_news")]
    NewsCreated { news: Vec<NewsItem>, count: usize },

    #[serde(rename = "news_deleted")]
    NewsDeleted { news_id: i64 },

    #[serde(rename = "all_news_deleted")]
    AllNewsDeleted,
}

impl NewsEvent {
    /// Build a `NewsCreated` event carrying the full created batch.
    pub fn created(news: Vec<NewsItem>) -> Self {
        let count = news.len();
        Self::NewsCreated { news, count }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::NewsCreated { .. } => "new_news",
            Self::NewsDeleted { .. } => "news_deleted",
            Self::AllNewsDeleted => "all_news_deleted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64) -> NewsItem {
        NewsItem {
            id,
            title: format!("Title {id}"),
            content: "Body".into(),
            created_at: "2026-08-07T10:00:00+00:00".into(),
        }
    }

    #[test]
    fn new_news_wire_shape() {
        let event = NewsEvent::created(vec![item(1), item(2)]);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"new_news\""));
        assert!(json.contains("\"count\":2"));
        assert!(json.contains("\"news\":[{"));
        assert!(json.contains("\"created_at\":\"2026-08-07T10:00:00+00:00\""));
    }

    #[test]
    fn news_deleted_wire_shape() {
        let event = NewsEvent::NewsDeleted { news_id: 7 };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"news_deleted","news_id":7}"#);
    }

    #[test]
    fn all_news_deleted_wire_shape() {
        let json = serde_json::to_string(&NewsEvent::AllNewsDeleted).unwrap();
        assert_eq!(json, r#"{"type":"all_news_deleted"}"#);
    }

    #[test]
    fn created_counts_batch() {
        let event = NewsEvent::created(vec![item(1), item(2), item(3)]);
        match event {
            NewsEvent::NewsCreated { count, ref news } => {
                assert_eq!(count, 3);
                assert_eq!(news.len(), 3);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn event_type_strings() {
        assert_eq!(NewsEvent::created(vec![]).event_type(), "new_news");
        assert_eq!(NewsEvent::NewsDeleted { news_id: 1 }.event_type(), "news_deleted");
        assert_eq!(NewsEvent::AllNewsDeleted.event_type(), "all_news_deleted");
    }
}
