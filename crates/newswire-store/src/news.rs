use chrono::Utc;
use tracing::instrument;

use newswire_core::{NewsError, NewsItem, NewsStore};

use crate::database::Database;
use crate::error::StoreError;

/// SQLite-backed news repository.
pub struct NewsRepo {
    db: Database,
}

impl NewsRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a news item stamped with the current time.
    #[instrument(skip(self, content))]
    pub fn create(&self, title: &str, content: &str) -> Result<NewsItem, StoreError> {
        let now = Utc::now().to_rfc3339();
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO news (title, content, created_at) VALUES (?1, ?2, ?3)",
                rusqlite::params![title, content, now],
            )?;

            Ok(NewsItem {
                id: conn.last_insert_rowid(),
                title: title.to_string(),
                content: content.to_string(),
                created_at: now.clone(),
            })
        })
    }

    /// Get a news item by id.
    #[instrument(skip(self))]
    pub fn get(&self, id: i64) -> Result<NewsItem, StoreError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT id, title, content, created_at FROM news WHERE id = ?1",
                [id],
                row_to_item,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound(format!("news {id}")),
                other => StoreError::Database(other.to_string()),
            })
        })
    }

    /// Delete a news item by id; NotFound if no row matched.
    #[instrument(skip(self))]
    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM news WHERE id = ?1", [id])?;
            if affected == 0 {
                Err(StoreError::NotFound(format!("news {id}")))
            } else {
                Ok(())
            }
        })
    }

    /// Delete every news item, returning how many rows went away.
    #[instrument(skip(self))]
    pub fn delete_all(&self) -> Result<usize, StoreError> {
        self.db.with_conn(|conn| Ok(conn.execute("DELETE FROM news", [])?))
    }

    /// Full listing, newest first. `id DESC` breaks same-second timestamp ties.
    #[instrument(skip(self))]
    pub fn list_all_descending(&self) -> Result<Vec<NewsItem>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, content, created_at FROM news
                 ORDER BY created_at DESC, id DESC",
            )?;
            let rows = stmt
                .query_map([], row_to_item)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<NewsItem> {
    Ok(NewsItem {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn backend_error(e: StoreError) -> NewsError {
    NewsError::Store(e.to_string())
}

impl NewsStore for NewsRepo {
    fn create(&self, title: &str, content: &str) -> Result<NewsItem, NewsError> {
        NewsRepo::create(self, title, content).map_err(backend_error)
    }

    fn get_by_id(&self, id: i64) -> Result<NewsItem, NewsError> {
        self.get(id).map_err(|e| match e {
            StoreError::NotFound(_) => NewsError::NotFound(id),
            other => backend_error(other),
        })
    }

    fn delete_by_id(&self, id: i64) -> Result<(), NewsError> {
        self.delete(id).map_err(|e| match e {
            StoreError::NotFound(_) => NewsError::NotFound(id),
            other => backend_error(other),
        })
    }

    fn delete_all(&self) -> Result<usize, NewsError> {
        NewsRepo::delete_all(self).map_err(backend_error)
    }

    fn list_all_descending(&self) -> Result<Vec<NewsItem>, NewsError> {
        NewsRepo::list_all_descending(self).map_err(backend_error)
    }
}
