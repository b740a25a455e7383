//! SQLite-backed story store.
//!
//! One connection behind a mutex; every operation is a short statement so the
//! lock is never held across an await point by callers.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::schema::SCHEMA_SQL;
use crate::types::*;
use legacytree_core::{Error, Result, Theme, Visibility};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Persistent store of enriched stories.
pub struct StoryStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl StoryStore {
    /// Open or create the store.
    ///
    /// `db_dir` is the directory (e.g., `data/db/`). The file will be `db_dir/legacytree.db`.
    pub fn open(db_dir: impl AsRef<Path>) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir).map_err(|e| Error::Storage(e.to_string()))?;
        let db_path = db_dir.join("legacytree.db");

        let conn = Self::create_connection(&db_path)?;
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
        };

        info!(
            "StoryStore initialized: {} stories, path={}",
            store.count_stories()?,
            store.db_path.display()
        );

        Ok(store)
    }

    fn create_connection(db_path: &Path) -> Result<Connection> {
        let conn = Connection::open(db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(conn)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    // ---------------------------------------------------------------
    // Story CRUD
    // ---------------------------------------------------------------

    /// Persist an enriched story. Returns the stored row with its new id.
    pub fn insert_story(&self, story: &EnrichedStory) -> Result<Story> {
        let now = now_millis();
        let conn = self.conn.lock();
        let id = conn
            .prepare_cached(
                "INSERT INTO stories (title, summary, theme, location, lat, lon, date, \
                 message_to_future, visibility, audio_path, image_path, illustration_url, \
                 created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)",
            )
            .map_err(|e| Error::Database(e.to_string()))?
            .insert(params![
                story.title,
                story.summary,
                story.theme.as_str(),
                story.location,
                story.lat,
                story.lon,
                story.date.format(DATE_FORMAT).to_string(),
                story.message_to_future,
                story.visibility.as_str(),
                story.audio_path,
                story.image_path,
                story.illustration_url,
                now,
            ])
            .map_err(|e| Error::Database(e.to_string()))?;

        debug!("Inserted story {} ({})", id, story.title);
        Self::fetch(&conn, id)?
            .ok_or_else(|| Error::Internal(format!("Story {} vanished after insert", id)))
    }

    /// Get a story by ID.
    pub fn get_story(&self, id: i64) -> Result<Option<Story>> {
        let conn = self.conn.lock();
        Self::fetch(&conn, id)
    }

    /// All stories in insertion order, optionally filtered by visibility.
    pub fn list_stories(&self, visibility: Option<Visibility>) -> Result<Vec<Story>> {
        let conn = self.conn.lock();
        let rows: Vec<Story> = match visibility {
            Some(v) => {
                let mut stmt = conn
                    .prepare_cached("SELECT * FROM stories WHERE visibility = ?1 ORDER BY id ASC")
                    .map_err(|e| Error::Database(e.to_string()))?;
                let rows = stmt
                    .query_map(params![v.as_str()], |row| Ok(Self::row_to_story(row)))
                    .map_err(|e| Error::Database(e.to_string()))?;
                rows.filter_map(|r| r.ok()).collect()
            }
            None => {
                let mut stmt = conn
                    .prepare_cached("SELECT * FROM stories ORDER BY id ASC")
                    .map_err(|e| Error::Database(e.to_string()))?;
                let rows = stmt
                    .query_map([], |row| Ok(Self::row_to_story(row)))
                    .map_err(|e| Error::Database(e.to_string()))?;
                rows.filter_map(|r| r.ok()).collect()
            }
        };
        Ok(rows)
    }

    /// Apply a partial update in place. Returns `None` if the story does not exist.
    pub fn update_story(&self, id: i64, update: &StoryUpdate) -> Result<Option<Story>> {
        let conn = self.conn.lock();
        let mut current = match Self::fetch(&conn, id)? {
            Some(s) => s.content,
            None => return Ok(None),
        };
        update.apply_to(&mut current);

        conn.prepare_cached(
            "UPDATE stories SET title = ?1, summary = ?2, theme = ?3, location = ?4, \
             lat = ?5, lon = ?6, date = ?7, message_to_future = ?8, visibility = ?9, \
             illustration_url = ?10, updated_at = ?11 WHERE id = ?12",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![
            current.title,
            current.summary,
            current.theme.as_str(),
            current.location,
            current.lat,
            current.lon,
            current.date.format(DATE_FORMAT).to_string(),
            current.message_to_future,
            current.visibility.as_str(),
            current.illustration_url,
            now_millis(),
            id,
        ])
        .map_err(|e| Error::Database(e.to_string()))?;

        Self::fetch(&conn, id)
    }

    /// Delete a story. Returns false if it did not exist.
    pub fn delete_story(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock();
        let count = conn
            .execute("DELETE FROM stories WHERE id = ?1", params![id])
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Count total stories.
    pub fn count_stories(&self) -> Result<i64> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM stories", [], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(count)
    }

    // ---------------------------------------------------------------
    // Row Mapping Helpers
    // ---------------------------------------------------------------

    fn fetch(conn: &Connection, id: i64) -> Result<Option<Story>> {
        conn.prepare_cached("SELECT * FROM stories WHERE id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![id], |row| Ok(Self::row_to_story(row)))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))
    }

    fn row_to_story(row: &rusqlite::Row<'_>) -> Story {
        let theme: String = row.get("theme").unwrap_or_default();
        let visibility: String = row.get("visibility").unwrap_or_default();
        let date: String = row.get("date").unwrap_or_default();

        Story {
            id: row.get("id").unwrap_or(0),
            content: EnrichedStory {
                title: row.get("title").unwrap_or_default(),
                summary: row.get("summary").unwrap_or_default(),
                theme: theme.parse().unwrap_or(Theme::Family),
                location: row.get("location").unwrap_or_default(),
                lat: row.get("lat").unwrap_or(0.0),
                lon: row.get("lon").unwrap_or(0.0),
                date: NaiveDate::parse_from_str(&date, DATE_FORMAT).unwrap_or_default(),
                message_to_future: row.get("message_to_future").ok().flatten(),
                visibility: visibility.parse().unwrap_or_default(),
                illustration_url: row.get("illustration_url").ok().flatten(),
                audio_path: row.get("audio_path").ok().flatten(),
                image_path: row.get("image_path").ok().flatten(),
            },
            created_at: from_millis(row.get("created_at").unwrap_or(0)),
            updated_at: from_millis(row.get("updated_at").unwrap_or(0)),
        }
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}
