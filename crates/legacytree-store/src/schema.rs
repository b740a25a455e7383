//! Database schema SQL.

/// Stories table. Timestamps are unix milliseconds, `date` is `YYYY-MM-DD`.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS stories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    summary TEXT NOT NULL,
    theme TEXT NOT NULL,
    location TEXT NOT NULL,
    lat REAL NOT NULL,
    lon REAL NOT NULL,
    date TEXT NOT NULL,
    message_to_future TEXT,
    visibility TEXT NOT NULL DEFAULT 'Public',
    audio_path TEXT,
    image_path TEXT,
    illustration_url TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_stories_visibility ON stories(visibility);
"#;
