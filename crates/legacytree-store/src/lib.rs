//! LegacyTree Store: SQLite persistence for enriched stories.

pub mod schema;
pub mod sqlite;
pub mod types;

pub use sqlite::StoryStore;
pub use types::*;
