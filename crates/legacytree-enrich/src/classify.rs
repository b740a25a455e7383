//! Rule-based story classification: title and theme.
//!
//! Both classifiers are pure functions of the transcript and independent of
//! each other. Matching is case-insensitive substring search, so "moved"
//! counts for "move" and "warm" counts for "war".

pub mod theme;
pub mod title;

pub use theme::{classify_theme, theme_scores, ThemeScore};
pub use title::{classify_title, DEFAULT_TITLE};
