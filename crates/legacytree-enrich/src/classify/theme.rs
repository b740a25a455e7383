//! Scored theme lexicon.

use legacytree_core::Theme;
use serde::Serialize;

/// Keyword lists per theme, in `Theme::all()` order.
const LEXICON: &[(Theme, &[&str])] = &[
    (Theme::Love, &["love", "romance", "marriage", "wedding", "kiss", "heart"]),
    (Theme::War, &["war", "battle", "soldier", "military", "army", "conflict"]),
    (
        Theme::Migration,
        &["migration", "immigration", "journey", "travel", "move", "country"],
    ),
    (Theme::Family, &["family", "children", "parents", "grandparents", "home"]),
    (Theme::Tradition, &["tradition", "culture", "custom", "ceremony", "ritual"]),
    (Theme::Adventure, &["adventure", "explore", "discover", "travel", "journey"]),
    (Theme::Struggle, &["struggle", "difficult", "hard", "challenge", "overcome"]),
    (Theme::Success, &["success", "achieve", "accomplish", "win", "victory"]),
];

/// Number of lexicon keywords found for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeScore {
    pub theme: Theme,
    pub score: usize,
}

/// Score every theme, in declaration order.
pub fn theme_scores(text: &str) -> Vec<ThemeScore> {
    let lower = text.to_lowercase();
    LEXICON
        .iter()
        .map(|(theme, keywords)| ThemeScore {
            theme: *theme,
            score: keywords.iter().filter(|k| lower.contains(*k)).count(),
        })
        .collect()
}

/// Highest-scoring theme. Ties go to the earlier-declared theme; no hits means `family`.
pub fn classify_theme(text: &str) -> Theme {
    let mut best: Option<ThemeScore> = None;
    for candidate in theme_scores(text) {
        if candidate.score == 0 {
            continue;
        }
        // Strictly greater, so the first theme reaching the top score keeps it.
        if best.map_or(true, |b| candidate.score > b.score) {
            best = Some(candidate);
        }
    }
    best.map(|b| b.theme).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexicon_follows_declaration_order() {
        let order: Vec<Theme> = LEXICON.iter().map(|(t, _)| *t).collect();
        assert_eq!(order, Theme::all());
    }

    #[test]
    fn test_tie_resolves_to_earlier_theme() {
        let text = "My grandfather fought in the war and later we moved to Canada.";
        let scores = theme_scores(text);
        let score_of = |t: Theme| scores.iter().find(|s| s.theme == t).unwrap().score;
        assert_eq!(score_of(Theme::War), 1);
        assert_eq!(score_of(Theme::Migration), 1);
        assert_eq!(classify_theme(text), Theme::War);
    }

    #[test]
    fn test_highest_score_wins() {
        assert_eq!(
            classify_theme("A wedding full of love and one kiss, then the journey home"),
            Theme::Love
        );
        assert_eq!(
            classify_theme("The ceremony honoured an old custom of our culture"),
            Theme::Tradition
        );
        assert_eq!(
            classify_theme("It was difficult and hard, a struggle we had to overcome"),
            Theme::Struggle
        );
    }

    #[test]
    fn test_shared_keywords_count_for_both() {
        let scores = theme_scores("travel");
        let hits: Vec<Theme> = scores.iter().filter(|s| s.score > 0).map(|s| s.theme).collect();
        assert_eq!(hits, vec![Theme::Migration, Theme::Adventure]);
        assert_eq!(classify_theme("travel"), Theme::Migration);
    }

    #[test]
    fn test_no_hits_defaults_to_family() {
        assert_eq!(classify_theme("We baked bread every Sunday."), Theme::Family);
        assert_eq!(classify_theme(""), Theme::Family);
    }
}
