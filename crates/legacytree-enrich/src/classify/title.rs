//! Ordered title rules, first match wins.

pub const DEFAULT_TITLE: &str = "A Special Memory";

/// (keywords, title) in priority order.
const TITLE_RULES: &[(&[&str], &str)] = &[
    (&["grandfather", "grandpa", "grandad"], "Memories of Grandfather"),
    (&["grandmother", "grandma", "nana"], "Memories of Grandmother"),
    (&["father", "dad", "papa"], "Memories of Father"),
    (&["mother", "mom", "mama"], "Memories of Mother"),
    (&["war"], "War Time Memories"),
    (&["migration", "immigration", "journey"], "The Great Journey"),
    (&["love"], "A Love Story"),
    (&["wedding"], "Wedding Day Memories"),
    (&["birth", "born"], "Birth Story"),
    (&["school", "education"], "School Days"),
    (&["work", "job"], "Working Life"),
];

/// Pick a title from the first rule whose keyword occurs in the text.
pub fn classify_title(text: &str) -> String {
    let lower = text.to_lowercase();
    TITLE_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, title)| *title)
        .unwrap_or(DEFAULT_TITLE)
        .to_string()
}
