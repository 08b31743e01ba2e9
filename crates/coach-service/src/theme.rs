//! Keyword-based theme classification.

use coach_entity::notification::Theme;

/// Ordered keyword table. Earlier rows win when several match.
const THEME_KEYWORDS: &[(Theme, &[&str])] = &[
    (
        Theme::Sleep,
        &["sleep", "bedtime", "insomnia", " nap", "wind down", "melatonin", "slept"],
    ),
    (
        Theme::Recovery,
        &["recovery", "recover", "rest day", "hrv", "soreness", "sore muscles", "deload"],
    ),
    (
        Theme::Exercise,
        &[
            "workout", "exercise", " run", "cardio", "strength", "training", "steps",
            "walk", "gym", "yoga", "cycling",
        ],
    ),
    (
        Theme::Nutrition,
        &[
            "nutrition", "meal", "protein", "hydrat", "water intake", "calorie", "diet",
            "breakfast", "lunch", "dinner", "snack",
        ],
    ),
    (
        Theme::Stress,
        &[
            "stress", "anxious", "anxiety", "breath", "meditat", "calm", "overwhelm", "burnout",
            "mindful",
        ],
    ),
    (
        Theme::Work,
        &["work", "meeting", "deadline", "calendar", "focus time", "commute", "office"],
    ),
    (
        Theme::Social,
        &["friend", "family", "social", "partner", "community", "call someone"],
    ),
    (
        Theme::Music,
        &["music", "playlist", "song", "spotify", "listen"],
    ),
    (
        Theme::Achievement,
        &["achievement", "badge", "milestone", "personal best", "unlocked", "congrat"],
    ),
    (
        Theme::Streak,
        &["streak", "in a row", "consecutive"],
    ),
    (
        Theme::Goal,
        &["goal", "target", "objective", "progress toward"],
    ),
];

/// Map a title and body to a canonical theme.
///
/// The two strings are joined with surrounding spaces and lower-cased; the
/// first row of the keyword table with any substring hit wins. A leading
/// space in a keyword anchors it to a word start. Returns [`Theme::General`] when
/// nothing matches.
pub fn extract_theme(title: &str, body: &str) -> Theme {
    let text = format!(" {title} {body} ").to_lowercase();
    THEME_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| text.contains(keyword)))
        .map(|(theme, _)| *theme)
        .unwrap_or(Theme::General)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_title_or_body() {
        assert_eq!(extract_theme("Time to wind down", ""), Theme::Sleep);
        assert_eq!(extract_theme("Evening check-in", "Your HRV dipped today"), Theme::Recovery);
        assert_eq!(extract_theme("", "Try a 10 minute walk"), Theme::Exercise);
        assert_eq!(extract_theme("Hydration", "Drink some water"), Theme::Nutrition);
        assert_eq!(extract_theme("Take a breath", ""), Theme::Stress);
        assert_eq!(extract_theme("Big deadline tomorrow?", ""), Theme::Work);
        assert_eq!(extract_theme("New playlist for you", ""), Theme::Music);
        assert_eq!(extract_theme("Badge unlocked", ""), Theme::Achievement);
        assert_eq!(extract_theme("5 days in a row", ""), Theme::Streak);
        assert_eq!(extract_theme("Weekly goal", ""), Theme::Goal);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(extract_theme("SLEEP BETTER", ""), Theme::Sleep);
        assert_eq!(extract_theme("Strength Day", ""), Theme::Exercise);
    }

    #[test]
    fn test_table_order_breaks_ties() {
        // Mentions both sleep and a workout; sleep is earlier in the table.
        assert_eq!(
            extract_theme("Skip the late workout", "Protect your sleep tonight"),
            Theme::Sleep
        );
        // Streak and goal both match; streak wins.
        assert_eq!(extract_theme("Streak alert", "Keep your goal alive"), Theme::Streak);
    }

    #[test]
    fn test_defaults_to_general() {
        assert_eq!(extract_theme("", ""), Theme::General);
        assert_eq!(extract_theme("Hello", "Just checking in"), Theme::General);
    }

    #[test]
    fn test_deterministic() {
        let first = extract_theme("Morning run", "Great pace yesterday");
        for _ in 0..10 {
            assert_eq!(extract_theme("Morning run", "Great pace yesterday"), first);
        }
    }
}
