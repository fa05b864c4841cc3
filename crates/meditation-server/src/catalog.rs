//! Built-in meditation catalog and query helpers.

use meditation_types::MeditationItem;

const BELL_AUDIO_URL: &str = "https://www.soundjay.com/misc/sounds/bell-ringing-05.wav";

/// Sessions seeded into an empty store.
pub fn default_catalog() -> Vec<MeditationItem> {
    [
        (
            1,
            "Morning Calm",
            "Start your day with clarity and intention.",
            "Morning Calm",
            10,
        ),
        (
            2,
            "Stress Relief",
            "Let go of tension and reconnect with your breath.",
            "Stress Relief",
            15,
        ),
        (
            3,
            "Sleep Journey",
            "Drift into restful sleep with gentle guidance.",
            "Sleep Journey",
            20,
        ),
        (
            4,
            "Focus & Clarity",
            "Enhance your concentration and mental clarity.",
            "Focus & Clarity",
            15,
        ),
        (
            5,
            "Mindfulness Practice",
            "Cultivate present-moment awareness and inner peace.",
            "Mindfulness",
            10,
        ),
        (
            6,
            "Gratitude Meditation",
            "Open your heart to appreciation and joy.",
            "Gratitude",
            5,
        ),
    ]
    .into_iter()
    .map(|(id, title, description, category, duration)| MeditationItem {
        id,
        title: title.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        duration,
        audio_url: BELL_AUDIO_URL.to_string(),
    })
    .collect()
}

/// Parsed `duration` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationFilter {
    Any,
    Minutes(u32),
    /// A value that cannot match any item (non-numeric, negative, overflow).
    Unmatchable,
}

pub fn parse_duration_filter(raw: Option<&str>) -> DurationFilter {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => DurationFilter::Any,
        Some(value) => value
            .parse::<u32>()
            .map(DurationFilter::Minutes)
            .unwrap_or(DurationFilter::Unmatchable),
    }
}

/// Empty category strings mean "no category filter".
pub fn normalize_category(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.is_empty())
}
