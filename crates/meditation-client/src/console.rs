//! Line-oriented bindings for the one-shot subcommands.

use meditation_client::view::{Card, CatalogView, Notifier, Page, PreferencesView};
use meditation_types::UserPreferences;

#[derive(Default)]
pub(crate) struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn show_error(&mut self, message: &str) {
        eprintln!("error: {message}");
    }

    fn show_message(&mut self, message: &str) {
        println!("{message}");
    }

    fn set_loading(&mut self, loading: bool) {
        tracing::debug!(loading, "request in flight");
    }

    fn navigate(&mut self, page: Page) {
        match page {
            Page::Login => eprintln!("run `meditation-cli login` to sign in"),
            other => tracing::debug!(page = ?other, "navigate"),
        }
    }
}

/// Buffers the last render so it can be printed once the command finishes.
#[derive(Default)]
pub(crate) struct ConsoleCatalogView {
    cards: Vec<Card>,
    empty: bool,
}

impl CatalogView for ConsoleCatalogView {
    fn set_empty_state(&mut self, visible: bool) {
        self.empty = visible;
    }

    fn clear_grid(&mut self) {
        self.cards.clear();
    }

    fn show_cards(&mut self, cards: Vec<Card>) {
        self.cards = cards;
    }
}

impl ConsoleCatalogView {
    pub(crate) fn lines(&self) -> Vec<String> {
        if self.empty {
            return vec!["No meditations found.".to_string()];
        }
        self.cards
            .iter()
            .map(|card| {
                format!(
                    "{:>3}  {:<22} {:<18} {:>6}  {}",
                    card.id, card.title, card.category, card.duration_label, card.description
                )
            })
            .collect()
    }
}

#[derive(Default)]
pub(crate) struct ConsolePreferencesView {
    shown: Option<UserPreferences>,
}

impl PreferencesView for ConsolePreferencesView {
    fn populate(&mut self, prefs: &UserPreferences) {
        self.shown = Some(prefs.clone());
    }
}

impl ConsolePreferencesView {
    pub(crate) fn lines(&self) -> Vec<String> {
        let Some(prefs) = self.shown.as_ref() else {
            return Vec::new();
        };
        let themes = if prefs.favorite_themes.is_empty() {
            "-".to_string()
        } else {
            prefs.favorite_themes.join(", ")
        };
        vec![
            format!("favorite themes:    {themes}"),
            format!("preferred duration: {}", prefs.preferred_duration),
            format!("best time of day:   {}", prefs.best_time_of_day),
            format!(
                "notifications:      {}",
                if prefs.notifications { "on" } else { "off" }
            ),
            format!("theme:              {}", prefs.theme),
            format!("updated:            {}", prefs.updated_at.to_rfc3339()),
        ]
    }
}
