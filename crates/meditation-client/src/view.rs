//! View-binding traits.
//!
//! Each front end implements these once per view and hands them to the
//! controllers. Controllers never reach for UI elements by name.

use meditation_types::{MeditationItem, UserPreferences};

use crate::player::format_time;

/// Top-level views the client can navigate between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Login,
    Meditation,
    Preferences,
}

impl Page {
    /// Views that require a session token.
    pub fn requires_auth(self) -> bool {
        matches!(self, Page::Meditation | Page::Preferences)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayGlyph {
    Play,
    Pause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeGlyph {
    Unmuted,
    Muted,
}

/// User-facing feedback and navigation.
pub trait Notifier {
    fn show_error(&mut self, message: &str);
    fn show_message(&mut self, message: &str);
    fn set_loading(&mut self, loading: bool);
    fn navigate(&mut self, page: Page);
}

/// Render-ready card for one catalog item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub duration_label: String,
}

impl From<&MeditationItem> for Card {
    fn from(item: &MeditationItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            description: item.description.clone(),
            category: item.category.clone(),
            duration_label: format_time(f64::from(item.duration) * 60.0),
        }
    }
}

pub trait CatalogView {
    fn set_empty_state(&mut self, visible: bool);
    fn clear_grid(&mut self);
    fn show_cards(&mut self, cards: Vec<Card>);
}

/// Widgets of the player modal.
pub trait PlayerView {
    fn set_modal_visible(&mut self, visible: bool);
    fn set_title(&mut self, title: &str);
    fn set_play_glyph(&mut self, glyph: PlayGlyph);
    fn set_volume_glyph(&mut self, glyph: VolumeGlyph);
    fn set_volume_slider(&mut self, percent: u8);
    fn set_progress(&mut self, percent: f64);
    fn set_elapsed_label(&mut self, label: &str);
    fn set_duration_label(&mut self, label: &str);
}

/// Transport of the single audio handle bound to the player.
pub trait AudioElement {
    fn set_source(&mut self, uri: &str);
    fn play(&mut self);
    fn pause(&mut self);
    fn set_current_time(&mut self, seconds: f64);
    fn set_volume(&mut self, gain: f64);
}

pub trait PreferencesView {
    fn populate(&mut self, prefs: &UserPreferences);
}
