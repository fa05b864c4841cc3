//! Render-ready state for the browser.
//!
//! The controllers write into these panels through the binding traits, and
//! `render.rs` only reads them.

use meditation_client::view::{
    Card, CatalogView, Notifier, Page, PlayGlyph, PlayerView, VolumeGlyph,
};

#[derive(Debug, Default)]
pub(crate) struct CatalogPanel {
    pub(crate) cards: Vec<Card>,
    pub(crate) empty: bool,
}

impl CatalogView for CatalogPanel {
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

impl CatalogPanel {
    pub(crate) fn labels(&self) -> Vec<String> {
        self.cards
            .iter()
            .map(|card| {
                format!(
                    "{:<24} {:<18} [{}]  {}",
                    card.title, card.category, card.duration_label, card.description
                )
            })
            .collect()
    }
}

#[derive(Debug)]
pub(crate) struct PlayerPanel {
    pub(crate) visible: bool,
    pub(crate) title: String,
    pub(crate) play_glyph: PlayGlyph,
    pub(crate) volume_glyph: VolumeGlyph,
    pub(crate) volume_percent: u8,
    pub(crate) progress: f64,
    pub(crate) elapsed: String,
    pub(crate) duration: String,
}

impl Default for PlayerPanel {
    fn default() -> Self {
        Self {
            visible: false,
            title: String::new(),
            play_glyph: PlayGlyph::Play,
            volume_glyph: VolumeGlyph::Unmuted,
            volume_percent: 50,
            progress: 0.0,
            elapsed: "0:00".to_string(),
            duration: "0:00".to_string(),
        }
    }
}

impl PlayerView for PlayerPanel {
    fn set_modal_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn set_play_glyph(&mut self, glyph: PlayGlyph) {
        self.play_glyph = glyph;
    }

    fn set_volume_glyph(&mut self, glyph: VolumeGlyph) {
        self.volume_glyph = glyph;
    }

    fn set_volume_slider(&mut self, percent: u8) {
        self.volume_percent = percent;
    }

    fn set_progress(&mut self, percent: f64) {
        self.progress = percent;
    }

    fn set_elapsed_label(&mut self, label: &str) {
        self.elapsed = label.to_string();
    }

    fn set_duration_label(&mut self, label: &str) {
        self.duration = label.to_string();
    }
}

impl PlayerPanel {
    pub(crate) fn transport_line(&self) -> String {
        let play = match self.play_glyph {
            PlayGlyph::Play => "▶ play",
            PlayGlyph::Pause => "⏸ pause",
        };
        let volume = match self.volume_glyph {
            VolumeGlyph::Unmuted => format!("vol {}%", self.volume_percent),
            VolumeGlyph::Muted => "muted".to_string(),
        };
        format!("{play}  |  {} / {}  |  {volume}", self.elapsed, self.duration)
    }

    /// Gauge ratio in `0.0..=1.0`.
    pub(crate) fn ratio(&self) -> f64 {
        (self.progress / 100.0).clamp(0.0, 1.0)
    }
}

/// Status footer; doubles as the notifier for the browser.
#[derive(Debug, Default)]
pub(crate) struct StatusLine {
    pub(crate) text: String,
    pub(crate) is_error: bool,
    pub(crate) loading: bool,
    pub(crate) login_required: bool,
}

impl Notifier for StatusLine {
    fn show_error(&mut self, message: &str) {
        self.text = message.to_string();
        self.is_error = true;
    }

    fn show_message(&mut self, message: &str) {
        self.text = message.to_string();
        self.is_error = false;
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn navigate(&mut self, page: Page) {
        if page == Page::Login {
            self.login_required = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_line_reflects_glyphs() {
        let mut panel = PlayerPanel::default();
        panel.set_elapsed_label("1:05");
        panel.set_duration_label("10:00");
        assert_eq!(panel.transport_line(), "▶ play  |  1:05 / 10:00  |  vol 50%");

        panel.set_play_glyph(PlayGlyph::Pause);
        panel.set_volume_glyph(VolumeGlyph::Muted);
        assert_eq!(panel.transport_line(), "⏸ pause  |  1:05 / 10:00  |  muted");
    }

    #[test]
    fn login_navigation_is_flagged() {
        let mut status = StatusLine::default();
        status.navigate(Page::Meditation);
        assert!(!status.login_required);
        status.show_error("Session expired. Please login again.");
        status.navigate(Page::Login);
        assert!(status.login_required);
        assert!(status.is_error);
    }
}
