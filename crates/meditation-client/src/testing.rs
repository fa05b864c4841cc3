//! In-memory fakes shared by the controller tests.

use std::cell::RefCell;

use meditation_types::{
    AuthResponse, LoginRequest, MeditationItem, MessageResponse, PreferencesUpdate,
    RegisterRequest, UserPreferences, UserSummary,
};

use crate::catalog::{FilterState, apply_filters};
use crate::error::ClientError;
use crate::server_api::MeditationApi;
use crate::session::SessionContext;
use crate::token_store::MemoryTokenStore;
use crate::view::{
    AudioElement, Card, CatalogView, Notifier, Page, PlayGlyph, PlayerView, PreferencesView,
    VolumeGlyph,
};

pub(crate) fn item(id: i64, title: &str, minutes: u32) -> MeditationItem {
    MeditationItem {
        id,
        title: title.to_string(),
        description: format!("{title} session"),
        category: title.to_string(),
        duration: minutes,
        audio_url: format!("https://example.com/{id}.wav"),
    }
}

pub(crate) fn session(token: Option<&str>) -> SessionContext {
    let store = match token {
        Some(token) => MemoryTokenStore::with_token(token),
        None => MemoryTokenStore::default(),
    };
    SessionContext::init("http://localhost:3006", Box::new(store))
}

fn epoch_preferences() -> UserPreferences {
    UserPreferences::defaults_for("user-1", chrono::DateTime::<chrono::Utc>::UNIX_EPOCH)
}

/// Scripted API. Password `secret1` logs in; token `good` is accepted.
#[derive(Default)]
pub(crate) struct FakeApi {
    catalog: Vec<MeditationItem>,
    offline: bool,
    prefs: RefCell<Option<UserPreferences>>,
}

impl FakeApi {
    pub(crate) fn with_catalog(catalog: Vec<MeditationItem>) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    pub(crate) fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    fn reachable(&self) -> Result<(), ClientError> {
        if self.offline {
            return Err(ClientError::Network("connection refused".into()));
        }
        Ok(())
    }

    fn check_token(&self, token: &str) -> Result<(), ClientError> {
        self.reachable()?;
        if token == "good" {
            Ok(())
        } else {
            Err(ClientError::Auth)
        }
    }

    fn auth(email: &str, message: &str) -> AuthResponse {
        AuthResponse {
            token: format!("token-{email}"),
            user: UserSummary {
                id: "user-1".into(),
                username: email.split('@').next().unwrap_or_default().to_string(),
                email: email.to_string(),
            },
            message: message.to_string(),
        }
    }
}

impl MeditationApi for FakeApi {
    fn list_meditations(&self, filter: &FilterState) -> Result<Vec<MeditationItem>, ClientError> {
        self.reachable()?;
        Ok(apply_filters(&self.catalog, filter))
    }

    fn get_meditation(&self, id: i64) -> Result<MeditationItem, ClientError> {
        self.reachable()?;
        self.catalog
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound("Meditation not found".into()))
    }

    fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        self.reachable()?;
        Ok(Self::auth(&req.email, "User registered successfully"))
    }

    fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ClientError> {
        self.reachable()?;
        if req.password != "secret1" {
            return Err(ClientError::Validation("Invalid credentials".into()));
        }
        Ok(Self::auth(&req.email, "Login successful"))
    }

    fn get_preferences(&self, token: &str) -> Result<UserPreferences, ClientError> {
        self.check_token(token)?;
        Ok(self
            .prefs
            .borrow_mut()
            .get_or_insert_with(epoch_preferences)
            .clone())
    }

    fn update_preferences(
        &self,
        token: &str,
        update: &PreferencesUpdate,
    ) -> Result<UserPreferences, ClientError> {
        self.check_token(token)?;
        let mut prefs = self.prefs.borrow_mut();
        let prefs = prefs.get_or_insert_with(epoch_preferences);
        prefs.apply(update);
        Ok(prefs.clone())
    }

    fn reset_preferences(&self, token: &str) -> Result<MessageResponse, ClientError> {
        self.check_token(token)?;
        *self.prefs.borrow_mut() = Some(epoch_preferences());
        Ok(MessageResponse::new("Preferences reset to default"))
    }
}

#[derive(Default)]
pub(crate) struct RecordingNotifier {
    pub(crate) errors: Vec<String>,
    pub(crate) messages: Vec<String>,
    pub(crate) loading: Vec<bool>,
    pub(crate) pages: Vec<Page>,
}

impl Notifier for RecordingNotifier {
    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn show_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading.push(loading);
    }

    fn navigate(&mut self, page: Page) {
        self.pages.push(page);
    }
}

#[derive(Default)]
pub(crate) struct RecordingCatalogView {
    pub(crate) empty_state: bool,
    pub(crate) cards: Vec<Card>,
}

impl CatalogView for RecordingCatalogView {
    fn set_empty_state(&mut self, visible: bool) {
        self.empty_state = visible;
    }

    fn clear_grid(&mut self) {
        self.cards.clear();
    }

    fn show_cards(&mut self, cards: Vec<Card>) {
        self.cards = cards;
    }
}

#[derive(Default)]
pub(crate) struct RecordingPlayerView {
    pub(crate) visible: bool,
    pub(crate) title: String,
    pub(crate) play_glyph: Option<PlayGlyph>,
    pub(crate) volume_glyph: Option<VolumeGlyph>,
    pub(crate) volume_slider: u8,
    pub(crate) progress: f64,
    pub(crate) elapsed_label: String,
    pub(crate) duration_label: String,
}

impl PlayerView for RecordingPlayerView {
    fn set_modal_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn set_play_glyph(&mut self, glyph: PlayGlyph) {
        self.play_glyph = Some(glyph);
    }

    fn set_volume_glyph(&mut self, glyph: VolumeGlyph) {
        self.volume_glyph = Some(glyph);
    }

    fn set_volume_slider(&mut self, percent: u8) {
        self.volume_slider = percent;
    }

    fn set_progress(&mut self, percent: f64) {
        self.progress = percent;
    }

    fn set_elapsed_label(&mut self, label: &str) {
        self.elapsed_label = label.to_string();
    }

    fn set_duration_label(&mut self, label: &str) {
        self.duration_label = label.to_string();
    }
}

#[derive(Default)]
pub(crate) struct FakeAudio {
    pub(crate) source: Option<String>,
    pub(crate) playing: bool,
    pub(crate) current_time: f64,
    pub(crate) volume: f64,
}

impl AudioElement for FakeAudio {
    fn set_source(&mut self, uri: &str) {
        self.source = Some(uri.to_string());
    }

    fn play(&mut self) {
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.current_time = seconds;
    }

    fn set_volume(&mut self, gain: f64) {
        self.volume = gain;
    }
}

#[derive(Default)]
pub(crate) struct RecordingPrefsView {
    pub(crate) populated: Vec<UserPreferences>,
}

impl PreferencesView for RecordingPrefsView {
    fn populate(&mut self, prefs: &UserPreferences) {
        self.populated.push(prefs.clone());
    }
}
