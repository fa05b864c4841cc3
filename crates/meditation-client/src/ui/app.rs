use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyCode, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect, widgets::ListState};

use meditation_client::auth;
use meditation_client::catalog::{CatalogController, FilterState};
use meditation_client::player::{PlayerController, PlayerPhase, TrackRect};
use meditation_client::server_api::MeditationApi;
use meditation_client::view::{AudioElement, Notifier, Page};
use meditation_client::SessionContext;

use super::clock::ClockAudio;
use super::render;
use super::view_model::{CatalogPanel, PlayerPanel, StatusLine};

const SEEK_STEP_SECS: f64 = 15.0;
const VOLUME_STEP: f64 = 10.0;

/// Launch the browser and drive the event loop until quit or logout.
pub(crate) fn run_tui(session: SessionContext, api: Box<dyn MeditationApi>) -> Result<()> {
    let mut app = App::new(session, api);
    if !auth::guard(&app.session, &mut app.status, Page::Meditation) {
        anyhow::bail!("not signed in; run `meditation-cli login` first");
    }
    app.reload();

    let mut term = init_terminal()?;
    let result = ui_loop(&mut term, &mut app);
    restore_terminal(&mut term)?;
    result?;

    if app.status.login_required {
        anyhow::bail!("{}", app.status.text);
    }
    Ok(())
}

/// In-memory UI state for rendering + interaction.
pub(crate) struct App {
    pub(crate) session: SessionContext,
    api: Box<dyn MeditationApi>,
    pub(crate) catalog: CatalogController<CatalogPanel>,
    pub(crate) player: PlayerController<ClockAudio, PlayerPanel>,
    pub(crate) status: StatusLine,
    pub(crate) list_state: ListState,
    categories: Vec<String>,
    durations: Vec<u32>,
    category_idx: usize,
    duration_idx: usize,
    /// Screen area of the progress bar, recorded by the last draw.
    pub(crate) track_area: Option<Rect>,
}

impl App {
    fn new(session: SessionContext, api: Box<dyn MeditationApi>) -> Self {
        Self {
            session,
            api,
            catalog: CatalogController::new(CatalogPanel::default()),
            player: PlayerController::new(ClockAudio::default(), PlayerPanel::default()),
            status: StatusLine::default(),
            list_state: ListState::default(),
            categories: Vec::new(),
            durations: Vec::new(),
            category_idx: 0,
            duration_idx: 0,
            track_area: None,
        }
    }

    fn reload(&mut self) {
        let loaded = self
            .catalog
            .load(&mut self.session, self.api.as_ref(), &mut self.status);
        if let Ok(count) = loaded {
            self.rebuild_filter_choices();
            self.status.show_message(&format!("{count} sessions"));
        }
        self.clamp_selection();
    }

    fn rebuild_filter_choices(&mut self) {
        self.categories.clear();
        self.durations.clear();
        for item in self.session.catalog() {
            if !self.categories.contains(&item.category) {
                self.categories.push(item.category.clone());
            }
            if !self.durations.contains(&item.duration) {
                self.durations.push(item.duration);
            }
        }
        self.durations.sort_unstable();
        self.category_idx = self.category_idx.min(self.categories.len());
        self.duration_idx = self.duration_idx.min(self.durations.len());
    }

    /// Filter built from the cycling indexes; index 0 means "all".
    pub(crate) fn current_filter(&self) -> FilterState {
        FilterState {
            category: self
                .category_idx
                .checked_sub(1)
                .and_then(|idx| self.categories.get(idx).cloned()),
            duration: self
                .duration_idx
                .checked_sub(1)
                .and_then(|idx| self.durations.get(idx).copied()),
        }
    }

    fn cycle_category(&mut self) {
        self.category_idx = (self.category_idx + 1) % (self.categories.len() + 1);
        self.apply_filter();
    }

    fn cycle_duration(&mut self) {
        self.duration_idx = (self.duration_idx + 1) % (self.durations.len() + 1);
        self.apply_filter();
    }

    fn apply_filter(&mut self) {
        let filter = self.current_filter();
        self.catalog.on_filter_change(&self.session, filter);
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.catalog.view().cards.len();
        match (len, self.list_state.selected()) {
            (0, _) => self.list_state.select(None),
            (_, None) => self.list_state.select(Some(0)),
            (len, Some(idx)) if idx >= len => self.list_state.select(Some(len - 1)),
            _ => {}
        }
    }

    fn select_next(&mut self) {
        let len = self.catalog.view().cards.len();
        if len == 0 {
            return;
        }
        let next = self.list_state.selected().map_or(0, |idx| (idx + 1).min(len - 1));
        self.list_state.select(Some(next));
    }

    fn select_prev(&mut self) {
        let prev = self
            .list_state
            .selected()
            .map_or(0, |idx| idx.saturating_sub(1));
        if !self.catalog.view().cards.is_empty() {
            self.list_state.select(Some(prev));
        }
    }

    fn open_selected(&mut self) {
        let Some(id) = self
            .list_state
            .selected()
            .and_then(|idx| self.catalog.view().cards.get(idx))
            .map(|card| card.id)
        else {
            return;
        };
        if let Some(item) = self.catalog.select(&self.session, id) {
            self.player.open(item);
        }
    }

    fn seek_by(&mut self, delta_secs: f64) {
        let state = *self.player.state();
        let track = TrackRect {
            left: 0.0,
            width: state.duration_secs,
        };
        self.player.seek(state.position_secs + delta_secs, track);
    }

    fn nudge_volume(&mut self, delta: f64) {
        let percent = self.player.state().volume * 100.0 + delta;
        self.player.set_volume(percent);
    }

    /// Feed clock progress into the player, like `timeupdate`/`ended` events.
    pub(crate) fn sync_clock(&mut self) {
        if self.player.phase() != PlayerPhase::Playing || !self.player.audio().is_playing() {
            return;
        }
        let position = self.player.audio().position();
        if position >= self.player.state().duration_secs {
            self.player.audio_mut().pause();
            self.player.on_ended();
        } else {
            self.player.on_time_update(position);
        }
    }

    /// Seek when a left click lands on the progress bar.
    pub(crate) fn handle_click(&mut self, column: u16, row: u16) {
        let Some(area) = self.track_area else {
            return;
        };
        if !self.player.view().visible || row != area.y {
            return;
        }
        if column < area.x || column >= area.x + area.width {
            return;
        }
        let track = TrackRect {
            left: f64::from(area.x),
            width: f64::from(area.width),
        };
        self.player.seek(f64::from(column), track);
    }

    /// Apply one key press. Returns true when the browser should exit.
    pub(crate) fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.player.view().visible {
            match code {
                KeyCode::Char(' ') => self.player.toggle_play_pause(),
                KeyCode::Left => self.seek_by(-SEEK_STEP_SECS),
                KeyCode::Right => self.seek_by(SEEK_STEP_SECS),
                KeyCode::Char('+') | KeyCode::Char('=') => self.nudge_volume(VOLUME_STEP),
                KeyCode::Char('-') => self.nudge_volume(-VOLUME_STEP),
                KeyCode::Char('m') => self.player.toggle_mute(),
                KeyCode::Esc => self.player.close(),
                KeyCode::Char('q') => {
                    self.player.close();
                    return true;
                }
                _ => {}
            }
            return false;
        }
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.select_prev(),
            KeyCode::Down => self.select_next(),
            KeyCode::Enter => self.open_selected(),
            KeyCode::Char('c') => self.cycle_category(),
            KeyCode::Char('d') => self.cycle_duration(),
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        self.status.login_required
    }
}

fn ui_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let tick = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        app.sync_clock();
        terminal.draw(|f| render::draw(f, app))?;

        let timeout = tick.saturating_sub(last_tick.elapsed());
        if event::poll(timeout).context("poll terminal events")? {
            match event::read().context("read terminal event")? {
                CEvent::Key(k) if k.kind == KeyEventKind::Press => {
                    if app.handle_key(k.code) {
                        return Ok(());
                    }
                }
                CEvent::Mouse(MouseEvent {
                    kind: MouseEventKind::Down(MouseButton::Left),
                    column,
                    row,
                    ..
                }) => app.handle_click(column, row),
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick {
            last_tick = Instant::now();
        }
    }
}

fn init_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("create terminal")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture).ok();
    terminal.show_cursor().ok();
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use meditation_client::error::ClientError;
    use meditation_client::token_store::MemoryTokenStore;
    use meditation_types::{
        AuthResponse, LoginRequest, MeditationItem, MessageResponse, PreferencesUpdate,
        RegisterRequest, UserPreferences,
    };

    struct CatalogOnly(Vec<MeditationItem>);

    impl MeditationApi for CatalogOnly {
        fn list_meditations(&self, _: &FilterState) -> Result<Vec<MeditationItem>, ClientError> {
            Ok(self.0.clone())
        }
        fn get_meditation(&self, _: i64) -> Result<MeditationItem, ClientError> {
            Err(ClientError::NotFound("Meditation not found".into()))
        }
        fn register(&self, _: &RegisterRequest) -> Result<AuthResponse, ClientError> {
            Err(ClientError::Network("offline".into()))
        }
        fn login(&self, _: &LoginRequest) -> Result<AuthResponse, ClientError> {
            Err(ClientError::Network("offline".into()))
        }
        fn get_preferences(&self, _: &str) -> Result<UserPreferences, ClientError> {
            Err(ClientError::Auth)
        }
        fn update_preferences(
            &self,
            _: &str,
            _: &PreferencesUpdate,
        ) -> Result<UserPreferences, ClientError> {
            Err(ClientError::Auth)
        }
        fn reset_preferences(&self, _: &str) -> Result<MessageResponse, ClientError> {
            Err(ClientError::Auth)
        }
    }

    fn item(id: i64, category: &str, minutes: u32) -> MeditationItem {
        MeditationItem {
            id,
            title: format!("{category} {id}"),
            description: String::new(),
            category: category.to_string(),
            duration: minutes,
            audio_url: format!("https://example.com/{id}.wav"),
        }
    }

    pub(crate) fn loaded_app() -> App {
        let session = SessionContext::init(
            "http://localhost:3006",
            Box::new(MemoryTokenStore::with_token("t")),
        );
        let api = CatalogOnly(vec![
            item(1, "Breathing", 10),
            item(2, "Body Scan", 15),
            item(3, "Breathing", 15),
        ]);
        let mut app = App::new(session, Box::new(api));
        app.reload();
        app
    }

    #[test]
    fn reload_reports_session_count_in_status() {
        let app = loaded_app();
        assert_eq!(app.status.text, "3 sessions");
        assert!(!app.status.is_error);
        assert!(!app.status.loading);
        assert!(!app.status.login_required);
    }

    #[test]
    fn filter_keys_cycle_through_catalog_values() {
        let mut app = loaded_app();
        assert_eq!(app.catalog.view().cards.len(), 3);
        assert_eq!(app.list_state.selected(), Some(0));

        app.handle_key(KeyCode::Char('c'));
        assert_eq!(app.current_filter().category.as_deref(), Some("Breathing"));
        assert_eq!(app.catalog.view().cards.len(), 2);

        app.handle_key(KeyCode::Char('d'));
        app.handle_key(KeyCode::Char('d'));
        assert_eq!(app.current_filter().duration, Some(15));
        let ids: Vec<i64> = app.catalog.view().cards.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3]);

        app.handle_key(KeyCode::Char('c'));
        app.handle_key(KeyCode::Char('c'));
        assert_eq!(app.current_filter().category, None);
    }

    #[test]
    fn enter_opens_player_and_keys_drive_transport() {
        let mut app = loaded_app();
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Enter);
        assert!(app.player.view().visible);
        assert_eq!(app.player.view().title, "Body Scan 2");
        assert_eq!(app.player.view().duration, "15:00");

        app.handle_key(KeyCode::Right);
        assert!((app.player.state().position_secs - 15.0).abs() < 1e-9);
        app.handle_key(KeyCode::Left);
        app.handle_key(KeyCode::Left);
        assert_eq!(app.player.state().position_secs, 0.0);

        app.handle_key(KeyCode::Char('m'));
        assert_eq!(app.player.state().volume, 0.0);
        app.handle_key(KeyCode::Char('m'));
        assert_eq!(app.player.state().volume, 0.5);

        app.handle_key(KeyCode::Char(' '));
        assert_eq!(app.player.phase(), PlayerPhase::Playing);
        assert!(app.player.audio().is_playing());

        assert!(!app.handle_key(KeyCode::Esc));
        assert_eq!(app.player.phase(), PlayerPhase::Closed);
        assert!(!app.player.view().visible);
    }

    #[test]
    fn clicks_on_progress_bar_seek() {
        let mut app = loaded_app();
        app.handle_key(KeyCode::Enter);
        app.track_area = Some(Rect::new(10, 5, 40, 1));

        app.handle_click(30, 5);
        assert_eq!(app.player.state().position_secs, 300.0);
        assert_eq!(app.player.view().elapsed, "5:00");

        app.handle_click(30, 6);
        assert_eq!(app.player.state().position_secs, 300.0);
    }

    #[test]
    fn clock_reaching_the_end_fires_ended() {
        let mut app = loaded_app();
        app.handle_key(KeyCode::Enter);
        app.handle_key(KeyCode::Char(' '));
        app.player.audio_mut().set_current_time(600.0);

        app.sync_clock();

        assert_eq!(app.player.phase(), PlayerPhase::Ended);
        assert_eq!(app.player.view().elapsed, "0:00");
        assert!(!app.player.audio().is_playing());
    }
}
