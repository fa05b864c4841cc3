//! Player controller.
//!
//! Binds one [`AudioElement`] to the [`PlayerView`] widgets of the player
//! modal and keeps the progress bar and time readout in sync.

use meditation_types::MeditationItem;

use crate::view::{AudioElement, PlayGlyph, PlayerView, VolumeGlyph};

/// Gain restored by unmuting and applied on open.
pub const DEFAULT_VOLUME: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerPhase {
    Closed,
    Loaded,
    Playing,
    Paused,
    Ended,
}

/// Transport state for the open item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerState {
    pub position_secs: f64,
    pub duration_secs: f64,
    /// Gain in `0.0..=1.0`.
    pub volume: f64,
    pub muted: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            position_secs: 0.0,
            duration_secs: 0.0,
            volume: DEFAULT_VOLUME,
            muted: false,
        }
    }
}

/// Horizontal extent of the seek track, in the same units as click positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackRect {
    pub left: f64,
    pub width: f64,
}

/// Format seconds as `M:SS`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Fraction of the track left of `click_x`, clamped to `[0, 1]`.
pub fn seek_fraction(click_x: f64, track: TrackRect) -> f64 {
    if !(track.width > 0.0) || !click_x.is_finite() {
        return 0.0;
    }
    ((click_x - track.left) / track.width).clamp(0.0, 1.0)
}

pub struct PlayerController<A, V> {
    audio: A,
    view: V,
    phase: PlayerPhase,
    state: PlayerState,
}

impl<A: AudioElement, V: PlayerView> PlayerController<A, V> {
    pub fn new(audio: A, view: V) -> Self {
        Self {
            audio,
            view,
            phase: PlayerPhase::Closed,
            state: PlayerState::default(),
        }
    }

    pub fn phase(&self) -> PlayerPhase {
        self.phase
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Load `item` and show the modal. Any open item is closed first.
    pub fn open(&mut self, item: &MeditationItem) {
        if self.phase != PlayerPhase::Closed {
            self.close();
        }
        tracing::debug!(id = item.id, title = %item.title, "player open");
        self.state = PlayerState {
            position_secs: 0.0,
            duration_secs: f64::from(item.duration) * 60.0,
            volume: DEFAULT_VOLUME,
            muted: false,
        };
        self.audio.set_source(&item.audio_url);
        self.audio.set_current_time(0.0);
        self.audio.set_volume(DEFAULT_VOLUME);

        self.view.set_title(&item.title);
        self.view.set_duration_label(&format_time(self.state.duration_secs));
        self.view.set_elapsed_label(&format_time(0.0));
        self.view.set_progress(0.0);
        self.view.set_play_glyph(PlayGlyph::Play);
        self.view.set_volume_glyph(VolumeGlyph::Unmuted);
        self.view.set_volume_slider(volume_percent(DEFAULT_VOLUME));
        self.view.set_modal_visible(true);
        self.phase = PlayerPhase::Loaded;
    }

    pub fn toggle_play_pause(&mut self) {
        match self.phase {
            PlayerPhase::Loaded | PlayerPhase::Paused => {
                self.audio.play();
                self.view.set_play_glyph(PlayGlyph::Pause);
                self.phase = PlayerPhase::Playing;
            }
            PlayerPhase::Playing => {
                self.audio.pause();
                self.view.set_play_glyph(PlayGlyph::Play);
                self.phase = PlayerPhase::Paused;
            }
            PlayerPhase::Closed | PlayerPhase::Ended => {}
        }
    }

    /// Position report from the audio element.
    pub fn on_time_update(&mut self, position_secs: f64) {
        if !matches!(
            self.phase,
            PlayerPhase::Loaded | PlayerPhase::Playing | PlayerPhase::Paused
        ) {
            return;
        }
        self.state.position_secs = self.clamp_position(position_secs);
        self.refresh_progress();
    }

    /// Jump to the position under `click_x` on the seek track.
    ///
    /// Returns the new position, or `None` when nothing is open.
    pub fn seek(&mut self, click_x: f64, track: TrackRect) -> Option<f64> {
        if self.phase == PlayerPhase::Closed {
            return None;
        }
        let position = seek_fraction(click_x, track) * self.state.duration_secs;
        self.audio.set_current_time(position);
        self.state.position_secs = position;
        self.refresh_progress();
        Some(position)
    }

    /// Set gain from a `0..=100` slider value.
    pub fn set_volume(&mut self, percent: f64) {
        let percent = if percent.is_finite() {
            percent.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let gain = percent / 100.0;
        self.apply_volume(gain);
    }

    /// Mute, or unmute to the default gain. The pre-mute gain is not kept.
    pub fn toggle_mute(&mut self) {
        if self.state.volume > 0.0 {
            self.apply_volume(0.0);
        } else {
            self.apply_volume(DEFAULT_VOLUME);
        }
    }

    /// End-of-media notification from the audio element.
    pub fn on_ended(&mut self) {
        if self.phase != PlayerPhase::Playing {
            return;
        }
        self.view.set_play_glyph(PlayGlyph::Play);
        self.view.set_progress(0.0);
        self.view.set_elapsed_label(&format_time(0.0));
        self.phase = PlayerPhase::Ended;
    }

    pub fn close(&mut self) {
        if self.phase == PlayerPhase::Closed {
            return;
        }
        self.audio.pause();
        self.audio.set_current_time(0.0);
        self.state.position_secs = 0.0;
        self.view.set_play_glyph(PlayGlyph::Play);
        self.view.set_modal_visible(false);
        self.phase = PlayerPhase::Closed;
    }

    fn apply_volume(&mut self, gain: f64) {
        self.audio.set_volume(gain);
        self.state.volume = gain;
        self.state.muted = gain == 0.0;
        self.view.set_volume_slider(volume_percent(gain));
        self.view.set_volume_glyph(if self.state.muted {
            VolumeGlyph::Muted
        } else {
            VolumeGlyph::Unmuted
        });
    }

    fn clamp_position(&self, position: f64) -> f64 {
        if !position.is_finite() {
            return 0.0;
        }
        position.clamp(0.0, self.state.duration_secs)
    }

    fn refresh_progress(&mut self) {
        let percent = if self.state.duration_secs > 0.0 {
            (self.state.position_secs / self.state.duration_secs * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        self.view.set_progress(percent);
        self.view
            .set_elapsed_label(&format_time(self.state.position_secs));
    }
}

fn volume_percent(gain: f64) -> u8 {
    (gain * 100.0).round().clamp(0.0, 100.0) as u8
}
