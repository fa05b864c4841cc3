//! Clock-driven stand-in for an audio element.
//!
//! The terminal has no media output, so the browser tracks the transport
//! position of the bound source against wall time.

use std::time::Instant;

use meditation_client::view::AudioElement;

#[derive(Debug, Default)]
pub(crate) struct ClockAudio {
    source: Option<String>,
    base_secs: f64,
    started: Option<Instant>,
}

impl ClockAudio {
    /// Current transport position in seconds.
    pub(crate) fn position(&self) -> f64 {
        match self.started {
            Some(started) => self.base_secs + started.elapsed().as_secs_f64(),
            None => self.base_secs,
        }
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.started.is_some()
    }

    pub(crate) fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

impl AudioElement for ClockAudio {
    fn set_source(&mut self, uri: &str) {
        self.source = Some(uri.to_string());
        self.base_secs = 0.0;
        self.started = None;
    }

    fn play(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    fn pause(&mut self) {
        self.base_secs = self.position();
        self.started = None;
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.base_secs = seconds.max(0.0);
        if self.started.is_some() {
            self.started = Some(Instant::now());
        }
    }

    fn set_volume(&mut self, gain: f64) {
        tracing::trace!(gain, "volume");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paused_clock_holds_position() {
        let mut audio = ClockAudio::default();
        audio.set_source("https://example.com/bell.wav");
        audio.set_current_time(42.0);
        assert!(!audio.is_playing());
        assert_eq!(audio.position(), 42.0);
    }

    #[test]
    fn running_clock_advances_from_seek_point() {
        let mut audio = ClockAudio::default();
        audio.set_current_time(10.0);
        audio.play();
        assert!(audio.position() >= 10.0);
        audio.pause();
        let held = audio.position();
        assert!(held >= 10.0);
        assert_eq!(audio.position(), held);
    }

    #[test]
    fn new_source_rewinds() {
        let mut audio = ClockAudio::default();
        audio.set_current_time(99.0);
        audio.play();
        audio.set_source("https://example.com/other.wav");
        assert!(!audio.is_playing());
        assert_eq!(audio.position(), 0.0);
        assert_eq!(audio.source(), Some("https://example.com/other.wav"));
    }
}
