//! Ratatui catalog browser with the player modal.
//!
//! Keys:
//! - Up/Down: move selection
//! - Enter: open the player for the selected session
//! - c / d: cycle the category / duration filter
//! - r: reload the catalog
//! - q: quit
//!
//! Player:
//! - Space: play/pause
//! - Left/Right: seek 15s, or click the progress bar
//! - +/-: volume, m: mute
//! - Esc: close

mod app;
mod clock;
mod render;
mod view_model;
mod widgets;

pub(crate) use app::run_tui;
