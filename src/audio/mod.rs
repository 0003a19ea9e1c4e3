//! Audio system for sound cues
//!
//! Gameplay only names cues; playback goes through the `CuePlayer` trait.
//! `AudioManager` plays them with rodio, `CueLog` records them when there
//! is no output device.

mod cue;
mod manager;

pub use cue::{AudioCue, CueLog, CuePlayer};
pub use manager::{AudioError, AudioManager};
