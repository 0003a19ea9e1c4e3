//! Fire-and-forget sound cues

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A named one-shot sound the game asks the host to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AudioCue {
    /// Coin picked up
    Coin,
    /// Keycard picked up
    Keycard,
    /// Crystal picked up
    Crystal,
    /// Door opened or closed
    Door,
    /// Breakable box hit by a projectile
    BoxHit,
    /// Glass pane hit by a projectile
    GlassHit,
    /// Player fired a projectile
    Fire,
    /// Player jumped
    Jump,
    /// Hazard zone dealt damage
    Hazard,
}

impl AudioCue {
    /// Every cue, for preloading
    pub const ALL: [AudioCue; 9] = [
        AudioCue::Coin,
        AudioCue::Keycard,
        AudioCue::Crystal,
        AudioCue::Door,
        AudioCue::BoxHit,
        AudioCue::GlassHit,
        AudioCue::Fire,
        AudioCue::Jump,
        AudioCue::Hazard,
    ];

    /// Asset name used to look up the clip
    pub const fn name(self) -> &'static str {
        match self {
            AudioCue::Coin => "coin",
            AudioCue::Keycard => "keycard",
            AudioCue::Crystal => "crystal",
            AudioCue::Door => "door",
            AudioCue::BoxHit => "box_hit",
            AudioCue::GlassHit => "glass_hit",
            AudioCue::Fire => "fire",
            AudioCue::Jump => "jump",
            AudioCue::Hazard => "hazard",
        }
    }
}

/// Anything that can play cues.
///
/// Playback is fire-and-forget: a player that cannot play a cue drops it.
pub trait CuePlayer {
    /// Play a cue, optionally at a world position
    fn play(&mut self, cue: AudioCue, position: Option<Vec3>);
}

/// Cue player that only records what was requested.
///
/// Used when no output device is available and in tests.
#[derive(Debug, Default)]
pub struct CueLog {
    played: Vec<(AudioCue, Option<Vec3>)>,
}

impl CueLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cues played so far, oldest first
    pub fn played(&self) -> &[(AudioCue, Option<Vec3>)] {
        &self.played
    }

    /// How many times a cue was played
    pub fn count(&self, cue: AudioCue) -> usize {
        self.played.iter().filter(|(c, _)| *c == cue).count()
    }
}

impl CuePlayer for CueLog {
    fn play(&mut self, cue: AudioCue, position: Option<Vec3>) {
        log::trace!("cue {} at {:?}", cue.name(), position);
        self.played.push((cue, position));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_names_are_unique() {
        let mut names: Vec<_> = AudioCue::ALL.iter().map(|c| c.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), AudioCue::ALL.len());
    }

    #[test]
    fn test_cue_log_counts() {
        let mut log = CueLog::new();
        log.play(AudioCue::Door, None);
        log.play(AudioCue::Door, Some(Vec3::ONE));
        log.play(AudioCue::Jump, None);

        assert_eq!(log.count(AudioCue::Door), 2);
        assert_eq!(log.count(AudioCue::Jump), 1);
        assert_eq!(log.played().len(), 3);
    }
}
