//! Audio manager backed by rodio

use std::fs;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use glam::Vec3;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, mixer::Mixer};
use rustc_hash::FxHashMap;

use super::cue::{AudioCue, CuePlayer};

/// Owns the output stream and the decoded-on-demand cue clips
pub struct AudioManager {
    /// The output stream (must be kept alive)
    _stream: OutputStream,
    /// The mixer for creating sinks
    mixer: Mixer,
    /// Encoded clip bytes per cue
    clips: FxHashMap<AudioCue, Arc<[u8]>>,
    /// Sinks of cues that are still playing
    voices: Vec<Sink>,
    /// Volume applied to every voice
    master_volume: f32,
}

impl AudioManager {
    /// Open the default output device
    ///
    /// # Errors
    ///
    /// Returns an error if no audio output device is available
    pub fn new() -> Result<Self, AudioError> {
        let stream = OutputStreamBuilder::from_default_device()
            .map_err(|_| AudioError::NoDevice)?
            .open_stream()
            .map_err(|_| AudioError::NoDevice)?;
        let mixer = stream.mixer().clone();

        Ok(Self {
            _stream: stream,
            mixer,
            clips: FxHashMap::default(),
            voices: Vec::new(),
            master_volume: 1.0,
        })
    }

    /// Load the clip for a cue from a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not decodable
    pub fn load(&mut self, cue: AudioCue, path: impl AsRef<Path>) -> Result<(), AudioError> {
        let bytes = fs::read(path).map_err(|e| AudioError::IoError(e.to_string()))?;
        self.load_bytes(cue, bytes.into())
    }

    /// Load the clip for a cue from memory
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a decodable audio stream
    pub fn load_bytes(&mut self, cue: AudioCue, bytes: Arc<[u8]>) -> Result<(), AudioError> {
        // Reject undecodable clips at load
        Decoder::new(Cursor::new(Arc::clone(&bytes)))
            .map_err(|e| AudioError::DecodeError(e.to_string()))?;
        self.clips.insert(cue, bytes);
        Ok(())
    }

    /// Load `<cue name>.wav|.ogg|.mp3` for every cue found in a directory.
    ///
    /// Returns the number of cues loaded; missing files are skipped.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> usize {
        let dir = dir.as_ref();
        let mut loaded = 0;
        for cue in AudioCue::ALL {
            let found = ["wav", "ogg", "mp3"]
                .iter()
                .map(|ext| dir.join(format!("{}.{ext}", cue.name())))
                .find(|p| p.is_file());
            let Some(path) = found else {
                log::debug!("No clip for cue '{}' in {}", cue.name(), dir.display());
                continue;
            };
            match self.load(cue, &path) {
                Ok(()) => loaded += 1,
                Err(e) => log::warn!("Failed to load {}: {e}", path.display()),
            }
        }
        loaded
    }

    /// Set the master volume, also for cues already playing
    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.max(0.0);
        for voice in &self.voices {
            voice.set_volume(self.master_volume);
        }
    }

    /// Drop sinks whose cue has finished
    pub fn cleanup_finished(&mut self) {
        self.voices.retain(|voice| !voice.empty());
    }
}

impl CuePlayer for AudioManager {
    fn play(&mut self, cue: AudioCue, _position: Option<Vec3>) {
        self.cleanup_finished();

        let Some(bytes) = self.clips.get(&cue) else {
            log::debug!("Cue '{}' has no clip, skipping", cue.name());
            return;
        };

        let source = match Decoder::new(Cursor::new(Arc::clone(bytes))) {
            Ok(source) => source,
            Err(e) => {
                log::warn!("Cue '{}' failed to decode: {e}", cue.name());
                return;
            }
        };

        let sink = Sink::connect_new(&self.mixer);
        sink.set_volume(self.master_volume);
        sink.append(source);
        self.voices.push(sink);
    }
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("clip_count", &self.clips.len())
            .field("active_voices", &self.voices.len())
            .field("master_volume", &self.master_volume)
            .finish()
    }
}

/// Errors that can occur during audio operations
#[derive(Debug, Clone)]
pub enum AudioError {
    /// IO error reading file
    IoError(String),
    /// Error decoding audio data
    DecodeError(String),
    /// No audio device available
    NoDevice,
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::DecodeError(e) => write!(f, "Decode error: {e}"),
            Self::NoDevice => write!(f, "No audio output device available"),
        }
    }
}

impl std::error::Error for AudioError {}
