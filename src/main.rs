//! Headless runner: loads a level and plays its scripted input

use std::env;
use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use stagship::core::MAX_FRAME_DELTA;
use stagship::prelude::*;

const DEFAULT_FRAMES: u64 = 300;
const DEFAULT_DT: f32 = 0.02;
const SOUND_DIR: &str = "assets/sounds";

#[derive(Debug)]
struct CliOptions {
    level: Option<PathBuf>,
    frames: Option<u64>,
    dt: f32,
    volume: f32,
}

#[derive(Debug)]
struct UsageError(String);

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\nusage: stagship [LEVEL_FILE] [--frames N] [--dt SECONDS] [--volume V]",
            self.0
        )
    }
}

impl Error for UsageError {}

/// Frame time in seconds, in `(0, MAX_FRAME_DELTA]`
fn parse_frame_time(value: &str) -> Result<f32, UsageError> {
    let dt: f32 = value
        .parse()
        .map_err(|_| UsageError(format!("bad frame time '{value}'")))?;
    if !dt.is_finite() || dt <= 0.0 || dt > MAX_FRAME_DELTA {
        return Err(UsageError(format!(
            "frame time must be in (0, {MAX_FRAME_DELTA}], got {value}"
        )));
    }
    Ok(dt)
}

impl CliOptions {
    fn parse() -> Result<Self, UsageError> {
        Self::parse_from(env::args().skip(1))
    }

    fn parse_from(args: impl IntoIterator<Item = String>) -> Result<Self, UsageError> {
        let mut options = Self {
            level: None,
            frames: None,
            dt: DEFAULT_DT,
            volume: 1.0,
        };

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--frames" => {
                    let value = args
                        .next()
                        .ok_or_else(|| UsageError("--frames needs a value".into()))?;
                    let frames = value
                        .parse()
                        .map_err(|_| UsageError(format!("bad frame count '{value}'")))?;
                    options.frames = Some(frames);
                }
                "--dt" => {
                    let value = args
                        .next()
                        .ok_or_else(|| UsageError("--dt needs a value".into()))?;
                    options.dt = parse_frame_time(&value)?;
                }
                "--volume" => {
                    let value = args
                        .next()
                        .ok_or_else(|| UsageError("--volume needs a value".into()))?;
                    options.volume = value
                        .parse::<f32>()
                        .ok()
                        .filter(|v| v.is_finite() && *v >= 0.0)
                        .ok_or_else(|| UsageError(format!("bad volume '{value}'")))?;
                }
                flag if flag.starts_with("--") => {
                    return Err(UsageError(format!("unknown option '{flag}'")));
                }
                path => {
                    if options.level.is_some() {
                        return Err(UsageError("only one level file may be given".into()));
                    }
                    options.level = Some(PathBuf::from(path));
                }
            }
        }
        Ok(options)
    }
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let options = CliOptions::parse()?;

    let scene = match &options.level {
        Some(path) => Scene::load(path)?,
        None => {
            log::info!("No level given, using the demo level");
            Scene::demo()
        }
    };
    let script = scene.script.clone();
    // Run a little past the last scripted input unless told otherwise
    let frames = options.frames.unwrap_or_else(|| {
        scene
            .script_end()
            .map_or(DEFAULT_FRAMES, |end| (end + 60).max(DEFAULT_FRAMES))
    });

    let config = EngineConfig::default().with_title(scene.name.clone());
    let mut engine = Engine::new(config, Level::new(scene));
    engine.context_mut().set_audio(audio_player(options.volume));

    engine.run_script(&script, frames, options.dt);
    engine.shutdown();

    let summary = engine.game().summary();
    println!("{summary}");
    Ok(())
}

/// rodio output when a device exists, otherwise a silent log
fn audio_player(volume: f32) -> Box<dyn CuePlayer> {
    match AudioManager::new() {
        Ok(mut manager) => {
            manager.set_master_volume(volume);
            let loaded = manager.load_dir(SOUND_DIR);
            log::info!("Loaded {loaded} sound clips from {SOUND_DIR}");
            Box::new(manager)
        }
        Err(err) => {
            log::warn!("{err}; sound cues will only be logged");
            Box::new(CueLog::new())
        }
    }
}
