use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

use crate::controller::STAGE_DELAY;
use crate::error::{Result, TutorError};
use crate::task::{fixed_task, validate_fixed, Task, TaskRange};

const DEFAULT_CONFIG: &str = "numberline.toml";
const DEFAULT_TICK_MS: u64 = 16; // ~60 FPS
const DEFAULT_LOG_FILE: &str = "numberline.log";

#[derive(Parser, Debug, Default)]
#[command(name = "numberline", about = "Practise an addition on a number line")]
pub struct Args {
    /// Settings file (defaults to ./numberline.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Fixed first operand; needs --second
    #[arg(long, requires = "second")]
    pub first: Option<i32>,
    /// Fixed second operand; needs --first
    #[arg(long, requires = "first")]
    pub second: Option<i32>,
    /// Seed for the task generator
    #[arg(long)]
    pub seed: Option<u64>,
    /// Pause before each operand stage, in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,
    #[arg(long)]
    pub tick_ms: Option<u64>,
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    min_first: Option<i32>,
    max_first: Option<i32>,
    min_sum: Option<i32>,
    max_sum: Option<i32>,
    stage_delay_ms: Option<u64>,
    tick_rate_ms: Option<u64>,
    seed: Option<u64>,
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub range: TaskRange,
    pub fixed: Option<Task>,
    pub stage_delay: Duration,
    pub tick_rate: Duration,
    pub seed: Option<u64>,
    pub log_file: PathBuf,
    /// Settings file that was read, if any.
    pub source: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            range: TaskRange::default(),
            fixed: None,
            stage_delay: STAGE_DELAY,
            tick_rate: Duration::from_millis(DEFAULT_TICK_MS),
            seed: None,
            log_file: std::env::temp_dir().join(DEFAULT_LOG_FILE),
            source: None,
        }
    }
}

impl Settings {
    pub fn task(&self) -> Task {
        if let Some(task) = self.fixed {
            return task;
        }
        match self.seed {
            Some(seed) => Task::random(&mut StdRng::seed_from_u64(seed), &self.range),
            None => Task::random(&mut rand::thread_rng(), &self.range),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.range.validate()?;
        if let Some(task) = &self.fixed {
            validate_fixed(task)?;
        }
        if self.tick_rate.is_zero() {
            return Err(TutorError::invalid("tick rate must be positive"));
        }
        Ok(())
    }
}

/// Defaults, then the settings file, then `NUMBERLINE_*` variables, then
/// command-line flags. Runs before logging is up, so the file that was read
/// is kept in `Settings::source` for the caller to report.
pub fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = Settings::default();

    let path = args.config.as_deref().unwrap_or(Path::new(DEFAULT_CONFIG));
    match fs::read_to_string(path) {
        Ok(raw) => {
            apply_file(&mut settings, &raw)?;
            settings.source = Some(path.to_path_buf());
        }
        // Only an explicitly named file has to exist.
        Err(err) if args.config.is_some() => return Err(err.into()),
        Err(_) => {}
    }

    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    apply_args(&mut settings, args)?;
    settings.validate()?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> Result<()> {
    let file: SettingsFile = toml::from_str(raw)?;
    let range = &mut settings.range;
    if let Some(v) = file.min_first {
        range.min_first = v;
    }
    if let Some(v) = file.max_first {
        range.max_first = v;
    }
    if let Some(v) = file.min_sum {
        range.min_sum = v;
    }
    if let Some(v) = file.max_sum {
        range.max_sum = v;
    }
    if let Some(v) = file.stage_delay_ms {
        settings.stage_delay = Duration::from_millis(v);
    }
    if let Some(v) = file.tick_rate_ms {
        settings.tick_rate = Duration::from_millis(v);
    }
    if file.seed.is_some() {
        settings.seed = file.seed;
    }
    if let Some(v) = file.log_file {
        settings.log_file = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
    let number = |key: &str| -> Result<Option<u64>> {
        match lookup(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| TutorError::invalid(format!("{key}={raw} is not a number"))),
            None => Ok(None),
        }
    };

    if let Some(v) = number("NUMBERLINE_STAGE_DELAY_MS")? {
        settings.stage_delay = Duration::from_millis(v);
    }
    if let Some(v) = number("NUMBERLINE_TICK_RATE_MS")? {
        settings.tick_rate = Duration::from_millis(v);
    }
    if let Some(v) = number("NUMBERLINE_SEED")? {
        settings.seed = Some(v);
    }
    if let Some(v) = lookup("NUMBERLINE_LOG_FILE") {
        settings.log_file = PathBuf::from(v);
    }
    Ok(())
}

fn apply_args(settings: &mut Settings, args: &Args) -> Result<()> {
    if let (Some(a), Some(b)) = (args.first, args.second) {
        settings.fixed = Some(fixed_task(a, b)?);
    }
    if args.seed.is_some() {
        settings.seed = args.seed;
    }
    if let Some(v) = args.delay_ms {
        settings.stage_delay = Duration::from_millis(v);
    }
    if let Some(v) = args.tick_ms {
        settings.tick_rate = Duration::from_millis(v);
    }
    if let Some(v) = &args.log_file {
        settings.log_file = v.clone();
    }
    Ok(())
}
