mod artwork;
mod event;
mod lyrics;
mod player;
mod pool;
mod session;
mod sync;
mod text_utils;
mod timer;
mod ui;

use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration from CLI
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Config {
    /// Audio file; its name (extension stripped) is the track title and artwork query
    pub audio: PathBuf,
    /// Timestamped lyrics file (.lrc), optionally with <mm:ss.xx> word tags
    pub lyrics: PathBuf,
    /// Pipe newly active lyric lines to stdout (default is the full-screen UI)
    #[arg(long)]
    pub pipe: bool,
    /// Track duration as M:SS or plain seconds; estimated from the lyrics when omitted
    #[arg(long)]
    pub duration: Option<String>,
    /// Initial volume (0.0 - 1.0)
    #[arg(long, default_value_t = 1.0)]
    pub volume: f64,
    /// Highlight refresh rate while playing, frames per second
    #[arg(long, default_value_t = 60)]
    pub fps: u32,
    /// Disable karaoke highlighting (per-word). Use --no-karaoke to disable (default: enabled).
    #[arg(long = "no-karaoke")]
    pub no_karaoke: bool,
    /// Enable backend debug logging to stderr
    #[arg(long)]
    pub debug_log: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            audio: PathBuf::new(),
            lyrics: PathBuf::new(),
            pipe: false,
            duration: None,
            volume: 1.0,
            fps: 60,
            no_karaoke: false,
            debug_log: false,
        }
    }
}

impl Config {
    /// The --duration flag parsed as `M:SS` or plain seconds.
    pub fn parsed_duration(&self) -> Option<f64> {
        let raw = self.duration.as_deref()?.trim();
        if let Some((m, s)) = raw.split_once(':') {
            let minutes = m.parse::<u32>().ok()?;
            let seconds = s.parse::<f64>().ok()?;
            (seconds.is_finite() && seconds >= 0.0)
                .then(|| f64::from(minutes) * 60.0 + seconds)
        } else {
            raw.parse::<f64>()
                .ok()
                .filter(|d| d.is_finite() && *d >= 0.0)
        }
    }

    /// Period of the highlight refresh while playing.
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cfg = Config::parse();
    init_tracing(cfg.debug_log);

    let result = if cfg.pipe {
        ui::pipe::run(cfg.clone()).await
    } else {
        ui::modern::run(cfg.clone()).await
    };

    // Print error if any, for better diagnostics
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        return Err(e);
    }
    Ok(())
}

fn init_tracing(debug_log: bool) {
    let default = if debug_log { "karaplay=debug" } else { "karaplay=warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_duration_formats() {
        let mut cfg = Config::default();
        cfg.duration = Some("3:45".into());
        assert_eq!(cfg.parsed_duration(), Some(225.0));
        cfg.duration = Some("90".into());
        assert_eq!(cfg.parsed_duration(), Some(90.0));
        cfg.duration = Some("1:05.5".into());
        assert_eq!(cfg.parsed_duration(), Some(65.5));
        cfg.duration = Some("nonsense".into());
        assert_eq!(cfg.parsed_duration(), None);
        cfg.duration = None;
        assert_eq!(cfg.parsed_duration(), None);
    }

    #[test]
    fn test_frame_period() {
        let mut cfg = Config::default();
        assert_eq!(cfg.frame_period(), Duration::from_secs_f64(1.0 / 60.0));
        cfg.fps = 0;
        assert_eq!(cfg.frame_period(), Duration::from_secs(1));
    }
}
