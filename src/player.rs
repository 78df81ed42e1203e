use crate::timer::{PlaybackTimer, sanitize_position};

/// The playback surface the session drives: reported time, duration,
/// transport and volume. Mirrors a host media element; callers never see
/// how (or whether) audio is actually decoded behind it.
pub trait MediaElement {
    fn current_time(&self) -> f64;
    fn duration(&self) -> f64;
    fn playing(&self) -> bool;
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, position: f64);
    fn volume(&self) -> f64;
    fn set_volume(&mut self, volume: f64);
}

/// Clock-driven media element: the position advances with wall time while
/// playing and freezes while paused. No decoding happens; the reported
/// position is the sole synchronization source.
#[derive(Debug, Default)]
pub struct LocalPlayer {
    timer: PlaybackTimer,
    playing: bool,
    duration: f64,
    volume: f64,
}

impl LocalPlayer {
    pub fn new(duration: f64, volume: f64) -> Self {
        let mut timer = PlaybackTimer::default();
        timer.reset(0.0);
        Self {
            timer,
            playing: false,
            duration: sanitize_position(duration),
            volume: clamp_volume(volume).unwrap_or(1.0),
        }
    }

    /// Map a 0-100 slider value linearly onto `0..duration`.
    pub fn seek_percent(&mut self, percent: f64) {
        let p = if percent.is_finite() { percent.clamp(0.0, 100.0) } else { 0.0 };
        self.seek(p / 100.0 * self.duration);
    }

    /// Seek by a signed offset from the current position.
    pub fn seek_relative(&mut self, delta: f64) {
        if delta.is_finite() {
            self.seek(self.current_time() + delta);
        }
    }

    fn clamp_to_duration(&self, position: f64) -> f64 {
        let p = sanitize_position(position);
        if self.duration > 0.0 { p.min(self.duration) } else { p }
    }
}

impl MediaElement for LocalPlayer {
    fn current_time(&self) -> f64 {
        self.clamp_to_duration(self.timer.estimate(self.playing))
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn playing(&self) -> bool {
        self.playing
    }

    fn play(&mut self) {
        if !self.playing {
            self.playing = true;
            self.timer.mark_playing();
        }
    }

    fn pause(&mut self) {
        if self.playing {
            // Freeze at the current estimate before dropping the clock.
            let pos = self.current_time();
            self.timer.set_position(pos);
            self.timer.mark_paused();
            self.playing = false;
        }
    }

    fn seek(&mut self, position: f64) {
        self.timer.set_position(self.clamp_to_duration(position));
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn set_volume(&mut self, volume: f64) {
        if let Some(v) = clamp_volume(volume) {
            self.volume = v;
        }
    }
}

fn clamp_volume(volume: f64) -> Option<f64> {
    volume.is_finite().then(|| volume.clamp(0.0, 1.0))
}
