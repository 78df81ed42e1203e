use std::time::Instant;

/// Wall-clock anchor for the playback position: a position in seconds plus
/// the monotonic instant it was observed at. While playing, the current
/// position is the anchor plus elapsed time; while paused, the anchor alone.
#[derive(Debug, PartialEq, Default)]
pub struct PlaybackTimer {
    anchor_position: f64,
    anchor_instant: Option<Instant>,
}

impl PlaybackTimer {
    /// Re-anchor at `position` with no running clock. Callers decide whether
    /// playback is running via `mark_playing`/`mark_paused`.
    pub fn reset(&mut self, position: f64) {
        self.anchor_position = sanitize_position(position);
        self.anchor_instant = None;
    }

    /// Record a freshly observed position and restart elapsed measurement
    /// from now, so sampling the estimate and writing it back never
    /// double-counts elapsed time.
    pub fn set_position(&mut self, position: f64) {
        self.anchor_position = sanitize_position(position);
        self.anchor_instant = Some(Instant::now());
    }

    /// Start or resume: elapsed time counts from this moment, so paused
    /// wall-clock time is never included.
    pub fn mark_playing(&mut self) {
        self.anchor_instant = Some(Instant::now());
    }

    /// Pause: clear the running clock so estimates return the anchor only.
    pub fn mark_paused(&mut self) {
        self.anchor_instant = None;
    }

    pub fn estimate(&self, playing: bool) -> f64 {
        let base = self.anchor_position;
        if !playing {
            return base;
        }
        match self.anchor_instant {
            Some(inst) => {
                let val = base + inst.elapsed().as_secs_f64();
                if val.is_finite() { val } else { base }
            }
            None => base,
        }
    }
}

/// Clamp a reported position to something meaningful: NaN, infinite and
/// negative values all become zero.
pub fn sanitize_position(p: f64) -> f64 {
    if !p.is_finite() || p < 0.0 { 0.0 } else { p }
}
