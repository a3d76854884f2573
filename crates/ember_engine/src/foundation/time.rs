//! Time management utilities

use std::time::Instant;

/// Elapsed frame time in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Timestep(f32);

impl Timestep {
    /// Create a timestep from seconds
    pub const fn from_seconds(seconds: f32) -> Self {
        Self(seconds)
    }

    /// Time in seconds
    pub const fn seconds(self) -> f32 {
        self.0
    }

    /// Time in milliseconds
    pub fn milliseconds(self) -> f32 {
        self.0 * 1000.0
    }
}

impl From<f32> for Timestep {
    fn from(seconds: f32) -> Self {
        Self(seconds)
    }
}

/// Frame timer producing one [`Timestep`] per `tick`
pub struct Timer {
    last_frame: Instant,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Advance the timer, returning the time since the previous tick
    pub fn tick(&mut self) -> Timestep {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.total_time += delta;
        self.frame_count += 1;
        Timestep(delta)
    }

    /// Total elapsed time across all ticks
    pub const fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Number of ticks so far
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Average frames per second since creation
    #[allow(clippy::cast_precision_loss)]
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestep_units() {
        let ts = Timestep::from_seconds(0.016);
        assert!((ts.milliseconds() - 16.0).abs() < 1e-4);
        assert_eq!(Timestep::from(0.5).seconds(), 0.5);
    }

    #[test]
    fn test_timer_counts_frames() {
        let mut timer = Timer::new();
        let first = timer.tick();
        let second = timer.tick();
        assert!(first.seconds() >= 0.0 && second.seconds() >= 0.0);
        assert_eq!(timer.frame_count(), 2);
    }
}
