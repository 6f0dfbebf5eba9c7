use std::time::{Duration, Instant};

const FPS_WINDOW: Duration = Duration::from_secs(1);

/// Timestamp handed to a stage each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Milliseconds since the clock started.
    pub time_ms: f64,
    /// Time since the previous tick.
    pub delta: Duration,
}

/// Per-frame clock for the animation loop.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    window_start: Instant,
    window_frames: u32,
    fps: f32,
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last: start,
            window_start: start,
            window_frames: 0,
            fps: 0.0,
            frames: 0,
        }
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advance to `now`. Instants earlier than the previous tick count as no time.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let delta = now.saturating_duration_since(self.last);
        self.last = self.last.max(now);
        self.frames += 1;
        self.window_frames += 1;

        let window = self.last.saturating_duration_since(self.window_start);
        if window >= FPS_WINDOW {
            self.fps = self.window_frames as f32 / window.as_secs_f32();
            self.window_frames = 0;
            self.window_start = self.last;
        }

        FrameTime {
            time_ms: self.last.saturating_duration_since(self.start).as_secs_f64() * 1000.0,
            delta,
        }
    }

    /// Frames per second over the last full second, 0 before one has elapsed.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_is_measured_from_start() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);

        let t = clock.tick_at(start + Duration::from_millis(16));
        assert!((t.time_ms - 16.0).abs() < 1e-6);
        assert_eq!(t.delta, Duration::from_millis(16));

        let t = clock.tick_at(start + Duration::from_millis(40));
        assert!((t.time_ms - 40.0).abs() < 1e-6);
        assert_eq!(t.delta, Duration::from_millis(24));
        assert_eq!(clock.frames(), 2);
    }

    #[test]
    fn fps_updates_after_one_second() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        for i in 1..=59 {
            clock.tick_at(start + Duration::from_micros(i * 16_667));
        }
        assert_eq!(clock.fps(), 0.0);

        clock.tick_at(start + Duration::from_millis(1000));
        assert!((clock.fps() - 60.0).abs() < 0.5);
    }

    #[test]
    fn stale_instant_does_not_go_backwards() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        clock.tick_at(start + Duration::from_millis(50));
        let t = clock.tick_at(start + Duration::from_millis(10));
        assert_eq!(t.delta, Duration::ZERO);
        assert!((t.time_ms - 50.0).abs() < 1e-6);
    }
}
