/// Tick timing for the binding engine
///
/// Implements a fixed timestep driver. Each fixed tick gets a monotonic
/// timestamp that advances by exactly one timestep, so press durations are
/// measured in simulated time and a paused game does not age held presses.
use std::time::{Duration, Instant};

/// Target tick rate (60 ticks per second)
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;
const FIXED_TIMESTEP_DURATION: Duration = Duration::from_micros(16_667); // ~1/60 second

/// Maximum number of ticks per frame to prevent spiral of death
const MAX_TICKS_PER_FRAME: u32 = 5;

/// Fixed timestep tick timer
#[derive(Debug)]
pub struct TickTimer {
    /// Accumulated wall time not yet consumed by ticks
    accumulator: Duration,

    /// Wall time of the last frame
    last_frame_time: Instant,

    /// Timestamp handed to the most recent tick
    tick_time: Instant,

    /// Whether ticking is paused
    paused: bool,

    /// Current frame number
    frame_count: u64,

    /// Total ticks handed out
    tick_count: u64,
}

impl TickTimer {
    /// Create a new timer starting at `start`
    pub fn new(start: Instant) -> Self {
        Self {
            accumulator: Duration::ZERO,
            last_frame_time: start,
            tick_time: start,
            paused: false,
            frame_count: 0,
            tick_count: 0,
        }
    }

    /// Begin a new frame at wall time `now`, returns the number of fixed ticks to run
    pub fn begin_frame(&mut self, now: Instant) -> u32 {
        let frame_time = now.saturating_duration_since(self.last_frame_time);
        self.last_frame_time = now;
        self.frame_count += 1;

        if self.paused {
            return 0;
        }

        self.accumulator += frame_time;

        let mut ticks = 0;
        while self.accumulator >= FIXED_TIMESTEP_DURATION && ticks < MAX_TICKS_PER_FRAME {
            self.accumulator -= FIXED_TIMESTEP_DURATION;
            ticks += 1;
        }

        // Drop the backlog once capped, otherwise it keeps growing
        if ticks == MAX_TICKS_PER_FRAME {
            self.accumulator = Duration::ZERO;
        }

        ticks
    }

    /// Advance to the next fixed tick and return its timestamp
    pub fn step(&mut self) -> Instant {
        self.tick_count += 1;
        self.tick_time += FIXED_TIMESTEP_DURATION;
        self.tick_time
    }

    /// Timestamp of the most recent tick
    pub fn tick_time(&self) -> Instant {
        self.tick_time
    }

    /// Get the fixed timestep (in seconds)
    pub fn fixed_timestep(&self) -> f32 {
        FIXED_TIMESTEP
    }

    /// Get total number of frames begun
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get total number of ticks handed out
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Check if ticking is paused
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pause ticking
    pub fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            log::info!("Tick timer paused");
        }
    }

    /// Resume ticking
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            // Reset accumulator to prevent tick burst
            self.accumulator = Duration::ZERO;
            log::info!("Tick timer resumed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_creation() {
        let timer = TickTimer::new(Instant::now());
        assert_eq!(timer.frame_count(), 0);
        assert_eq!(timer.tick_count(), 0);
        assert!(!timer.is_paused());
    }

    #[test]
    fn test_fixed_timestep() {
        let timer = TickTimer::new(Instant::now());
        assert!((timer.fixed_timestep() - 1.0 / 60.0).abs() < 0.0001);
    }

    #[test]
    fn test_one_frame_worth_of_time() {
        let start = Instant::now();
        let mut timer = TickTimer::new(start);
        assert_eq!(timer.begin_frame(start + FIXED_TIMESTEP_DURATION), 1);
        assert_eq!(timer.frame_count(), 1);
    }

    #[test]
    fn test_short_frame_carries_over() {
        let start = Instant::now();
        let mut timer = TickTimer::new(start);
        let half = FIXED_TIMESTEP_DURATION / 2;

        assert_eq!(timer.begin_frame(start + half), 0);
        assert_eq!(timer.begin_frame(start + half * 2), 1);
    }

    #[test]
    fn test_max_ticks_limit() {
        let start = Instant::now();
        let mut timer = TickTimer::new(start);

        // 300ms would allow 18 ticks
        let ticks = timer.begin_frame(start + Duration::from_millis(300));
        assert_eq!(ticks, MAX_TICKS_PER_FRAME);

        // Backlog is dropped after the cap
        assert_eq!(timer.begin_frame(start + Duration::from_millis(301)), 0);
    }

    #[test]
    fn test_paused_no_ticks() {
        let start = Instant::now();
        let mut timer = TickTimer::new(start);
        timer.pause();

        assert_eq!(timer.begin_frame(start + Duration::from_millis(50)), 0);

        timer.resume();
        assert!(!timer.is_paused());
        assert_eq!(timer.begin_frame(start + Duration::from_millis(55)), 0);
    }

    #[test]
    fn test_step_advances_tick_time() {
        let start = Instant::now();
        let mut timer = TickTimer::new(start);

        let first = timer.step();
        let second = timer.step();

        assert_eq!(first - start, FIXED_TIMESTEP_DURATION);
        assert_eq!(second - first, FIXED_TIMESTEP_DURATION);
        assert_eq!(timer.tick_time(), second);
        assert_eq!(timer.tick_count(), 2);
    }
}
