//! Wall-clock pacing for a fixed-step simulation.
//!
//! The simulation always advances in whole steps of the same length. `Time`
//! measures real time between polls and tells the caller how many steps are due.

use std::time::{Duration, Instant};

/// Longest gap between polls that is honoured; anything above is dropped so a
/// stalled process does not replay a burst of catch-up steps.
const MAX_FRAME: Duration = Duration::from_millis(250);

#[derive(Debug)]
pub struct Time {
    last_poll: Instant,
    step: Duration,
    /// Real time not yet consumed by a step.
    accumulator: Duration,
    elapsed: Duration,
    steps: u64,
}

impl Time {
    /// Pace steps of `step_seconds` (at least 0.1 ms).
    pub fn new(step_seconds: f32) -> Self {
        Self {
            last_poll: Instant::now(),
            step: Duration::from_secs_f32(step_seconds.max(1e-4)),
            accumulator: Duration::ZERO,
            elapsed: Duration::ZERO,
            steps: 0,
        }
    }

    /// Sample the wall clock and return the number of steps now due.
    pub fn poll(&mut self) -> u32 {
        let now = Instant::now();
        let delta = now - self.last_poll;
        self.last_poll = now;
        self.advance(delta)
    }

    /// Feed an explicit delta (deterministic stepping) and return the steps due.
    pub fn advance(&mut self, delta: Duration) -> u32 {
        let delta = if delta > MAX_FRAME {
            log::debug!("Poll gap of {:?} clamped to {:?}", delta, MAX_FRAME);
            MAX_FRAME
        } else {
            delta
        };
        self.elapsed += delta;
        self.accumulator += delta;

        let mut due = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            due += 1;
        }
        self.steps += u64::from(due);
        due
    }

    /// Real time left before the next step falls due.
    pub fn until_next_step(&self) -> Duration {
        self.step.saturating_sub(self.accumulator)
    }

    pub fn step_seconds(&self) -> f32 {
        self.step.as_secs_f32()
    }

    /// Real time seen so far, after clamping.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Steps handed out since creation.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulator_yields_whole_steps() {
        let mut time = Time::new(0.0625);
        assert_eq!(time.advance(Duration::from_millis(200)), 3);
        assert_eq!(time.until_next_step(), Duration::from_millis(50));
        assert_eq!(time.advance(Duration::from_millis(50)), 1);
        assert_eq!(time.steps(), 4);
    }

    #[test]
    fn long_gaps_are_clamped() {
        let mut time = Time::new(0.0625);
        assert_eq!(time.advance(Duration::from_secs(5)), 4);
        assert!(time.elapsed_seconds() <= 0.25 + 1e-6);
    }
}
