use std::time::Duration;

use crate::deck::Verdict;

/// Time for the card to fold shut (and again to open back up)
pub const FLIP_HALF: Duration = Duration::from_millis(300);

/// A pending answer reveal.
///
/// The card folds shut, flips to show the verdict, then sits for `delay`
/// before the shell moves on. Driven entirely by ticks so it can be tested
/// without a clock.
#[derive(Debug, Clone)]
pub struct Reveal {
    pub verdict: Verdict,
    elapsed: Duration,
    delay: Duration,
    fired: bool,
}

impl Reveal {
    pub fn new(verdict: Verdict, delay: Duration) -> Self {
        Self {
            verdict,
            elapsed: Duration::ZERO,
            delay,
            fired: false,
        }
    }

    /// Advance by `dt`. Returns true on the one tick where the reveal expires.
    pub fn on_tick(&mut self, dt: Duration) -> bool {
        if self.fired {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed >= FLIP_HALF + self.delay {
            self.fired = true;
            return true;
        }
        false
    }

    /// Whether the card has turned far enough to show the verdict
    pub fn is_face_up(&self) -> bool {
        self.elapsed >= FLIP_HALF
    }

    /// Card width as a fraction of full width, 1.0 outside the flip
    pub fn flip_factor(&self) -> f64 {
        let half = FLIP_HALF.as_secs_f64();
        let t = self.elapsed.as_secs_f64();
        if t < half {
            1.0 - t / half
        } else if t < 2.0 * half {
            (t - half) / half
        } else {
            1.0
        }
    }
}
