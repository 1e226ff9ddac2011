//! Session countdown.
//!
//! The countdown itself holds no schedule; whoever owns the one-second
//! interval calls [`Countdown::tick`]. Expiry fires when the remaining time
//! reaches zero and never goes negative.

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    Remaining(u32),
    /// Reached zero on this tick. Reported once.
    Expired,
    /// The countdown already expired or was cancelled; the tick was ignored.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    running: bool,
}

impl Countdown {
    #[must_use]
    pub fn new(seconds: u32) -> Self {
        Self {
            remaining: seconds,
            running: seconds > 0,
        }
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tick(&mut self) -> CountdownTick {
        if !self.running {
            return CountdownTick::Cancelled;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
            return CountdownTick::Expired;
        }
        CountdownTick::Remaining(self.remaining)
    }

    pub fn cancel(&mut self) {
        self.running = false;
    }
}
