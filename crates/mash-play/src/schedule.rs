//! Scheduled tasks owned by the match engine.
//!
//! Deadlines are stored as `Option<u64>` (milliseconds on the host clock);
//! `None` means the task is not armed. Arming always replaces the previous
//! deadline, so at most one instance of each task is live, and each arming
//! hands out a [`CancelToken`] that only cancels that instance.

/// Most overdue ticks a repeating task fires in one poll before it
/// re-anchors to the current time.
pub const MAX_CATCH_UP_TICKS: u32 = 4;

/// Identifies one arming of a task. A stale token never matches again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CancelToken(u64);

/// Fixed-period task (decay).
#[derive(Debug, Clone)]
pub struct RepeatingTask {
    period_ms: u64,
    next_due_ms: Option<u64>,
    generation: u64,
}

impl RepeatingTask {
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms: period_ms.max(1),
            next_due_ms: None,
            generation: 0,
        }
    }

    /// Cancel any live instance and start a new one; the first firing is one
    /// period after `now_ms`.
    pub fn arm(&mut self, now_ms: u64) -> CancelToken {
        self.generation += 1;
        self.next_due_ms = Some(now_ms + self.period_ms);
        CancelToken(self.generation)
    }

    fn cancel(&mut self) {
        self.next_due_ms = None;
    }

    /// Cancel only if `token` is the live instance.
    pub fn cancel_token(&mut self, token: CancelToken) -> bool {
        if self.is_armed() && token.0 == self.generation {
            self.cancel();
            true
        } else {
            false
        }
    }

    pub fn is_armed(&self) -> bool {
        self.next_due_ms.is_some()
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.next_due_ms
    }

    /// Number of firings due at `now_ms`, consuming them.
    pub fn take_due(&mut self, now_ms: u64) -> u32 {
        let Some(mut due) = self.next_due_ms else {
            return 0;
        };
        let mut fired = 0;
        while due <= now_ms && fired < MAX_CATCH_UP_TICKS {
            fired += 1;
            due += self.period_ms;
        }
        if due <= now_ms {
            due = now_ms + self.period_ms;
        }
        self.next_due_ms = Some(due);
        fired
    }
}

/// Single-shot delayed task (auto-restart).
#[derive(Debug, Clone)]
pub struct OneShotTask {
    delay_ms: u64,
    due_ms: Option<u64>,
    generation: u64,
}

impl OneShotTask {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            due_ms: None,
            generation: 0,
        }
    }

    /// Cancel any pending instance and schedule a new one.
    pub fn arm(&mut self, now_ms: u64) -> CancelToken {
        self.generation += 1;
        self.due_ms = Some(now_ms + self.delay_ms);
        CancelToken(self.generation)
    }

    fn cancel(&mut self) {
        self.due_ms = None;
    }

    pub fn cancel_token(&mut self, token: CancelToken) -> bool {
        if self.is_pending() && token.0 == self.generation {
            self.cancel();
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.due_ms.is_some()
    }

    pub fn due_ms(&self) -> Option<u64> {
        self.due_ms
    }

    /// Whether the task fires at `now_ms`; firing disarms it.
    pub fn take_due(&mut self, now_ms: u64) -> bool {
        match self.due_ms {
            Some(due) if due <= now_ms => {
                self.due_ms = None;
                true
            }
            _ => false,
        }
    }
}
