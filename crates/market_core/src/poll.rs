use std::time::Duration;

/// Termination thresholds of the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_polls: u32,
    pub stable_polls_required: u32,
    pub zero_result_timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_polls: 60,
            stable_polls_required: 3,
            zero_result_timeout: Duration::from_millis(30_000),
        }
    }
}

/// What one parse pass saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollObservation {
    pub visible_count: usize,
    pub loader_visible: bool,
    /// Records collected so far across all polls.
    pub collected: usize,
    /// Time since polling began.
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDecision {
    /// Scroll, wait, and poll again.
    Continue,
    /// Visible count stopped changing and the loader is gone.
    Stable,
    /// Nothing was ever collected within the timeout.
    ZeroResultTimeout,
    /// Hard iteration cap reached.
    IterationCap,
}

/// Stability counter and iteration bookkeeping for one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTracker {
    policy: PollPolicy,
    polls: u32,
    last_visible: Option<usize>,
    stable_count: u32,
}

impl PollTracker {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            polls: 0,
            last_visible: None,
            stable_count: 0,
        }
    }

    pub fn polls(&self) -> u32 {
        self.polls
    }

    pub fn stable_count(&self) -> u32 {
        self.stable_count
    }

    /// Feeds one poll and decides whether the loop goes on.
    pub fn observe(&mut self, observation: PollObservation) -> PollDecision {
        self.polls += 1;

        if self.last_visible == Some(observation.visible_count) {
            self.stable_count += 1;
        } else {
            self.stable_count = 0;
            self.last_visible = Some(observation.visible_count);
        }

        if self.stable_count >= self.policy.stable_polls_required && !observation.loader_visible {
            return PollDecision::Stable;
        }
        if observation.collected == 0 && observation.elapsed > self.policy.zero_result_timeout {
            return PollDecision::ZeroResultTimeout;
        }
        if self.polls >= self.policy.max_polls {
            return PollDecision::IterationCap;
        }
        PollDecision::Continue
    }
}
