//! Press-and-hold repeat state machine.
//!
//! The controller owns no timers. Every transition returns the effects the
//! host has to carry out (step the value, arm or cancel a timer, settle), so
//! the same machine runs against browser timers and a simulated clock.

use crate::options::RepeatTiming;
use crate::value::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatState {
    Idle,
    /// One step done, waiting for the delay timer to decide on repeating.
    ArmedSingleShot(Direction),
    Repeating(Direction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatEffect {
    Step(Direction),
    ArmDelay(u32),
    StartInterval(u32),
    CancelTimers,
    Settle,
}

#[derive(Debug, Clone)]
pub struct RepeatController {
    state: RepeatState,
    timing: RepeatTiming,
}

impl RepeatController {
    pub fn new(timing: RepeatTiming) -> Self {
        Self {
            state: RepeatState::Idle,
            timing,
        }
    }

    pub fn state(&self) -> RepeatState {
        self.state
    }

    pub fn timing(&self) -> RepeatTiming {
        self.timing
    }

    /// New timing applies from the next `start`; timers already armed keep
    /// their period.
    pub fn set_timing(&mut self, timing: RepeatTiming) {
        self.timing = timing;
    }

    /// Direction of the running gesture, if any.
    pub fn direction(&self) -> Option<Direction> {
        match self.state {
            RepeatState::Idle => None,
            RepeatState::ArmedSingleShot(direction) | RepeatState::Repeating(direction) => {
                Some(direction)
            }
        }
    }

    /// Whether a gesture is in progress (a timer is armed or running).
    pub fn is_active(&self) -> bool {
        self.state != RepeatState::Idle
    }

    /// Begin a hold gesture. Ignored while a gesture is already running, so
    /// key auto-repeat cannot stack timers.
    pub fn start(&mut self, direction: Direction) -> Vec<RepeatEffect> {
        if self.is_active() {
            return Vec::new();
        }
        log::debug!("repeat: start {}", direction.as_str());
        self.state = RepeatState::ArmedSingleShot(direction);
        vec![
            RepeatEffect::Step(direction),
            RepeatEffect::ArmDelay(self.timing.delay_ms),
        ]
    }

    /// The one-shot delay fired without a release in between.
    pub fn delay_elapsed(&mut self) -> Vec<RepeatEffect> {
        match self.state {
            RepeatState::ArmedSingleShot(direction) => {
                log::debug!("repeat: repeating {}", direction.as_str());
                self.state = RepeatState::Repeating(direction);
                vec![RepeatEffect::StartInterval(self.timing.interval_ms)]
            }
            _ => Vec::new(),
        }
    }

    pub fn tick(&mut self) -> Vec<RepeatEffect> {
        match self.state {
            RepeatState::Repeating(direction) => vec![RepeatEffect::Step(direction)],
            _ => Vec::new(),
        }
    }

    /// End the gesture. Settles exactly once; a second stop is a no-op.
    pub fn stop(&mut self) -> Vec<RepeatEffect> {
        if !self.is_active() {
            return Vec::new();
        }
        log::debug!("repeat: stop");
        self.state = RepeatState::Idle;
        vec![RepeatEffect::CancelTimers, RepeatEffect::Settle]
    }

    /// Drop any running gesture without settling. Used on teardown.
    pub fn cancel(&mut self) -> Vec<RepeatEffect> {
        if !self.is_active() {
            return Vec::new();
        }
        log::debug!("repeat: cancel");
        self.state = RepeatState::Idle;
        vec![RepeatEffect::CancelTimers]
    }
}

impl Default for RepeatController {
    fn default() -> Self {
        Self::new(RepeatTiming::default())
    }
}
