//! Traffic signal state machine
//!
//! A signal gates one node. Its phase only changes through
//! [`Signal::advance`], which the traffic controller drives.

use super::types::{NodeId, SignalId};

/// Current light shown by a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Green,
    Red,
}

impl Phase {
    fn flipped(self) -> Phase {
        match self {
            Phase::Green => Phase::Red,
            Phase::Red => Phase::Green,
        }
    }
}

/// A timed traffic light governing a node
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    id: SignalId,
    node: NodeId,
    phase: Phase,
    red_duration: f64,
    green_duration: f64,
    remaining: f64,
}

impl Signal {
    /// Remaining time always starts at the red duration, whatever the
    /// initial phase.
    pub fn new(
        id: SignalId,
        node: NodeId,
        initial_phase: Phase,
        red_duration: f64,
        green_duration: f64,
    ) -> Self {
        Self {
            id,
            node,
            phase: initial_phase,
            red_duration,
            green_duration,
            remaining: red_duration,
        }
    }

    pub fn id(&self) -> SignalId {
        self.id
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_red(&self) -> bool {
        self.phase == Phase::Red
    }

    pub fn red_duration(&self) -> f64 {
        self.red_duration
    }

    pub fn green_duration(&self) -> f64 {
        self.green_duration
    }

    /// Time left in the current phase
    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    fn duration_of(&self, phase: Phase) -> f64 {
        match phase {
            Phase::Green => self.green_duration,
            Phase::Red => self.red_duration,
        }
    }

    /// Count the current phase down by `delta`, returning every phase
    /// entered on the way in order.
    ///
    /// Time left over after a flip is charged to the next phase, so a long
    /// `delta` can cross several phases.
    pub(crate) fn advance(&mut self, delta: f64) -> Vec<Phase> {
        let mut entered = Vec::new();
        let cycle = self.red_duration + self.green_duration;
        self.remaining -= delta;
        if cycle > 0.0 && self.remaining < -cycle {
            // Whole cycles leave the phase where it was
            self.remaining %= cycle;
        }
        while self.remaining <= 0.0 {
            self.phase = self.phase.flipped();
            self.remaining += self.duration_of(self.phase);
            entered.push(self.phase);
            if cycle <= 0.0 {
                // No time in either phase: one flip per call
                self.remaining = 0.0;
                break;
            }
        }
        entered
    }
}
