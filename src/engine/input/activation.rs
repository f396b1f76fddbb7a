// Activation state machine for digital-triggering bindings

use super::binding::{Behavior, Trigger, TriggerPress};
use std::time::{Duration, Instant};

/// Press phase of one binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActivationPhase {
    /// Not pressed
    #[default]
    Idle,
    /// Pressed, already fired on the press edge
    Held,
    /// Pressed, short press fires on release
    ShortWait,
    /// Held past the long-press threshold, short press abandoned
    ShortExpired,
    /// Pressed, waiting for the long-press threshold
    LongWait,
    /// Long press fired, waiting for release
    LongFired,
}

impl ActivationPhase {
    /// Check if the binding is physically pressed in this phase
    pub fn is_pressed(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Decides when one binding fires its action's callback
///
/// Fed the binding's digital level once per tick. Each qualifying edge fires
/// at most once; toggle behavior additionally flips a persistent on/off output
/// every time it fires.
#[derive(Debug, Clone)]
pub struct ActivationMachine {
    trigger: Trigger,
    phase: ActivationPhase,
    toggle_on: bool,
    press_start: Option<Instant>,
}

impl ActivationMachine {
    /// Create a machine in the neutral state
    pub fn new(trigger: Trigger) -> Self {
        Self {
            trigger,
            phase: ActivationPhase::Idle,
            toggle_on: false,
            press_start: None,
        }
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// Get the current phase
    pub fn phase(&self) -> ActivationPhase {
        self.phase
    }

    /// Check if the binding is physically pressed
    pub fn is_pressed(&self) -> bool {
        self.phase.is_pressed()
    }

    /// Toggle output, only meaningful for toggle behavior
    pub fn is_toggled_on(&self) -> bool {
        self.toggle_on
    }

    /// When the current press started
    pub fn press_start(&self) -> Option<Instant> {
        self.press_start
    }

    /// Advance one tick, returns true if the callback should fire
    pub fn update(&mut self, pressed: bool, now: Instant, long_press: Duration) -> bool {
        let mut fired = false;

        match (self.phase, pressed) {
            (ActivationPhase::Idle, true) => {
                self.press_start = Some(now);
                self.phase = match self.trigger.press {
                    TriggerPress::Immediate => {
                        fired = true;
                        ActivationPhase::Held
                    }
                    TriggerPress::Short => ActivationPhase::ShortWait,
                    TriggerPress::Long => ActivationPhase::LongWait,
                };
            }
            (ActivationPhase::Idle, false) => {}
            (phase, false) => {
                // Release
                if phase == ActivationPhase::ShortWait && self.held_for(now) < long_press {
                    fired = true;
                }
                self.phase = ActivationPhase::Idle;
                self.press_start = None;
            }
            (_, true) => {}
        }

        if pressed {
            let held = self.held_for(now);
            match self.phase {
                ActivationPhase::LongWait if held >= long_press => {
                    fired = true;
                    self.phase = ActivationPhase::LongFired;
                }
                ActivationPhase::ShortWait if held >= long_press => {
                    self.phase = ActivationPhase::ShortExpired;
                }
                _ => {}
            }
        }

        if fired && self.trigger.behavior == Behavior::Toggle {
            self.toggle_on = !self.toggle_on;
        }

        fired
    }

    /// Return to the neutral state (not pressed, toggle off)
    pub fn reset(&mut self) {
        self.phase = ActivationPhase::Idle;
        self.toggle_on = false;
        self.press_start = None;
    }

    fn held_for(&self, now: Instant) -> Duration {
        self.press_start
            .map_or(Duration::ZERO, |start| now.saturating_duration_since(start))
    }
}
