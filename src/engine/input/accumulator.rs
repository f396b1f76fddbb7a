// Persistent state for accumulating (virtual knob) axes

use std::collections::HashMap;

/// Identifies one binding of one action in the installed layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingKey {
    pub action: usize,
    pub binding: usize,
}

impl BindingKey {
    pub fn new(action: usize, binding: usize) -> Self {
        Self { action, binding }
    }
}

#[derive(Debug, Clone, Copy)]
struct Knob {
    value: f32,
    min: f32,
    max: f32,
}

/// One clamped float per accumulating binding
///
/// Values only change through [`AccumulatorStore::update`]; reads never reset
/// them. Call `update` at most once per binding per tick.
#[derive(Debug, Default)]
pub struct AccumulatorStore {
    knobs: HashMap<BindingKey, Knob>,
}

impl AccumulatorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)create a knob at 0 with the given bounds
    pub fn insert(&mut self, key: BindingKey, min: f32, max: f32) {
        let value = 0.0_f32.clamp(min, max);
        self.knobs.insert(key, Knob { value, min, max });
    }

    /// Apply a delta, clamp to bounds, store and return the new value
    ///
    /// Returns `None` for keys that were never inserted.
    pub fn update(&mut self, key: BindingKey, delta: f32) -> Option<f32> {
        let knob = self.knobs.get_mut(&key)?;
        if delta.is_finite() {
            knob.value = (knob.value + delta).clamp(knob.min, knob.max);
        }
        Some(knob.value)
    }

    /// Current value without modifying it
    pub fn get(&self, key: BindingKey) -> Option<f32> {
        self.knobs.get(&key).map(|knob| knob.value)
    }

    pub fn len(&self) -> usize {
        self.knobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.knobs.is_empty()
    }

    /// Drop every knob
    pub fn clear(&mut self) {
        self.knobs.clear();
    }
}
