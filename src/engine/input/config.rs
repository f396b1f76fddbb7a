// Engine configuration and action layout resolution

use super::action::{ActionId, ActionName};
use super::binding::Binding;
use super::source::PhysicalSource;
use super::{InputError, InputResult};
use std::collections::HashMap;
use std::time::Duration;

/// Default hold time before a long press fires
pub const DEFAULT_LONG_PRESS: Duration = Duration::from_millis(500);

/// Tuning shared by every binding the engine evaluates
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Hold time at which a long press fires (and a short press is abandoned)
    pub long_press_threshold: Duration,

    /// Level at which a button sample or a digital-mode axis counts as pressed
    pub digital_threshold: f32,

    /// Deadzone applied to instantaneous analog samples
    pub axis_deadzone: f32,

    /// Clamp bounds for accumulating axes
    pub accumulator_range: (f32, f32),

    /// Scale applied to each accumulated delta
    pub accumulator_scale: f32,
}

impl EngineConfig {
    pub fn with_long_press_threshold(mut self, threshold: Duration) -> Self {
        self.long_press_threshold = threshold;
        self
    }

    pub fn with_digital_threshold(mut self, threshold: f32) -> Self {
        self.digital_threshold = threshold;
        self
    }

    pub fn with_axis_deadzone(mut self, deadzone: f32) -> Self {
        self.axis_deadzone = deadzone;
        self
    }

    pub fn with_accumulator_range(mut self, min: f32, max: f32) -> Self {
        self.accumulator_range = (min, max);
        self
    }

    pub fn with_accumulator_scale(mut self, scale: f32) -> Self {
        self.accumulator_scale = scale;
        self
    }

    /// Check that every value is usable
    pub fn validate(&self) -> InputResult<()> {
        let (min, max) = self.accumulator_range;
        if !(min.is_finite() && max.is_finite()) || min > max {
            return Err(InputError::InvalidConfig(format!(
                "accumulator range [{min}, {max}]"
            )));
        }
        if !(self.digital_threshold > 0.0 && self.digital_threshold <= 1.0) {
            return Err(InputError::InvalidConfig(format!(
                "digital threshold {}",
                self.digital_threshold
            )));
        }
        if !(self.axis_deadzone >= 0.0 && self.axis_deadzone < 1.0) {
            return Err(InputError::InvalidConfig(format!(
                "axis deadzone {}",
                self.axis_deadzone
            )));
        }
        if !self.accumulator_scale.is_finite() {
            return Err(InputError::InvalidConfig(format!(
                "accumulator scale {}",
                self.accumulator_scale
            )));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            long_press_threshold: DEFAULT_LONG_PRESS,
            digital_threshold: 0.5,
            axis_deadzone: 0.0,
            accumulator_range: (-1.0, 1.0),
            accumulator_scale: 1.0,
        }
    }
}

/// Whether the engine claims an action's physical sources from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConsumePolicy {
    /// Sources always pass through to the host
    #[default]
    Never,
    /// Sources are always consumed
    Always,
    /// Sources are consumed while a plugin blocks the action
    Manual,
}

/// One resolved action: name, consume policy and ordered bindings
#[derive(Debug, Clone)]
pub struct ActionEntry {
    name: ActionName,
    policy: ConsumePolicy,
    bindings: Vec<Binding>,
}

impl ActionEntry {
    pub fn name(&self) -> &ActionName {
        &self.name
    }

    pub fn consume_policy(&self) -> ConsumePolicy {
        self.policy
    }

    /// Bindings in index order
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Every physical source any binding of this action reads
    pub fn sources(&self) -> Vec<PhysicalSource> {
        let mut sources = Vec::new();
        for source in self.bindings.iter().flat_map(|b| b.sources()) {
            if !sources.contains(source) {
                sources.push(*source);
            }
        }
        sources
    }
}

/// Finalized action -> bindings mapping the engine runs against
///
/// Immutable: binding indices stay dense and stable for as long as the layout
/// is installed.
#[derive(Debug, Clone, Default)]
pub struct ActionLayout {
    actions: Vec<ActionEntry>,
    by_name: HashMap<String, ActionId>,
}

impl ActionLayout {
    /// Layout with no actions
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up an action by its full name
    pub fn lookup(&self, full_name: &str) -> Option<ActionId> {
        self.by_name.get(full_name).copied()
    }

    pub fn action(&self, id: ActionId) -> Option<&ActionEntry> {
        self.actions.get(id.0)
    }

    /// Look up an action entry by its full name
    pub fn get(&self, full_name: &str) -> Option<&ActionEntry> {
        self.lookup(full_name).and_then(|id| self.action(id))
    }

    /// All actions in definition order
    pub fn iter(&self) -> impl Iterator<Item = (ActionId, &ActionEntry)> {
        self.actions
            .iter()
            .enumerate()
            .map(|(i, entry)| (ActionId(i), entry))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Number of bindings, 0 for unknown actions
    pub fn binding_count(&self, full_name: &str) -> usize {
        self.get(full_name).map_or(0, |entry| entry.bindings.len())
    }

    /// Binding at `index`, `None` for unknown actions or out-of-range indices
    pub fn binding(&self, full_name: &str, index: usize) -> Option<&Binding> {
        self.get(full_name).and_then(|entry| entry.bindings.get(index))
    }

    /// Actions with at least one binding reading `source`
    pub fn actions_for_source(&self, source: PhysicalSource) -> Vec<ActionId> {
        self.iter()
            .filter(|(_, entry)| {
                entry
                    .bindings
                    .iter()
                    .any(|binding| binding.sources().contains(&source))
            })
            .map(|(id, _)| id)
            .collect()
    }
}

/// Resolves configuration into an [`ActionLayout`]
///
/// Once finalized, every further change is rejected.
#[derive(Debug, Default)]
pub struct LayoutBuilder {
    layout: ActionLayout,
    finalized: bool,
}

impl LayoutBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a new action with no bindings
    pub fn define_action(
        &mut self,
        group: &str,
        name: &str,
        policy: ConsumePolicy,
    ) -> InputResult<ActionName> {
        self.ensure_open()?;
        let name = ActionName::new(group, name)?;
        if self.layout.by_name.contains_key(name.as_str()) {
            return Err(InputError::DuplicateAction(name.to_string()));
        }

        let id = ActionId(self.layout.actions.len());
        self.layout.by_name.insert(name.to_string(), id);
        self.layout.actions.push(ActionEntry {
            name: name.clone(),
            policy,
            bindings: Vec::new(),
        });
        Ok(name)
    }

    /// Append a binding, returns its index
    pub fn add_binding(&mut self, action: &ActionName, binding: Binding) -> InputResult<usize> {
        let entry = self.entry_mut(action)?;
        entry.bindings.push(binding);
        Ok(entry.bindings.len() - 1)
    }

    /// Change the consume policy of an already defined action
    pub fn set_consume_policy(
        &mut self,
        action: &ActionName,
        policy: ConsumePolicy,
    ) -> InputResult<()> {
        self.entry_mut(action)?.policy = policy;
        Ok(())
    }

    /// Check whether the builder still accepts changes
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Close the builder and hand out the resolved layout
    pub fn finalize(&mut self) -> InputResult<ActionLayout> {
        self.ensure_open()?;
        self.finalized = true;
        log::debug!("Layout finalized with {} actions", self.layout.len());
        Ok(std::mem::take(&mut self.layout))
    }

    fn ensure_open(&self) -> InputResult<()> {
        if self.finalized {
            log::warn!("Rejected layout change after finalization");
            return Err(InputError::LayoutFinalized);
        }
        Ok(())
    }

    fn entry_mut(&mut self, action: &ActionName) -> InputResult<&mut ActionEntry> {
        self.ensure_open()?;
        let id = self
            .layout
            .lookup(action.as_str())
            .ok_or_else(|| InputError::UnknownAction(action.to_string()))?;
        Ok(&mut self.layout.actions[id.0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::binding::{Side, Trigger};
    use winit::keyboard::KeyCode;

    fn key(code: KeyCode) -> Binding {
        Binding::button(PhysicalSource::key(code), Trigger::on_press()).unwrap()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.long_press_threshold, Duration::from_millis(500));
        assert_eq!(config.accumulator_range, (-1.0, 1.0));
    }

    #[test]
    fn test_config_rejects_inverted_range() {
        let config = EngineConfig::default().with_accumulator_range(1.0, -1.0);
        assert!(matches!(
            config.validate(),
            Err(InputError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_rejects_bad_threshold_and_deadzone() {
        assert!(EngineConfig::default()
            .with_digital_threshold(0.0)
            .validate()
            .is_err());
        assert!(EngineConfig::default()
            .with_axis_deadzone(1.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_define_and_bind() {
        let mut builder = LayoutBuilder::new();
        let jump = builder
            .define_action("player", "jump", ConsumePolicy::Never)
            .unwrap();

        assert_eq!(builder.add_binding(&jump, key(KeyCode::Space)).unwrap(), 0);
        assert_eq!(builder.add_binding(&jump, key(KeyCode::KeyW)).unwrap(), 1);

        let layout = builder.finalize().unwrap();
        assert_eq!(layout.binding_count("player.jump"), 2);
        assert_eq!(
            layout.binding("player.jump", 1).map(|b| b.display_name()),
            Some("KeyW")
        );
    }

    #[test]
    fn test_duplicate_action_rejected() {
        let mut builder = LayoutBuilder::new();
        builder
            .define_action("player", "jump", ConsumePolicy::Never)
            .unwrap();
        let result = builder.define_action("player", "jump", ConsumePolicy::Manual);
        assert!(matches!(result, Err(InputError::DuplicateAction(_))));
    }

    #[test]
    fn test_binding_unknown_action_rejected() {
        let mut builder = LayoutBuilder::new();
        let ghost = ActionName::new("player", "ghost").unwrap();
        let result = builder.add_binding(&ghost, key(KeyCode::KeyG));
        assert!(matches!(result, Err(InputError::UnknownAction(_))));
    }

    #[test]
    fn test_changes_after_finalize_rejected() {
        let mut builder = LayoutBuilder::new();
        let jump = builder
            .define_action("player", "jump", ConsumePolicy::Never)
            .unwrap();
        builder.finalize().unwrap();

        assert!(builder.is_finalized());
        assert_eq!(
            builder.add_binding(&jump, key(KeyCode::Space)),
            Err(InputError::LayoutFinalized)
        );
        assert_eq!(
            builder.define_action("player", "duck", ConsumePolicy::Never),
            Err(InputError::LayoutFinalized)
        );
        assert_eq!(
            builder.set_consume_policy(&jump, ConsumePolicy::Manual),
            Err(InputError::LayoutFinalized)
        );
        assert!(builder.finalize().is_err());
    }

    #[test]
    fn test_unknown_lookups_are_neutral() {
        let layout = LayoutBuilder::new().finalize().unwrap();
        assert!(layout.is_empty());
        assert_eq!(layout.binding_count("player.jump"), 0);
        assert!(layout.binding("player.jump", 0).is_none());
    }

    #[test]
    fn test_out_of_range_binding_index() {
        let mut builder = LayoutBuilder::new();
        let jump = builder
            .define_action("player", "jump", ConsumePolicy::Never)
            .unwrap();
        builder.add_binding(&jump, key(KeyCode::Space)).unwrap();
        let layout = builder.finalize().unwrap();

        assert!(layout.binding("player.jump", 1).is_none());
    }

    #[test]
    fn test_entry_sources_deduplicated() {
        let mut builder = LayoutBuilder::new();
        let save = builder
            .define_action("ui", "save", ConsumePolicy::Manual)
            .unwrap();
        let ctrl = PhysicalSource::key(KeyCode::ControlLeft);
        let s = PhysicalSource::key(KeyCode::KeyS);
        builder
            .add_binding(&save, Binding::chord([ctrl, s], Trigger::on_press()).unwrap())
            .unwrap();
        builder.add_binding(&save, key(KeyCode::KeyS)).unwrap();
        let layout = builder.finalize().unwrap();

        let entry = layout.get("ui.save").unwrap();
        assert_eq!(entry.consume_policy(), ConsumePolicy::Manual);
        assert_eq!(entry.sources(), vec![ctrl, s]);
    }

    #[test]
    fn test_actions_for_source() {
        let mut builder = LayoutBuilder::new();
        let left = builder
            .define_action("player", "left", ConsumePolicy::Never)
            .unwrap();
        let steer = builder
            .define_action("vehicle", "steer", ConsumePolicy::Never)
            .unwrap();
        let stick = PhysicalSource::gamepad_axis(0, 0);
        builder
            .add_binding(&left, Binding::axis(stick, Side::Negative).unwrap())
            .unwrap();
        builder
            .add_binding(&steer, Binding::axis(stick, Side::Both).unwrap())
            .unwrap();
        let layout = builder.finalize().unwrap();

        assert_eq!(layout.actions_for_source(stick).len(), 2);
        assert!(layout
            .actions_for_source(PhysicalSource::key(KeyCode::KeyA))
            .is_empty());
    }
}
