// Value normalization: raw physical samples -> one contribution per binding
//
// Everything here is pure. Accumulator state is read by the caller and passed
// in; `behavior` and press type never influence a value.

use super::binding::{AxisMode, Binding, BindingInput, Side};
use super::config::EngineConfig;
use super::sampler::InputSampler;

/// Raw reading of a binding's physical source(s)
///
/// A chord reads as the weakest of its members, so it is only fully held when
/// every member is.
pub fn sample(binding: &Binding, sampler: &impl InputSampler) -> f32 {
    match binding.input() {
        BindingInput::Chord { sources, .. } => sources
            .iter()
            .map(|source| sampler.raw_value(*source))
            .fold(f32::INFINITY, f32::min)
            .max(0.0),
        BindingInput::Button { source, .. } | BindingInput::Axis { source, .. } => {
            let raw = sampler.raw_value(*source);
            if raw.is_finite() {
                raw
            } else {
                0.0
            }
        }
    }
}

/// 0 or 1 depending on whether `level` reaches `threshold`
pub fn digital(level: f32, threshold: f32) -> f32 {
    if level >= threshold {
        1.0
    } else {
        0.0
    }
}

/// Zero small readings and rescale the remainder to full range
pub fn apply_deadzone(value: f32, deadzone: f32) -> f32 {
    if value.abs() < deadzone {
        0.0
    } else {
        let magnitude = (value.abs() - deadzone) / (1.0 - deadzone);
        value.signum() * magnitude.clamp(0.0, 1.0)
    }
}

/// Keep the half of the axis the binding listens to
pub fn apply_side(value: f32, side: Side) -> f32 {
    match side {
        Side::Both => value,
        Side::Positive => value.max(0.0),
        Side::Negative => (-value).max(0.0),
    }
}

/// Delta an accumulating binding integrates this tick
pub fn accumulator_delta(raw: f32, config: &EngineConfig) -> f32 {
    apply_deadzone(raw, config.axis_deadzone) * config.accumulator_scale
}

/// Contribution of one binding to its action's value
///
/// `accumulated` is the binding's accumulator value after this tick's update;
/// it replaces the instantaneous sample for accumulating axes.
pub fn normalize(binding: &Binding, raw: f32, accumulated: Option<f32>, config: &EngineConfig) -> f32 {
    match binding.input() {
        BindingInput::Button { .. } | BindingInput::Chord { .. } => {
            digital(raw, config.digital_threshold)
        }
        BindingInput::Axis {
            side,
            accumulate,
            mode,
            ..
        } => {
            let base = match accumulated {
                Some(value) if *accumulate => value,
                _ => apply_deadzone(raw, config.axis_deadzone),
            };
            let sided = apply_side(base, *side);
            match mode {
                AxisMode::Analog => sided,
                AxisMode::Digital(_) => digital(sided.abs(), config.digital_threshold),
            }
        }
    }
}

/// First non-neutral contribution in binding order, or 0
pub fn reduce(contributions: &[f32]) -> f32 {
    contributions
        .iter()
        .copied()
        .find(|value| *value != 0.0)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::binding::{Trigger, TriggerPress};
    use crate::engine::input::source::PhysicalSource;
    use approx::assert_relative_eq;
    use std::collections::HashMap;
    use winit::keyboard::KeyCode;

    fn stick(side: Side) -> Binding {
        Binding::axis(PhysicalSource::gamepad_axis(0, 0), side).unwrap()
    }

    #[test]
    fn test_side_positive_drops_negative_half() {
        let config = EngineConfig::default();
        assert_eq!(normalize(&stick(Side::Positive), -0.5, None, &config), 0.0);
        assert_relative_eq!(normalize(&stick(Side::Positive), 0.7, None, &config), 0.7);
    }

    #[test]
    fn test_side_negative_reports_magnitude() {
        let config = EngineConfig::default();
        assert_relative_eq!(normalize(&stick(Side::Negative), -0.5, None, &config), 0.5);
        assert_eq!(normalize(&stick(Side::Negative), 0.5, None, &config), 0.0);
    }

    #[test]
    fn test_side_both_is_unchanged() {
        let config = EngineConfig::default();
        assert_relative_eq!(normalize(&stick(Side::Both), -0.8, None, &config), -0.8);
    }

    #[test]
    fn test_button_ignores_trigger_modifiers() {
        let config = EngineConfig::default();
        let toggle = Binding::button(
            PhysicalSource::key(KeyCode::KeyF),
            Trigger::toggle(TriggerPress::Long),
        )
        .unwrap();
        assert_eq!(normalize(&toggle, 1.0, None, &config), 1.0);
        assert_eq!(normalize(&toggle, 0.0, None, &config), 0.0);
    }

    #[test]
    fn test_digital_axis_thresholds() {
        let config = EngineConfig::default();
        let binding = Binding::axis_digital(
            PhysicalSource::gamepad_axis(0, 5),
            Side::Negative,
            Trigger::on_press(),
        )
        .unwrap();

        assert_eq!(normalize(&binding, -0.4, None, &config), 0.0);
        assert_eq!(normalize(&binding, -0.6, None, &config), 1.0);
        assert_eq!(normalize(&binding, 0.9, None, &config), 0.0);
    }

    #[test]
    fn test_accumulated_value_replaces_sample() {
        let config = EngineConfig::default();
        let knob = stick(Side::Positive).accumulating().unwrap();

        // Raw delta is negative but the accumulated knob is positive
        assert_relative_eq!(normalize(&knob, -0.1, Some(0.4), &config), 0.4);
        assert_eq!(normalize(&knob, 0.5, Some(-0.4), &config), 0.0);
    }

    #[test]
    fn test_deadzone_rescales() {
        assert_eq!(apply_deadzone(0.1, 0.2), 0.0);
        assert_relative_eq!(apply_deadzone(0.6, 0.2), 0.5);
        assert_relative_eq!(apply_deadzone(-1.0, 0.2), -1.0);
        assert_relative_eq!(apply_deadzone(-0.3, 0.0), -0.3);
    }

    #[test]
    fn test_accumulator_delta_scaled() {
        let config = EngineConfig::default().with_accumulator_scale(0.5);
        assert_relative_eq!(accumulator_delta(0.4, &config), 0.2);
    }

    #[test]
    fn test_chord_sample_needs_every_member() {
        let ctrl = PhysicalSource::key(KeyCode::ControlLeft);
        let s = PhysicalSource::key(KeyCode::KeyS);
        let chord = Binding::chord([ctrl, s], Trigger::on_press()).unwrap();

        let mut samples = HashMap::new();
        samples.insert(ctrl, 1.0);
        assert_eq!(sample(&chord, &samples), 0.0);

        samples.insert(s, 1.0);
        assert_eq!(sample(&chord, &samples), 1.0);
    }

    #[test]
    fn test_reduce_first_non_neutral_wins() {
        assert_eq!(reduce(&[]), 0.0);
        assert_eq!(reduce(&[0.0, 0.0]), 0.0);
        assert_relative_eq!(reduce(&[0.0, 0.3, 1.0]), 0.3);
        assert_relative_eq!(reduce(&[-0.2, 1.0]), -0.2);
    }
}
