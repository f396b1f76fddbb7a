// Action binding and activation engine
//
// Plugins work with named actions (`group.name`); this module resolves which
// physical inputs currently satisfy each action, independent of the device the
// user bound.
//
// ## Architecture
//
// - `action`: Full action names (`group.name`)
// - `source`: Physical input identifiers (keys, buttons, axes)
// - `binding`: Binding records and their modifiers
// - `config`: Engine tuning, consume policies and layout resolution
// - `sampler`: Per-tick raw sample table fed by the device layer
// - `normalize`: Raw sample -> normalized per-binding contribution
// - `accumulator`: Persistent state for knob-style axes
// - `activation`: Per-binding press/toggle/long-press state machine
// - `registry`: Plugin contexts, listeners and block flags
// - `dispatch`: Callback invocation for a tick's firings
// - `block`: Consumed-source resolution from consume policies
// - `manager`: The engine, running everything once per tick
// - `plugin`: The plugin-facing surface with sentinel semantics
//
// ## Usage Example
//
// ```rust
// use action_binds::engine::input::*;
//
// let mut builder = LayoutBuilder::new();
// let jump = builder.define_action("player", "jump", ConsumePolicy::Manual)?;
// builder.add_binding(&jump, Binding::button(PhysicalSource::key(KeyCode::Space), Trigger::on_press())?)?;
// let layout = builder.finalize()?;
//
// let mut engine = ActionEngine::new(EngineConfig::default(), layout)?;
// let api = engine.plugin_api();
// let ctx = api.attach("my_plugin");
// api.register(ctx, "player.jump", || println!("jump!"));
//
// // Every tick
// engine.update(&sample_table, tick_time);
// let value = api.get_action_value(ctx, "player.jump");
// ```

pub mod accumulator;
pub mod action;
pub mod activation;
pub mod binding;
pub mod block;
pub mod config;
pub mod dispatch;
pub mod manager;
pub mod normalize;
pub mod plugin;
pub mod registry;
pub mod sampler;
pub mod source;

// Re-export commonly used types
pub use action::{ActionId, ActionName};
pub use binding::{
    AccumulatorMode, AxisMode, Behavior, Binding, BindingBehavior, BindingInput, BindingMode,
    BindingSide, BindingType, PressType, Side, Trigger, TriggerPress,
};
pub use config::{ActionLayout, ConsumePolicy, EngineConfig, LayoutBuilder};
pub use manager::ActionEngine;
pub use plugin::{ContextHandle, PluginApi};
pub use sampler::{InputSampler, SampleTable};
pub use source::{MouseAxis, PhysicalSource};

/// Errors raised while building layouts and registering listeners
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("Invalid action name: {0:?}")]
    InvalidActionName(String),

    #[error("Action already defined: {0}")]
    DuplicateAction(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid binding: {0}")]
    InvalidBinding(String),

    #[error("Invalid engine config: {0}")]
    InvalidConfig(String),

    #[error("Layout is finalized, no further changes accepted")]
    LayoutFinalized,

    #[error("Plugin context is no longer attached")]
    StaleContext,
}

/// Result type for input operations
pub type InputResult<T> = Result<T, InputError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_display() {
        let err = InputError::UnknownAction("player.jump".to_string());
        assert_eq!(err.to_string(), "Unknown action: player.jump");
    }

    #[test]
    fn test_finalized_error_display() {
        assert_eq!(
            InputError::LayoutFinalized.to_string(),
            "Layout is finalized, no further changes accepted"
        );
    }
}
