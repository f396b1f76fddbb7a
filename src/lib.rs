//! Action binding and activation engine.
//!
//! Plugins name abstract actions (`group.name`); the engine resolves which
//! physical inputs currently satisfy each action, produces one normalized
//! value per action every tick and fires the plugin's callback on the edges
//! its bindings ask for. See [`engine::input`] for the full pipeline.

pub mod engine;

pub use engine::input::{
    ActionEngine, ActionLayout, ActionName, Binding, ContextHandle, EngineConfig, InputError,
    InputSampler, LayoutBuilder, PhysicalSource, PluginApi, SampleTable,
};
pub use engine::tick::TickTimer;
