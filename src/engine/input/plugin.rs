// Plugin-facing surface
//
// Nothing here fails loudly. Unknown actions, out-of-range binding indices and
// stale context handles all collapse into the documented sentinel for each
// query (0, 0.0, `Unknown`, `NotApplicable`, empty string).

use super::binding::{
    AccumulatorMode, Binding, BindingBehavior, BindingMode, BindingSide, BindingType, PressType,
};
use super::config::ActionLayout;
use super::manager::Shared;
use super::registry::Listener;
use std::sync::Arc;

pub use super::registry::ContextHandle;

/// Cloneable handle plugins use to talk to the engine
#[derive(Clone)]
pub struct PluginApi {
    shared: Arc<Shared>,
}

impl PluginApi {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    fn layout(&self) -> Arc<ActionLayout> {
        Arc::clone(&self.shared.frame.read().layout)
    }

    fn is_live(&self, handle: ContextHandle) -> bool {
        self.shared.registry.read().is_live(handle)
    }

    // === Context lifecycle (host side) ===

    /// Attach a plugin at activation
    pub fn attach(&self, plugin: &str) -> ContextHandle {
        self.shared.registry.write().attach(plugin)
    }

    /// Detach a plugin at unload: drops its listeners and blocks
    ///
    /// Returns false if the handle was already stale.
    pub fn detach(&self, handle: ContextHandle) -> bool {
        match self.shared.registry.write().detach(handle) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("Detach ignored: {}", err);
                false
            }
        }
    }

    /// Handle of an attached plugin
    pub fn get_context(&self, plugin: &str) -> Option<ContextHandle> {
        self.shared.registry.read().context(plugin)
    }

    // === Listeners and blocks ===

    /// Install the callback for an action, replacing any previous one
    ///
    /// Silently ignored (logged) for unknown actions and stale handles.
    pub fn register<F>(&self, handle: ContextHandle, full_name: &str, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(callback);
        // Holding the frame guard keeps a layout swap from pruning in between
        let frame = self.shared.frame.read();
        let result = self
            .shared
            .registry
            .write()
            .register(handle, &frame.layout, full_name, listener);
        drop(frame);
        if let Err(err) = result {
            log::warn!("Register for '{}' ignored: {}", full_name, err);
        }
    }

    /// Remove every callback this context registered
    pub fn unregister_all(&self, handle: ContextHandle) {
        let mut registry = self.shared.registry.write();
        if registry.is_live(handle) {
            registry.unregister_all(handle);
        }
    }

    /// Claim or release an action's physical sources
    ///
    /// Only has an effect under the `Manual` consume policy.
    pub fn set_block_state(&self, handle: ContextHandle, full_name: &str, block: bool) {
        let frame = self.shared.frame.read();
        let result = self
            .shared
            .registry
            .write()
            .set_block(handle, &frame.layout, full_name, block);
        drop(frame);
        if let Err(err) = result {
            log::warn!("Block for '{}' ignored: {}", full_name, err);
        }
    }

    // === Queries ===

    /// Current value of an action, 0.0 if unknown
    pub fn get_action_value(&self, handle: ContextHandle, full_name: &str) -> f32 {
        if !self.is_live(handle) {
            return 0.0;
        }
        let frame = self.shared.frame.read();
        frame
            .layout
            .lookup(full_name)
            .and_then(|id| frame.values.get(id.index()).copied())
            .unwrap_or(0.0)
    }

    /// Number of bindings of an action, 0 if unknown
    pub fn get_binding_count(&self, handle: ContextHandle, full_name: &str) -> usize {
        if !self.is_live(handle) {
            return 0;
        }
        self.layout().binding_count(full_name)
    }

    fn with_binding<T>(
        &self,
        handle: ContextHandle,
        full_name: &str,
        index: usize,
        query: impl FnOnce(&Binding) -> T,
    ) -> Option<T> {
        if !self.is_live(handle) {
            return None;
        }
        self.layout().binding(full_name, index).map(query)
    }

    pub fn get_binding_type(&self, handle: ContextHandle, full_name: &str, index: usize) -> BindingType {
        self.with_binding(handle, full_name, index, Binding::binding_type)
            .unwrap_or(BindingType::Unknown)
    }

    pub fn get_binding_behavior(
        &self,
        handle: ContextHandle,
        full_name: &str,
        index: usize,
    ) -> BindingBehavior {
        self.with_binding(handle, full_name, index, Binding::behavior)
            .unwrap_or(BindingBehavior::NotApplicable)
    }

    pub fn get_binding_press_type(
        &self,
        handle: ContextHandle,
        full_name: &str,
        index: usize,
    ) -> PressType {
        self.with_binding(handle, full_name, index, Binding::press_type)
            .unwrap_or(PressType::NotApplicable)
    }

    pub fn get_binding_accumulator_mode(
        &self,
        handle: ContextHandle,
        full_name: &str,
        index: usize,
    ) -> AccumulatorMode {
        self.with_binding(handle, full_name, index, Binding::accumulator_mode)
            .unwrap_or(AccumulatorMode::NotApplicable)
    }

    pub fn get_binding_mode(&self, handle: ContextHandle, full_name: &str, index: usize) -> BindingMode {
        self.with_binding(handle, full_name, index, Binding::mode)
            .unwrap_or(BindingMode::NotApplicable)
    }

    pub fn get_binding_side(&self, handle: ContextHandle, full_name: &str, index: usize) -> BindingSide {
        self.with_binding(handle, full_name, index, Binding::side)
            .unwrap_or(BindingSide::NotApplicable)
    }

    /// Copy a binding's display name into `buffer`, NUL-terminated
    ///
    /// Writes as much as fits (never splitting a UTF-8 character) and returns
    /// the full name length in bytes, so `result >= buffer.len()` means the
    /// name was truncated. Unknown bindings write an empty string and return 0.
    pub fn get_binding_name(
        &self,
        handle: ContextHandle,
        full_name: &str,
        index: usize,
        buffer: &mut [u8],
    ) -> usize {
        let name = self
            .with_binding(handle, full_name, index, |b| b.display_name().to_string())
            .unwrap_or_default();
        write_bounded(&name, buffer)
    }
}

/// Bounded, always NUL-terminated copy; returns the untruncated length
pub fn write_bounded(text: &str, buffer: &mut [u8]) -> usize {
    let Some(capacity) = buffer.len().checked_sub(1) else {
        return text.len();
    };

    let mut len = text.len().min(capacity);
    while !text.is_char_boundary(len) {
        len -= 1;
    }
    buffer[..len].copy_from_slice(&text.as_bytes()[..len]);
    buffer[len] = 0;
    text.len()
}
