// Plugin contexts, action listeners and block flags
//
// Contexts live in a slot table with generation counters: a handle is only
// honored while its slot still carries the same generation, so handles kept
// past a plugin's unload are rejected instead of aliasing a newer plugin.

use super::config::ActionLayout;
use super::{InputError, InputResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Zero-argument callback fired when an action triggers
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// Lightweight handle to an attached plugin context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct ContextSlot {
    generation: u32,
    plugin: Option<String>,
}

struct ListenerEntry {
    owner: ContextHandle,
    listener: Listener,
}

impl fmt::Debug for ListenerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerEntry")
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

/// Listener and block-flag registry, keyed by full action name
#[derive(Debug, Default)]
pub struct Registry {
    contexts: Vec<ContextSlot>,
    free_slots: Vec<u32>,
    listeners: HashMap<String, ListenerEntry>,
    blocks: HashMap<String, ContextHandle>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // === Contexts ===

    /// Attach a plugin, returns its existing handle if already attached
    pub fn attach(&mut self, plugin: &str) -> ContextHandle {
        if let Some(handle) = self.context(plugin) {
            return handle;
        }

        let handle = match self.free_slots.pop() {
            Some(index) => {
                let slot = &mut self.contexts[index as usize];
                slot.plugin = Some(plugin.to_string());
                ContextHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.contexts.len() as u32;
                self.contexts.push(ContextSlot {
                    generation: 0,
                    plugin: Some(plugin.to_string()),
                });
                ContextHandle {
                    index,
                    generation: 0,
                }
            }
        };

        log::info!("Plugin '{}' attached", plugin);
        handle
    }

    /// Detach a plugin: drops its listeners and blocks and invalidates the handle
    pub fn detach(&mut self, handle: ContextHandle) -> InputResult<()> {
        self.ensure_live(handle)?;
        self.unregister_all(handle);
        self.blocks.retain(|_, owner| *owner != handle);

        let slot = &mut self.contexts[handle.index as usize];
        let plugin = slot.plugin.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free_slots.push(handle.index);

        log::info!("Plugin '{}' detached", plugin.unwrap_or_default());
        Ok(())
    }

    /// Look up the handle of an attached plugin
    pub fn context(&self, plugin: &str) -> Option<ContextHandle> {
        self.contexts
            .iter()
            .enumerate()
            .find(|(_, slot)| slot.plugin.as_deref() == Some(plugin))
            .map(|(index, slot)| ContextHandle {
                index: index as u32,
                generation: slot.generation,
            })
    }

    /// Check if a handle still refers to an attached plugin
    pub fn is_live(&self, handle: ContextHandle) -> bool {
        self.contexts
            .get(handle.index as usize)
            .is_some_and(|slot| slot.generation == handle.generation && slot.plugin.is_some())
    }

    /// Name of the plugin behind a live handle
    pub fn plugin_name(&self, handle: ContextHandle) -> Option<&str> {
        if !self.is_live(handle) {
            return None;
        }
        self.contexts[handle.index as usize].plugin.as_deref()
    }

    fn ensure_live(&self, handle: ContextHandle) -> InputResult<()> {
        if self.is_live(handle) {
            Ok(())
        } else {
            Err(InputError::StaleContext)
        }
    }

    // === Listeners ===

    /// Install the listener for an action, replacing any previous one
    pub fn register(
        &mut self,
        handle: ContextHandle,
        layout: &ActionLayout,
        full_name: &str,
        listener: Listener,
    ) -> InputResult<()> {
        self.ensure_live(handle)?;
        if layout.lookup(full_name).is_none() {
            return Err(InputError::UnknownAction(full_name.to_string()));
        }

        let previous = self.listeners.insert(
            full_name.to_string(),
            ListenerEntry {
                owner: handle,
                listener,
            },
        );
        let plugin = self.plugin_name(handle).unwrap_or_default();
        if previous.is_some() {
            log::debug!("Plugin '{}' replaced listener for '{}'", plugin, full_name);
        } else {
            log::debug!("Plugin '{}' registered listener for '{}'", plugin, full_name);
        }
        Ok(())
    }

    /// Remove every listener a context registered, returns how many
    pub fn unregister_all(&mut self, handle: ContextHandle) -> usize {
        let before = self.listeners.len();
        self.listeners.retain(|_, entry| entry.owner != handle);
        let removed = before - self.listeners.len();
        if removed > 0 {
            log::debug!("Unregistered {} listeners", removed);
        }
        removed
    }

    /// Listener currently installed for an action
    pub fn listener(&self, full_name: &str) -> Option<Listener> {
        self.listeners
            .get(full_name)
            .map(|entry| Arc::clone(&entry.listener))
    }

    pub fn has_listener(&self, full_name: &str) -> bool {
        self.listeners.contains_key(full_name)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // === Blocks ===

    /// Set or clear an action's block flag
    pub fn set_block(
        &mut self,
        handle: ContextHandle,
        layout: &ActionLayout,
        full_name: &str,
        block: bool,
    ) -> InputResult<()> {
        self.ensure_live(handle)?;
        if layout.lookup(full_name).is_none() {
            return Err(InputError::UnknownAction(full_name.to_string()));
        }

        if block {
            self.blocks.insert(full_name.to_string(), handle);
        } else {
            self.blocks.remove(full_name);
        }
        log::debug!("Block flag for '{}' set to {}", full_name, block);
        Ok(())
    }

    pub fn is_blocked(&self, full_name: &str) -> bool {
        self.blocks.contains_key(full_name)
    }

    /// Drop listeners and blocks whose action no longer exists
    pub fn retain_actions(&mut self, layout: &ActionLayout) {
        let before = self.listeners.len();
        self.listeners
            .retain(|name, _| layout.lookup(name).is_some());
        self.blocks.retain(|name, _| layout.lookup(name).is_some());

        let dropped = before - self.listeners.len();
        if dropped > 0 {
            log::warn!("Dropped {} listeners for actions missing from new layout", dropped);
        }
    }
}
