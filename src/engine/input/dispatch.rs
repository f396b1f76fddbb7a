// Callback dispatch for one tick's firings

use super::action::ActionId;
use super::config::ActionLayout;
use super::registry::{Listener, Registry};
use parking_lot::RwLock;

/// One binding asking its action's callback to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Firing {
    pub action: ActionId,
    pub binding: usize,
}

/// Invokes listeners for firings, in the order they were detected
///
/// Listeners are collected under a short read lock and invoked after it is
/// released, so a callback may register or unregister listeners itself.
/// Several bindings of one action firing in the same tick invoke the listener
/// once each.
#[derive(Default)]
pub struct Dispatcher {
    pending: Vec<(Firing, Listener)>,
    dispatched: u64,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire listeners for `firings`, returns how many were invoked
    pub fn dispatch(
        &mut self,
        firings: &[Firing],
        layout: &ActionLayout,
        registry: &RwLock<Registry>,
    ) -> usize {
        if firings.is_empty() {
            return 0;
        }

        {
            let registry = registry.read();
            for firing in firings {
                let Some(entry) = layout.action(firing.action) else {
                    continue;
                };
                if let Some(listener) = registry.listener(entry.name().as_str()) {
                    self.pending.push((*firing, listener));
                }
            }
        }

        let count = self.pending.len();
        for (firing, listener) in self.pending.drain(..) {
            log::debug!(
                "Firing action #{} from binding {}",
                firing.action.index(),
                firing.binding
            );
            listener();
        }

        self.dispatched += count as u64;
        count
    }

    /// Total listener invocations so far
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::input::config::{ConsumePolicy, LayoutBuilder};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn layout() -> ActionLayout {
        let mut builder = LayoutBuilder::new();
        builder
            .define_action("player", "jump", ConsumePolicy::Never)
            .unwrap();
        builder
            .define_action("player", "duck", ConsumePolicy::Never)
            .unwrap();
        builder.finalize().unwrap()
    }

    #[test]
    fn test_no_listener_no_dispatch() {
        let layout = layout();
        let registry = RwLock::new(Registry::new());
        let mut dispatcher = Dispatcher::new();

        let fired = dispatcher.dispatch(
            &[Firing {
                action: ActionId(0),
                binding: 0,
            }],
            &layout,
            &registry,
        );
        assert_eq!(fired, 0);
    }

    #[test]
    fn test_same_action_fires_once_per_binding() {
        let layout = layout();
        let registry = RwLock::new(Registry::new());
        let count = Arc::new(AtomicUsize::new(0));
        {
            let mut reg = registry.write();
            let ctx = reg.attach("alpha");
            let inner = Arc::clone(&count);
            reg.register(
                ctx,
                &layout,
                "player.jump",
                Arc::new(move || {
                    inner.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();
        }

        let mut dispatcher = Dispatcher::new();
        let firings = [
            Firing {
                action: ActionId(0),
                binding: 0,
            },
            Firing {
                action: ActionId(0),
                binding: 1,
            },
        ];
        assert_eq!(dispatcher.dispatch(&firings, &layout, &registry), 2);
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(dispatcher.dispatched(), 2);
    }

    #[test]
    fn test_dispatch_order_follows_firings() {
        let layout = layout();
        let registry = RwLock::new(Registry::new());
        let order = Arc::new(Mutex::new(Vec::new()));
        {
            let mut reg = registry.write();
            let ctx = reg.attach("alpha");
            for name in ["player.jump", "player.duck"] {
                let order = Arc::clone(&order);
                reg.register(
                    ctx,
                    &layout,
                    name,
                    Arc::new(move || order.lock().unwrap().push(name)),
                )
                .unwrap();
            }
        }

        let mut dispatcher = Dispatcher::new();
        let firings = [
            Firing {
                action: ActionId(1),
                binding: 0,
            },
            Firing {
                action: ActionId(0),
                binding: 0,
            },
        ];
        dispatcher.dispatch(&firings, &layout, &registry);
        assert_eq!(*order.lock().unwrap(), vec!["player.duck", "player.jump"]);
    }

    #[test]
    fn test_listener_may_reenter_registry() {
        let layout = Arc::new(layout());
        let registry = Arc::new(RwLock::new(Registry::new()));
        let ctx = registry.write().attach("alpha");
        {
            let registry_inner = Arc::clone(&registry);
            registry
                .write()
                .register(
                    ctx,
                    &layout,
                    "player.jump",
                    Arc::new(move || {
                        registry_inner.write().unregister_all(ctx);
                    }),
                )
                .unwrap();
        }

        let mut dispatcher = Dispatcher::new();
        let firing = Firing {
            action: ActionId(0),
            binding: 0,
        };
        assert_eq!(dispatcher.dispatch(&[firing], &layout, &registry), 1);
        assert_eq!(registry.read().listener_count(), 0);
    }
}
