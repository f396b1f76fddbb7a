// Action engine - runs the whole binding pipeline once per tick

use super::accumulator::{AccumulatorStore, BindingKey};
use super::activation::{ActivationMachine, ActivationPhase};
use super::block::ConsumedSet;
use super::config::{ActionLayout, EngineConfig};
use super::dispatch::{Dispatcher, Firing};
use super::normalize;
use super::plugin::PluginApi;
use super::registry::Registry;
use super::sampler::InputSampler;
use super::source::PhysicalSource;
use super::InputResult;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;

/// Layout, values and consumption published at the end of each tick
///
/// `values` is indexed by the ids of `layout`, so readers resolve names and
/// read values under the same guard.
#[derive(Debug, Default)]
pub(crate) struct FrameOutput {
    pub layout: Arc<ActionLayout>,
    pub values: Vec<f32>,
    pub consumed: ConsumedSet,
    pub tick: u64,
}

/// State shared between the engine and plugin handles
///
/// Writers (plugin load/unload, layout swaps) take the write locks briefly;
/// the tick only takes read locks plus one write to publish its output.
///
/// Lock order is `frame` then `registry` whenever both are held.
#[derive(Debug, Default)]
pub(crate) struct Shared {
    pub frame: RwLock<FrameOutput>,
    pub registry: RwLock<Registry>,
}

/// Runtime state of one binding
#[derive(Debug)]
struct BindingRuntime {
    /// Present for digital-triggering bindings
    machine: Option<ActivationMachine>,
    /// Contribution computed on the last tick
    value: f32,
}

/// The binding engine
///
/// Owns the per-binding activation and accumulator state exclusively; plugins
/// reach the engine through [`PluginApi`] handles from [`ActionEngine::plugin_api`].
pub struct ActionEngine {
    config: EngineConfig,
    shared: Arc<Shared>,
    layout: Arc<ActionLayout>,
    runtime: Vec<Vec<BindingRuntime>>,
    accumulators: AccumulatorStore,
    dispatcher: Dispatcher,
    firings: Vec<Firing>,
    tick_count: u64,
}

impl ActionEngine {
    /// Create an engine running `layout`
    pub fn new(config: EngineConfig, layout: ActionLayout) -> InputResult<Self> {
        config.validate()?;

        let layout = Arc::new(layout);
        let shared = Arc::new(Shared {
            frame: RwLock::new(FrameOutput {
                layout: Arc::clone(&layout),
                values: vec![0.0; layout.len()],
                ..FrameOutput::default()
            }),
            registry: RwLock::new(Registry::new()),
        });

        let mut engine = Self {
            config,
            shared,
            layout,
            runtime: Vec::new(),
            accumulators: AccumulatorStore::new(),
            dispatcher: Dispatcher::new(),
            firings: Vec::new(),
            tick_count: 0,
        };
        engine.rebuild_runtime();

        log::info!(
            "Action engine created with {} actions",
            engine.layout.len()
        );
        Ok(engine)
    }

    /// Handle for plugins; cheap to clone and safe to use from other threads
    pub fn plugin_api(&self) -> PluginApi {
        PluginApi::new(Arc::clone(&self.shared))
    }

    /// Get the engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the installed layout
    pub fn layout(&self) -> &ActionLayout {
        &self.layout
    }

    /// Swap in a new layout
    ///
    /// Every binding's runtime state starts over from neutral. Listeners and
    /// block flags survive for actions that still exist.
    pub fn install_layout(&mut self, layout: ActionLayout) {
        let layout = Arc::new(layout);

        {
            let mut frame = self.shared.frame.write();
            self.shared.registry.write().retain_actions(&layout);
            *frame = FrameOutput {
                layout: Arc::clone(&layout),
                values: vec![0.0; layout.len()],
                consumed: ConsumedSet::default(),
                tick: self.tick_count,
            };
        }

        self.layout = layout;
        self.rebuild_runtime();
        log::info!("Installed layout with {} actions", self.layout.len());
    }

    fn rebuild_runtime(&mut self) {
        let (min, max) = self.config.accumulator_range;
        self.accumulators.clear();
        self.runtime.clear();

        for (id, entry) in self.layout.iter() {
            let mut bindings = Vec::with_capacity(entry.bindings().len());
            for (index, binding) in entry.bindings().iter().enumerate() {
                if binding.accumulates() {
                    self.accumulators
                        .insert(BindingKey::new(id.index(), index), min, max);
                }
                bindings.push(BindingRuntime {
                    machine: binding.trigger().map(ActivationMachine::new),
                    value: 0.0,
                });
            }
            self.runtime.push(bindings);
        }
    }

    /// Run one tick: sample, normalize, step state machines, publish, dispatch
    ///
    /// Returns the number of callbacks invoked.
    pub fn update(&mut self, sampler: &impl InputSampler, now: Instant) -> usize {
        self.tick_count += 1;
        self.firings.clear();

        let mut values = Vec::with_capacity(self.layout.len());
        let mut contributions = Vec::new();

        for (id, entry) in self.layout.iter() {
            contributions.clear();

            for (index, binding) in entry.bindings().iter().enumerate() {
                let raw = normalize::sample(binding, sampler);
                let accumulated = if binding.accumulates() {
                    let delta = normalize::accumulator_delta(raw, &self.config);
                    self.accumulators
                        .update(BindingKey::new(id.index(), index), delta)
                } else {
                    None
                };
                let value = normalize::normalize(binding, raw, accumulated, &self.config);

                let runtime = &mut self.runtime[id.index()][index];
                runtime.value = value;
                if let Some(machine) = runtime.machine.as_mut() {
                    if machine.update(value != 0.0, now, self.config.long_press_threshold) {
                        self.firings.push(Firing {
                            action: id,
                            binding: index,
                        });
                    }
                }
                contributions.push(value);
            }

            values.push(normalize::reduce(&contributions));
        }

        let consumed = ConsumedSet::resolve(&self.layout, &self.shared.registry.read());
        *self.shared.frame.write() = FrameOutput {
            layout: Arc::clone(&self.layout),
            values,
            consumed,
            tick: self.tick_count,
        };

        self.dispatcher
            .dispatch(&self.firings, &self.layout, &self.shared.registry)
    }

    /// Current value of an action, 0 for unknown actions
    pub fn action_value(&self, full_name: &str) -> f32 {
        self.layout
            .lookup(full_name)
            .and_then(|id| self.shared.frame.read().values.get(id.index()).copied())
            .unwrap_or(0.0)
    }

    /// Contribution of one binding on the last tick
    pub fn binding_value(&self, full_name: &str, index: usize) -> Option<f32> {
        self.binding_runtime(full_name, index).map(|rt| rt.value)
    }

    /// Activation phase of a digital-triggering binding
    pub fn activation_phase(&self, full_name: &str, index: usize) -> Option<ActivationPhase> {
        self.binding_runtime(full_name, index)
            .and_then(|rt| rt.machine.as_ref())
            .map(|machine| machine.phase())
    }

    /// Toggle output of a digital-triggering binding
    pub fn is_toggled_on(&self, full_name: &str, index: usize) -> Option<bool> {
        self.binding_runtime(full_name, index)
            .and_then(|rt| rt.machine.as_ref())
            .map(|machine| machine.is_toggled_on())
    }

    /// Accumulated value of an accumulating binding
    pub fn accumulator_value(&self, full_name: &str, index: usize) -> Option<f32> {
        let id = self.layout.lookup(full_name)?;
        self.accumulators.get(BindingKey::new(id.index(), index))
    }

    fn binding_runtime(&self, full_name: &str, index: usize) -> Option<&BindingRuntime> {
        let id = self.layout.lookup(full_name)?;
        self.runtime.get(id.index())?.get(index)
    }

    /// Check if the host must ignore a physical source this tick
    pub fn is_consumed(&self, source: PhysicalSource) -> bool {
        self.shared.frame.read().consumed.contains(source)
    }

    /// Every source consumed this tick
    pub fn consumed_sources(&self) -> Vec<PhysicalSource> {
        self.shared.frame.read().consumed.iter().copied().collect()
    }

    /// Return every binding to neutral (not pressed, toggle off, knobs at 0)
    pub fn reset_all(&mut self) {
        self.rebuild_runtime();
        let mut frame = self.shared.frame.write();
        frame.values.iter_mut().for_each(|value| *value = 0.0);
    }

    /// Number of ticks run
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Total callbacks invoked
    pub fn dispatched(&self) -> u64 {
        self.dispatcher.dispatched()
    }
}
