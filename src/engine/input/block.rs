// Consumed-source resolution
//
// A block flag only matters under the `Manual` consume policy. `Always`
// consumes unconditionally and `Never` passes everything through, whatever
// plugins set.

use super::config::{ActionLayout, ConsumePolicy};
use super::registry::Registry;
use super::source::PhysicalSource;
use std::collections::HashSet;

/// Whether an action's sources are consumed this tick
pub fn consumes(policy: ConsumePolicy, blocked: bool) -> bool {
    match policy {
        ConsumePolicy::Never => false,
        ConsumePolicy::Always => true,
        ConsumePolicy::Manual => blocked,
    }
}

/// Physical sources the host must not interpret this tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsumedSet {
    sources: HashSet<PhysicalSource>,
}

impl ConsumedSet {
    /// Resolve from the layout's policies and the registry's block flags
    pub fn resolve(layout: &ActionLayout, registry: &Registry) -> Self {
        let mut sources = HashSet::new();
        for (_, entry) in layout.iter() {
            let blocked = registry.is_blocked(entry.name().as_str());
            if consumes(entry.consume_policy(), blocked) {
                sources.extend(entry.sources());
            }
        }
        Self { sources }
    }

    pub fn contains(&self, source: PhysicalSource) -> bool {
        self.sources.contains(&source)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhysicalSource> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
