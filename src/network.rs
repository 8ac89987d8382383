use std::collections::{BTreeMap, VecDeque};

use fxhash::{FxBuildHasher, FxHashMap, FxHashSet};
use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::module::{Module, Pulse, BROADCASTER, BUTTON, LOW};

/// High/low pulse counts per destination, indexed by `value as usize`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PulseTally {
    counts: FxHashMap<String, [usize; 2]>,
}

impl PulseTally {
    pub fn record(&mut self, pulse: &Pulse) {
        self.counts.entry(pulse.to.clone()).or_default()[pulse.value as usize] += 1;
    }

    pub fn high_to(&self, name: &str) -> usize {
        self.counts.get(name).map_or(0, |c| c[1])
    }

    pub fn low_to(&self, name: &str) -> usize {
        self.counts.get(name).map_or(0, |c| c[0])
    }

    pub fn total_high(&self) -> usize {
        self.counts.values().map(|c| c[1]).sum()
    }

    pub fn total_low(&self) -> usize {
        self.counts.values().map(|c| c[0]).sum()
    }
}

/// Flip-flop states and conjunction memories, ordered by name so that two
/// states of the same network compare and hash consistently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleStates {
    pub flip_flops: BTreeMap<String, bool>,
    pub conjunctions: BTreeMap<String, BTreeMap<String, bool>>,
}

/// What the network looked like after one fully settled button press.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub states: ModuleStates,
    pub tally: PulseTally,
}

// Two presses that end in the same module state are equal, whatever they
// sent on the way there.
impl PartialEq for StateSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.states == other.states
    }
}

impl Eq for StateSnapshot {}

/// The sole owner of all modules, keyed by name in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Network {
    modules: IndexMap<String, Module, FxBuildHasher>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a module, returning the one it replaced.
    pub fn insert(&mut self, module: Module) -> Option<Module> {
        self.modules.insert(module.name().to_string(), module)
    }

    pub fn remove(&mut self, name: &str) -> Option<Module> {
        self.modules.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Module> {
        self.modules.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    /// Gives every conjunction a low memory slot for each module that lists
    /// it as an output. Must run before the first button press.
    pub fn connect_conjunction_inputs(&mut self) {
        let edges = self
            .modules()
            .flat_map(|m| m.outputs().iter().map(|dest| (m.name().to_string(), dest.clone())))
            .collect::<Vec<_>>();

        for (source, dest) in edges {
            if let Some(module) = self.modules.get_mut(&dest) {
                module.connect_input(&source);
            }
        }
    }

    /// Drops conjunction memory slots for inputs that are no longer part of
    /// this network.
    pub fn retain_known_inputs(&mut self) {
        let names = self.modules.keys().cloned().collect::<FxHashSet<_>>();

        for module in self.modules.values_mut() {
            if let Module::Conjunction { memory, .. } = module {
                memory.retain(|input, _| names.contains(input));
            }
        }
    }

    /// Delivers one pulse. Pulses into names that aren't modules leave the
    /// network and are dropped.
    pub fn propagate(&mut self, pulse: &Pulse) -> Vec<Pulse> {
        match self.modules.get_mut(&pulse.to) {
            Some(module) => module.propagate(pulse),
            None => vec![],
        }
    }

    pub fn push_button(&mut self) -> StateSnapshot {
        self.push_button_traced(|_| {})
    }

    /// Runs one button press to completion, handing every delivered pulse to
    /// `on_pulse` in delivery order.
    ///
    /// Pulses are processed strictly first in, first out: a conjunction must
    /// see every pulse of one wave before any pulse of the next.
    pub fn push_button_traced<F>(&mut self, mut on_pulse: F) -> StateSnapshot
    where
        F: FnMut(&Pulse),
    {
        let mut pulses = VecDeque::from([Pulse::new(BUTTON, BROADCASTER, LOW)]);
        let mut tally = PulseTally::default();

        while let Some(pulse) = pulses.pop_front() {
            trace!("{pulse}");
            on_pulse(&pulse);
            tally.record(&pulse);
            pulses.extend(self.propagate(&pulse));
        }

        debug!(
            high = tally.total_high(),
            low = tally.total_low(),
            "button press settled"
        );

        StateSnapshot {
            states: self.states(),
            tally,
        }
    }

    pub fn states(&self) -> ModuleStates {
        let mut states = ModuleStates::default();

        for module in self.modules() {
            match module {
                Module::FlipFlop { name, on, .. } => {
                    states.flip_flops.insert(name.clone(), *on);
                }
                Module::Conjunction { name, memory, .. } => {
                    states.conjunctions.insert(
                        name.clone(),
                        memory.iter().map(|(k, v)| (k.clone(), *v)).collect(),
                    );
                }
                Module::Broadcaster { .. } | Module::Sink { .. } => {}
            }
        }

        states
    }
}
