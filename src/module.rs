use std::fmt::Display;

use fxhash::FxHashMap;

pub const BUTTON: &str = "button";
pub const BROADCASTER: &str = "broadcaster";

pub const HIGH: bool = true;
pub const LOW: bool = false;

/// A single signal travelling along one edge of the network.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pulse {
    pub from: String,
    pub to: String,
    pub value: bool,
}

impl Pulse {
    pub fn new(from: impl Into<String>, to: impl Into<String>, value: bool) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            value,
        }
    }
}

impl Display for Pulse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = if self.value { "high" } else { "low" };
        write!(f, "{} -{}-> {}", self.from, value, self.to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    Broadcaster,
    FlipFlop,
    Conjunction,
    Sink,
}

impl ModuleKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            ModuleKind::FlipFlop => "%",
            ModuleKind::Conjunction => "&",
            ModuleKind::Broadcaster | ModuleKind::Sink => "",
        }
    }
}

/// A node of the network. Peers are referenced by name only, the owning
/// `Network` resolves them when a pulse is delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Module {
    Broadcaster {
        name: String,
        outputs: Vec<String>,
    },
    FlipFlop {
        name: String,
        outputs: Vec<String>,
        on: bool,
    },
    Conjunction {
        name: String,
        outputs: Vec<String>,
        memory: FxHashMap<String, bool>,
    },
    Sink {
        name: String,
        high: usize,
        low: usize,
    },
}

impl Module {
    pub fn broadcaster(name: impl Into<String>, outputs: Vec<String>) -> Self {
        Module::Broadcaster {
            name: name.into(),
            outputs,
        }
    }

    pub fn flip_flop(name: impl Into<String>, outputs: Vec<String>) -> Self {
        Module::FlipFlop {
            name: name.into(),
            outputs,
            on: false,
        }
    }

    pub fn conjunction(name: impl Into<String>, outputs: Vec<String>) -> Self {
        Module::Conjunction {
            name: name.into(),
            outputs,
            memory: FxHashMap::default(),
        }
    }

    pub fn sink(name: impl Into<String>) -> Self {
        Module::Sink {
            name: name.into(),
            high: 0,
            low: 0,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Module::Broadcaster { name, .. }
            | Module::FlipFlop { name, .. }
            | Module::Conjunction { name, .. }
            | Module::Sink { name, .. } => name,
        }
    }

    pub fn kind(&self) -> ModuleKind {
        match self {
            Module::Broadcaster { .. } => ModuleKind::Broadcaster,
            Module::FlipFlop { .. } => ModuleKind::FlipFlop,
            Module::Conjunction { .. } => ModuleKind::Conjunction,
            Module::Sink { .. } => ModuleKind::Sink,
        }
    }

    pub fn outputs(&self) -> &[String] {
        match self {
            Module::Broadcaster { outputs, .. }
            | Module::FlipFlop { outputs, .. }
            | Module::Conjunction { outputs, .. } => outputs,
            Module::Sink { .. } => &[],
        }
    }

    pub fn outputs_mut(&mut self) -> &mut [String] {
        match self {
            Module::Broadcaster { outputs, .. }
            | Module::FlipFlop { outputs, .. }
            | Module::Conjunction { outputs, .. } => outputs,
            Module::Sink { .. } => &mut [],
        }
    }

    /// Registers `source` as an input of a conjunction, remembering a low
    /// pulse for it. No-op for every other kind.
    pub fn connect_input(&mut self, source: &str) {
        if let Module::Conjunction { memory, .. } = self {
            memory.entry(source.to_string()).or_insert(LOW);
        }
    }

    /// Consumes one pulse addressed to this module and returns the pulses it
    /// sends out in response, in output order.
    pub fn propagate(&mut self, pulse: &Pulse) -> Vec<Pulse> {
        let value = match self {
            Module::Broadcaster { .. } => pulse.value,
            Module::FlipFlop { on, .. } => {
                if pulse.value == HIGH {
                    return vec![];
                }

                *on = !*on;
                *on
            }
            Module::Conjunction { memory, .. } => {
                memory.insert(pulse.from.clone(), pulse.value);

                // low only once every remembered input is high
                !memory.values().all(|&v| v)
            }
            Module::Sink { high, low, .. } => {
                if pulse.value {
                    *high += 1;
                } else {
                    *low += 1;
                }
                return vec![];
            }
        };

        let name = self.name();
        self.outputs()
            .iter()
            .map(|dest| Pulse::new(name, dest.as_str(), value))
            .collect()
    }
}

impl Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{} -> {}",
            self.kind().prefix(),
            self.name(),
            self.outputs().join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn broadcaster_forwards_unchanged() {
        let mut b = Module::broadcaster(BROADCASTER, outs(&["a", "b"]));

        assert_eq!(
            b.propagate(&Pulse::new(BUTTON, BROADCASTER, LOW)),
            vec![
                Pulse::new(BROADCASTER, "a", LOW),
                Pulse::new(BROADCASTER, "b", LOW),
            ]
        );
        assert_eq!(
            b.propagate(&Pulse::new(BUTTON, BROADCASTER, HIGH)),
            vec![
                Pulse::new(BROADCASTER, "a", HIGH),
                Pulse::new(BROADCASTER, "b", HIGH),
            ]
        );
    }

    #[test]
    fn flip_flop_ignores_high() {
        let mut ff = Module::flip_flop("a", outs(&["b"]));
        let before = ff.clone();

        assert_eq!(ff.propagate(&Pulse::new("x", "a", HIGH)), vec![]);
        assert_eq!(ff, before);
    }

    #[test]
    fn flip_flop_two_lows_return_to_start() {
        let mut ff = Module::flip_flop("a", outs(&["b"]));
        let before = ff.clone();

        let first = ff.propagate(&Pulse::new("x", "a", LOW));
        let second = ff.propagate(&Pulse::new("x", "a", LOW));

        assert_eq!(first, vec![Pulse::new("a", "b", HIGH)]);
        assert_eq!(second, vec![Pulse::new("a", "b", LOW)]);
        assert_eq!(ff, before);
    }

    #[test]
    fn conjunction_is_inverted_and() {
        let mut con = Module::conjunction("con", outs(&["x", "y"]));
        con.connect_input("a");
        con.connect_input("b");

        // a high, b still low
        assert_eq!(
            con.propagate(&Pulse::new("a", "con", HIGH)),
            vec![Pulse::new("con", "x", HIGH), Pulse::new("con", "y", HIGH)]
        );

        // both high
        assert_eq!(
            con.propagate(&Pulse::new("b", "con", HIGH)),
            vec![Pulse::new("con", "x", LOW), Pulse::new("con", "y", LOW)]
        );

        // a drops back
        assert_eq!(
            con.propagate(&Pulse::new("a", "con", LOW)),
            vec![Pulse::new("con", "x", HIGH), Pulse::new("con", "y", HIGH)]
        );
    }

    #[test]
    fn conjunction_remembers_unknown_sender() {
        let mut con = Module::conjunction("con", outs(&["x"]));

        assert_eq!(
            con.propagate(&Pulse::new("z", "con", HIGH)),
            vec![Pulse::new("con", "x", LOW)]
        );
    }

    #[test]
    fn connect_input_keeps_existing_memory() {
        let mut con = Module::conjunction("con", outs(&["x"]));
        con.connect_input("a");
        con.propagate(&Pulse::new("a", "con", HIGH));
        con.connect_input("a");

        let Module::Conjunction { memory, .. } = &con else {
            unreachable!()
        };
        assert_eq!(memory.get("a"), Some(&HIGH));
    }

    #[test]
    fn sink_counts_and_absorbs() {
        let mut sink = Module::sink("rx");

        assert_eq!(sink.propagate(&Pulse::new("a", "rx", HIGH)), vec![]);
        assert_eq!(sink.propagate(&Pulse::new("a", "rx", LOW)), vec![]);
        assert_eq!(sink.propagate(&Pulse::new("a", "rx", LOW)), vec![]);

        assert_eq!(
            sink,
            Module::Sink {
                name: "rx".into(),
                high: 1,
                low: 2
            }
        );
        assert!(sink.outputs().is_empty());
    }

    #[test]
    fn display() {
        assert_eq!(Pulse::new("a", "b", HIGH).to_string(), "a -high-> b");
        assert_eq!(Pulse::new("a", "b", LOW).to_string(), "a -low-> b");
        assert_eq!(
            Module::conjunction("inv", outs(&["a", "b"])).to_string(),
            "&inv -> a, b"
        );
    }
}
