use std::collections::VecDeque;

use fxhash::{FxHashMap, FxHashSet};
use tracing::{debug, info};

use crate::{
    config::SolveConfig,
    error::{DecomposeError, Error, PeriodError},
    module::{Module, ModuleKind, BROADCASTER},
    network::{ModuleStates, Network},
};

/// Name of the terminal inserted at the exit of every sub-network.
pub const SINK: &str = "sink";

/// Presses the button `n` times on the same network and multiplies the total
/// number of high pulses by the total number of low pulses.
pub fn count_over_n_iterations(network: &mut Network, n: usize) -> usize {
    let mut num_pulses = [0, 0];

    for _ in 0..n {
        let snapshot = network.push_button();
        num_pulses[0] += snapshot.tally.total_low();
        num_pulses[1] += snapshot.tally.total_high();
    }

    num_pulses[0] * num_pulses[1]
}

/// The first output, in input order, that doesn't name a module.
pub fn find_sink(network: &Network) -> Option<&str> {
    network
        .modules()
        .flat_map(|m| m.outputs())
        .find(|dest| !network.contains(dest))
        .map(String::as_str)
}

/// Where the branches meet. When a single conjunction feeds the sink it
/// aggregates all branches and is cut off with the sink; otherwise the
/// branches run straight into the sink.
pub fn convergence_point<'a>(network: &'a Network, sink: &'a str) -> &'a str {
    let mut feeders = network
        .modules()
        .filter(|m| m.outputs().iter().any(|dest| dest == sink));

    match (feeders.next(), feeders.next()) {
        (Some(m), None) if m.kind() == ModuleKind::Conjunction => m.name(),
        _ => sink,
    }
}

/// Modules reachable from `entry` without passing through `boundary` or the
/// broadcaster, in breadth-first order.
pub fn find_subgraph_nodes(network: &Network, entry: &str, boundary: &str) -> Vec<String> {
    let mut seen = FxHashSet::default();
    let mut nodes = vec![];
    let mut todo = VecDeque::from([entry]);

    while let Some(name) = todo.pop_front() {
        if name == boundary || name == BROADCASTER || !seen.insert(name) {
            continue;
        }

        let Some(module) = network.get(name) else {
            continue;
        };

        nodes.push(name.to_string());
        todo.extend(module.outputs().iter().map(String::as_str));
    }

    nodes
}

/// A branch of the network, cut loose with its own broadcaster and sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubNetwork {
    /// The broadcaster output this branch hangs off.
    pub entry: String,
    pub network: Network,
}

/// Copies the given branch modules into a fresh network fed by a local
/// broadcaster, redirecting every edge into `boundary` to a local [`SINK`].
pub fn construct_subnetwork(
    network: &Network,
    entry: &str,
    nodes: &[String],
    boundary: &str,
) -> Result<SubNetwork, DecomposeError> {
    let mut sub = Network::new();
    sub.insert(Module::broadcaster(BROADCASTER, vec![entry.to_string()]));

    let mut exits = 0;
    for module in nodes.iter().filter_map(|name| network.get(name)) {
        let mut module = module.clone();

        for dest in module.outputs_mut() {
            if *dest == boundary {
                *dest = SINK.to_string();
                exits += 1;
            }
        }

        sub.insert(module);
    }

    if exits == 0 {
        return Err(DecomposeError::NoEdgeIntoSink {
            entry: entry.to_string(),
        });
    }

    sub.insert(Module::sink(SINK));
    sub.retain_known_inputs();

    Ok(SubNetwork {
        entry: entry.to_string(),
        network: sub,
    })
}

/// Splits the network into one sub-network per broadcaster output.
///
/// Each branch must reach the sink on its own and share no module with any
/// other branch.
pub fn decompose(
    network: &Network,
    sink: Option<&str>,
) -> Result<Vec<SubNetwork>, DecomposeError> {
    let sink = match sink {
        Some(sink) => sink,
        None => find_sink(network).ok_or(DecomposeError::NoSink)?,
    };
    let broadcaster = network
        .get(BROADCASTER)
        .ok_or(DecomposeError::NoBroadcaster)?;

    if broadcaster.outputs().is_empty() {
        return Err(DecomposeError::NoBranches);
    }

    let boundary = convergence_point(network, sink);
    info!(sink, boundary, "decomposing network");

    let mut claimed: FxHashMap<String, &str> = FxHashMap::default();
    let mut subs = vec![];

    for entry in broadcaster.outputs() {
        let nodes = find_subgraph_nodes(network, entry, boundary);

        for node in &nodes {
            if let Some(first) = claimed.insert(node.clone(), entry) {
                return Err(DecomposeError::OverlappingBranches {
                    module: node.clone(),
                    first: first.to_string(),
                    second: entry.clone(),
                });
            }
        }

        let sub = construct_subnetwork(network, entry, &nodes, boundary)?;
        debug!(%entry, modules = nodes.len(), "constructed sub-network");
        subs.push(sub);
    }

    Ok(subs)
}

/// Presses the button until the local sink sees its first high pulse and
/// returns how many presses that took.
pub fn find_period(sub: &mut SubNetwork, max_presses: usize) -> Result<u64, PeriodError> {
    for presses in 1..=max_presses {
        let snapshot = sub.network.push_button();

        if snapshot.tally.high_to(SINK) == 1 {
            info!(entry = %sub.entry, period = presses, "found period");
            return Ok(presses as u64);
        }
    }

    Err(PeriodError::IterationCeiling {
        target: sub.entry.clone(),
        ceiling: max_presses,
    })
}

pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// `None` on overflow.
pub fn lcm(a: u64, b: u64) -> Option<u64> {
    if a == 0 || b == 0 {
        return Some(0);
    }

    (a / gcd(a, b)).checked_mul(b)
}

pub fn lcm_all(periods: impl IntoIterator<Item = u64>) -> Option<u64> {
    periods.into_iter().try_fold(1, lcm)
}

/// First press at which every branch fires together: the LCM of the branch
/// periods.
pub fn find_common_period(network: &Network, config: &SolveConfig) -> Result<u64, Error> {
    let mut periods = vec![];

    for mut sub in decompose(network, config.sink.as_deref())? {
        periods.push(find_period(&mut sub, config.max_presses)?);
    }

    Ok(lcm_all(periods).ok_or(PeriodError::Overflow)?)
}

/// The module state seen after press `first_seen` shows up again after press
/// `repeat_at`. Press 0 is the state before any press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateCycle {
    pub first_seen: usize,
    pub repeat_at: usize,
}

impl StateCycle {
    pub fn length(&self) -> usize {
        self.repeat_at - self.first_seen
    }
}

/// Presses the button until the network returns to a state it was in before.
pub fn find_state_cycle(
    network: &mut Network,
    max_presses: usize,
) -> Result<StateCycle, PeriodError> {
    let mut seen: FxHashMap<ModuleStates, usize> = FxHashMap::default();
    seen.insert(network.states(), 0);

    for presses in 1..=max_presses {
        let snapshot = network.push_button();

        if let Some(&first_seen) = seen.get(&snapshot.states) {
            return Ok(StateCycle {
                first_seen,
                repeat_at: presses,
            });
        }

        seen.insert(snapshot.states, presses);
    }

    Err(PeriodError::IterationCeiling {
        target: BROADCASTER.to_string(),
        ceiling: max_presses,
    })
}
