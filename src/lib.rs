//! Simulates networks of flip-flop and conjunction modules exchanging high
//! and low pulses, and analyses how often a network's sink fires.

pub mod analysis;
pub mod config;
pub mod error;
pub mod logging;
pub mod module;
pub mod network;
pub mod parse;

pub use analysis::{count_over_n_iterations, decompose, find_common_period, SubNetwork};
pub use config::SolveConfig;
pub use error::{DecomposeError, Error, ParseError, PeriodError};
pub use module::{Module, ModuleKind, Pulse};
pub use network::{Network, PulseTally, StateSnapshot};
pub use parse::parse_network;
