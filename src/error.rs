use thiserror::Error;

/// Malformed input. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line}: expected `<name> -> <outputs>`, got {text:?}")]
    MissingArrow { line: usize, text: String },

    #[error("line {line}: unknown module prefix {prefix:?}")]
    UnknownPrefix { line: usize, prefix: char },

    #[error("line {line}: module {name:?} is defined twice")]
    DuplicateModule { line: usize, name: String },

    #[error("line {line}: could not parse {text:?}")]
    Syntax { line: usize, text: String },
}

/// The network isn't shaped as independent chains converging on one sink.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecomposeError {
    #[error("no output leads out of the network, cannot find a sink")]
    NoSink,

    #[error("network has no broadcaster")]
    NoBroadcaster,

    #[error("broadcaster has no outputs")]
    NoBranches,

    #[error("branch starting at {entry:?} never reaches the sink")]
    NoEdgeIntoSink { entry: String },

    #[error("module {module:?} is reachable from both {first:?} and {second:?}")]
    OverlappingBranches {
        module: String,
        first: String,
        second: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    #[error("no result for {target:?} within {ceiling} button presses")]
    IterationCeiling { target: String, ceiling: usize },

    #[error("combined period does not fit in 64 bits")]
    Overflow,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Decompose(#[from] DecomposeError),

    #[error(transparent)]
    Period(#[from] PeriodError),

    #[error("could not read input: {0}")]
    Io(#[from] std::io::Error),
}
