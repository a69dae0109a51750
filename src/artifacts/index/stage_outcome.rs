use std::fmt;

/// Result of asking the index to stage a single path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Staged,
    Rejected(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The path is not in the index and the caller did not ask to add new paths
    PathNotTracked,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::PathNotTracked => {
                write!(f, "cannot add to the index - missing --add option?")
            }
        }
    }
}
