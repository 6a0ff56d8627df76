use std::fmt;

/// Lifecycle of a single upload or download attempt.
///
/// ```text
/// Init -> ContainerChecked -> InFlight -> Completed
///   |            |               |
///   +------------+---------------+--> Failed
/// ```
///
/// `Completed` and `Failed` are terminal. There is no retry transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferState {
    Init,
    ContainerChecked,
    InFlight,
    Completed,
    Failed,
}

impl TransferState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn can_transition_to(self, next: Self) -> bool {
        use TransferState::*;
        matches!(
            (self, next),
            (Init, ContainerChecked)
                | (ContainerChecked, InFlight)
                | (InFlight, Completed)
                | (Init | ContainerChecked | InFlight, Failed)
        )
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Init => "init",
            Self::ContainerChecked => "container-checked",
            Self::InFlight => "in-flight",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Which way bytes move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Upload,
    Download,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upload => f.write_str("upload"),
            Self::Download => f.write_str("download"),
        }
    }
}

/// Tracks one attempt's state and logs each transition.
#[derive(Debug)]
pub(crate) struct Attempt {
    direction: Direction,
    target: String,
    state: TransferState,
}

impl Attempt {
    pub(crate) fn new(direction: Direction, target: String) -> Self {
        Self {
            direction,
            target,
            state: TransferState::Init,
        }
    }

    pub(crate) fn state(&self) -> TransferState {
        self.state
    }

    pub(crate) fn advance(&mut self, next: TransferState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid transfer transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(
            direction = %self.direction,
            target = %self.target,
            from = %self.state,
            to = %next,
            "transfer state"
        );
        self.state = next;
    }

    /// Mark the attempt failed and pass the error through.
    pub(crate) fn fail<E>(&mut self, err: E) -> E {
        self.advance(TransferState::Failed);
        err
    }
}
