//! State - リクエストごとの状態遷移
//!
//! # 状態遷移
//! - parsing → fetching → joining → hashing → publishing → responded(success)
//! - 終端以外のどの状態からも responded(failure) へ遷移できる
//! - responded に入った後は、どの遷移も受け付けない

use std::fmt;

use thiserror::Error;

/// How a request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReassemblyState {
    Parsing,
    Fetching,
    Joining,
    Hashing,
    Publishing,
    Responded(Completion),
}

impl ReassemblyState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Responded(_))
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(&self, next: ReassemblyState) -> bool {
        use ReassemblyState::*;
        match (self, next) {
            (Responded(_), _) => false,
            (_, Responded(Completion::Failure)) => true,
            (Parsing, Fetching)
            | (Fetching, Joining)
            | (Joining, Hashing)
            | (Hashing, Publishing)
            | (Publishing, Responded(Completion::Success)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ReassemblyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parsing => f.write_str("parsing"),
            Self::Fetching => f.write_str("fetching"),
            Self::Joining => f.write_str("joining"),
            Self::Hashing => f.write_str("hashing"),
            Self::Publishing => f.write_str("publishing"),
            Self::Responded(Completion::Success) => f.write_str("responded(success)"),
            Self::Responded(Completion::Failure) => f.write_str("responded(failure)"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid state transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: ReassemblyState,
    pub to: ReassemblyState,
}

/// Per-request state holder. Starts in `Parsing`.
#[derive(Debug)]
pub struct StateTracker {
    current: ReassemblyState,
}

impl StateTracker {
    pub fn new() -> Self {
        Self {
            current: ReassemblyState::Parsing,
        }
    }

    pub fn current(&self) -> ReassemblyState {
        self.current
    }

    pub fn advance(&mut self, next: ReassemblyState) -> Result<(), InvalidTransition> {
        if !self.current.can_transition_to(next) {
            return Err(InvalidTransition {
                from: self.current,
                to: next,
            });
        }
        tracing::debug!(from = %self.current, to = %next, "reassembly state transition");
        self.current = next;
        Ok(())
    }
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use super::ReassemblyState::*;

    #[test]
    fn happy_path_walks_every_stage() {
        let mut tracker = StateTracker::new();
        for next in [
            Fetching,
            Joining,
            Hashing,
            Publishing,
            Responded(Completion::Success),
        ] {
            tracker.advance(next).unwrap();
        }
        assert_eq!(tracker.current(), Responded(Completion::Success));
    }

    #[rstest]
    #[case::parsing(Parsing)]
    #[case::fetching(Fetching)]
    #[case::joining(Joining)]
    #[case::hashing(Hashing)]
    #[case::publishing(Publishing)]
    fn any_live_state_may_fail(#[case] from: ReassemblyState) {
        assert!(from.can_transition_to(Responded(Completion::Failure)));
    }

    #[test]
    fn responded_is_final() {
        let mut tracker = StateTracker::new();
        tracker.advance(Responded(Completion::Failure)).unwrap();

        let err = tracker.advance(Fetching).unwrap_err();
        assert_eq!(err.from, Responded(Completion::Failure));
        assert!(tracker.advance(Responded(Completion::Failure)).is_err());
        assert!(tracker.current().is_terminal());
    }

    #[test]
    fn stages_cannot_be_skipped() {
        let mut tracker = StateTracker::new();
        assert!(tracker.advance(Publishing).is_err());
        assert!(tracker.advance(Responded(Completion::Success)).is_err());
        assert_eq!(tracker.current(), Parsing);
    }
}
