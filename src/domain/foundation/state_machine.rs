//! Validated transitions for status enums.
//!
//! `RunState` implements this so the run driver can only move a run along
//! edges the remote lifecycle allows.

use super::ValidationError;

/// A status enum whose values form a finite state machine.
///
/// Implementors list the legal edges; `transition_to` rejects the rest.
///
/// ```ignore
/// let state = RunState::Created.transition_to(RunState::InProgress)?;
/// assert!(!state.is_terminal());
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Whether `self -> target` is a legal edge.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Every state reachable in one step.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Moves to `target`, or reports the illegal edge.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if !self.can_transition_to(&target) {
            return Err(ValidationError::invalid_transition(format!(
                "{:?} -> {:?} is not a legal transition",
                self, target
            )));
        }
        Ok(target)
    }

    /// A state with no outgoing edges.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Light {
        Off,
        On,
        Broken,
    }

    impl StateMachine for Light {
        fn can_transition_to(&self, target: &Self) -> bool {
            use Light::*;
            matches!((self, target), (Off, On) | (On, Off) | (On, Broken))
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use Light::*;
            match self {
                Off => vec![On],
                On => vec![Off, Broken],
                Broken => vec![],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_valid_transition() {
        assert_eq!(Light::Off.transition_to(Light::On), Ok(Light::On));
    }

    #[test]
    fn transition_to_fails_for_invalid_transition() {
        let err = Light::Off.transition_to(Light::Broken).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTransition { .. }));
    }

    #[test]
    fn is_terminal_only_for_sink_states() {
        assert!(Light::Broken.is_terminal());
        assert!(!Light::On.is_terminal());
    }
}
