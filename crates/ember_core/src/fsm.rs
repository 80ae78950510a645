//! State Machine Runtime
//!
//! Flat state machines keyed by small integer ids. Used for the scene
//! lifecycle (empty → loading → active → completing → empty) and anywhere
//! else a fixed transition table is clearer than ad-hoc flags.
//!
//! Events that have no transition from the current state are ignored; the
//! machine stays where it is and `send` reports the unchanged state.

use smallvec::SmallVec;

/// Identifier for a state within a state machine
pub type StateId = u32;

/// Identifier for an event type
pub type EventId = u32;

/// A transition in the state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from_state: StateId,
    pub event: EventId,
    pub to_state: StateId,
}

impl Transition {
    pub fn new(from: StateId, event: EventId, to: StateId) -> Self {
        Self {
            from_state: from,
            event,
            to_state: to,
        }
    }
}

/// Builder for creating state machines
pub struct StateMachineBuilder {
    initial_state: StateId,
    transitions: SmallVec<[Transition; 8]>,
}

impl StateMachineBuilder {
    pub fn new(initial_state: StateId) -> Self {
        Self {
            initial_state,
            transitions: SmallVec::new(),
        }
    }

    /// Add a simple transition (from, event, to)
    pub fn on(mut self, from: StateId, event: EventId, to: StateId) -> Self {
        self.transitions.push(Transition::new(from, event, to));
        self
    }

    pub fn build(self) -> StateMachine {
        StateMachine {
            current_state: self.initial_state,
            transitions: self.transitions,
        }
    }
}

/// A state machine instance
#[derive(Clone, Debug)]
pub struct StateMachine {
    current_state: StateId,
    transitions: SmallVec<[Transition; 8]>,
}

impl StateMachine {
    pub fn builder(initial_state: StateId) -> StateMachineBuilder {
        StateMachineBuilder::new(initial_state)
    }

    pub fn current_state(&self) -> StateId {
        self.current_state
    }

    pub fn is_in(&self, state: StateId) -> bool {
        self.current_state == state
    }

    /// Send an event, returning the state the machine ends up in
    pub fn send(&mut self, event: EventId) -> StateId {
        let current = self.current_state;
        let Some(to_state) = self.find(event) else {
            return current;
        };
        self.current_state = to_state;
        to_state
    }

    fn find(&self, event: EventId) -> Option<StateId> {
        self.transitions
            .iter()
            .find(|t| t.from_state == self.current_state && t.event == event)
            .map(|t| t.to_state)
    }
}
