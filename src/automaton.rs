//! Deterministic finite automata over opaque, comparable states and symbols.
//!
//! An [`Automaton`] is validated once at construction and is immutable afterwards, with one
//! exception: [`Automaton::remove_unreachable_states`] rewrites the receiver in place. Every
//! other transformation ([`Clone`], [`Automaton::minimize`]) returns a new, independent value.

use std::fmt::{self, Debug, Display};
use std::hash::Hash;

use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use thiserror::Error;

use crate::error::{Result, ValidationError};

/// Identifier of a node of an automaton.
pub trait State: Clone + Eq + Hash + Ord + Debug + Display {
    /// Name given to the `index`-th state of a rebuilt automaton.
    fn canonical(index: usize) -> Self;
}

impl State for String {
    fn canonical(index: usize) -> Self {
        format!("q{index}")
    }
}

macro_rules! impl_integer_state {
    ($($ty:ty),*) => {
        $(
            impl State for $ty {
                fn canonical(index: usize) -> Self {
                    // indices count groups of distinct states, so they never exceed MAX
                    <$ty>::try_from(index).unwrap_or(<$ty>::MAX)
                }
            }
        )*
    };
}

impl_integer_state!(u16, u32, u64, usize);

/// An input token of an automaton.
pub trait Symbol: Clone + Eq + Hash + Ord + Debug + Display {}

impl<T> Symbol for T where T: Clone + Eq + Hash + Ord + Debug + Display {}

/// Why a simulation stopped before consuming all of its input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulationHalt<S, A> {
    #[error("Symbol '{symbol}' not in alphabet")]
    SymbolNotInAlphabet { symbol: A },
    #[error("No transition from state '{state}' on symbol '{symbol}'")]
    NoTransitionDefined { state: S, symbol: A },
}

/// Outcome of running an automaton over one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationResult<S, A> {
    pub accepted: bool,
    /// Visited states, starting with the start state.
    pub path: Vec<S>,
    pub final_state: S,
    /// Set only when the input was not fully consumed.
    pub error: Option<SimulationHalt<S, A>>,
}

impl<S, A> SimulationResult<S, A> {
    fn halted(path: Vec<S>, final_state: S, halt: SimulationHalt<S, A>) -> Self {
        Self {
            accepted: false,
            path,
            final_state,
            error: Some(halt),
        }
    }

    pub fn is_halted(&self) -> bool {
        self.error.is_some()
    }
}

/// A deterministic finite automaton with a possibly partial transition function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton<S: State = String, A: Symbol = char> {
    states: HashSet<S>,
    alphabet: HashSet<A>,
    // source -> symbol -> target, inner maps are never empty
    transitions: HashMap<S, HashMap<A, S>>,
    start: S,
    accept: HashSet<S>,
}

impl<S: State, A: Symbol> Automaton<S, A> {
    /// Builds an automaton from owned copies of the given collections.
    ///
    /// When `transitions` yields the same `(state, symbol)` pair more than once, the last target
    /// wins.
    pub fn new<Q, Y, T, F>(
        states: Q,
        alphabet: Y,
        transitions: T,
        start: S,
        accept: F,
    ) -> Result<Self, ValidationError>
    where
        Q: IntoIterator<Item = S>,
        Y: IntoIterator<Item = A>,
        T: IntoIterator<Item = ((S, A), S)>,
        F: IntoIterator<Item = S>,
    {
        let mut transition_map: HashMap<S, HashMap<A, S>> = HashMap::default();
        for ((state, symbol), next_state) in transitions {
            transition_map
                .entry(state)
                .or_default()
                .insert(symbol, next_state);
        }
        let automaton = Self {
            states: states.into_iter().collect(),
            alphabet: alphabet.into_iter().collect(),
            transitions: transition_map,
            start,
            accept: accept.into_iter().collect(),
        };
        automaton.validate()?;
        Ok(automaton)
    }

    /// Checks the structural invariants, reporting the first violation found.
    ///
    /// Transitions are checked in sorted order so the reported offender is stable.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.states.contains(&self.start) {
            return Err(ValidationError::StartNotInStates(self.start.to_string()));
        }
        let mut stray: Vec<&S> = self
            .accept
            .iter()
            .filter(|state| !self.states.contains(*state))
            .collect();
        if !stray.is_empty() {
            stray.sort();
            return Err(ValidationError::AcceptNotSubset(join(&stray)));
        }
        for (state, symbol, next_state) in self.sorted_transitions() {
            if !self.states.contains(state) {
                return Err(ValidationError::BadTransitionState(state.to_string()));
            }
            if !self.alphabet.contains(symbol) {
                return Err(ValidationError::BadTransitionSymbol(symbol.to_string()));
            }
            if !self.states.contains(next_state) {
                return Err(ValidationError::BadTransitionState(next_state.to_string()));
            }
        }
        Ok(())
    }

    pub fn states(&self) -> &HashSet<S> {
        &self.states
    }

    pub fn alphabet(&self) -> &HashSet<A> {
        &self.alphabet
    }

    pub fn start_state(&self) -> &S {
        &self.start
    }

    pub fn accept_states(&self) -> &HashSet<S> {
        &self.accept
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn num_transitions(&self) -> usize {
        self.transitions.values().map(|moves| moves.len()).sum()
    }

    pub fn is_accept_state(&self, state: &S) -> bool {
        self.accept.contains(state)
    }

    pub fn transition(&self, state: &S, symbol: &A) -> Option<&S> {
        self.transitions.get(state)?.get(symbol)
    }

    /// All transitions as `(source, symbol, target)`, in no particular order.
    pub fn transitions(&self) -> impl Iterator<Item = (&S, &A, &S)> + '_ {
        self.transitions.iter().flat_map(|(state, moves)| {
            moves
                .iter()
                .map(move |(symbol, next_state)| (state, symbol, next_state))
        })
    }

    pub fn sorted_states(&self) -> Vec<&S> {
        let mut states: Vec<&S> = self.states.iter().collect();
        states.sort();
        states
    }

    pub fn sorted_alphabet(&self) -> Vec<&A> {
        let mut alphabet: Vec<&A> = self.alphabet.iter().collect();
        alphabet.sort();
        alphabet
    }

    pub fn sorted_accept_states(&self) -> Vec<&S> {
        let mut accept: Vec<&S> = self.accept.iter().collect();
        accept.sort();
        accept
    }

    pub fn sorted_transitions(&self) -> Vec<(&S, &A, &S)> {
        let mut transitions: Vec<(&S, &A, &S)> = self.transitions().collect();
        transitions.sort();
        transitions
    }

    /// Runs the automaton over `input`, recording every visited state.
    ///
    /// Unknown symbols and missing transitions halt the run without consuming the offending
    /// symbol; the result is then rejected and carries the reason in `error`.
    pub fn simulate<I>(&self, input: I) -> SimulationResult<S, A>
    where
        I: IntoIterator<Item = A>,
    {
        let mut current_state = &self.start;
        let mut path = vec![current_state.clone()];
        for symbol in input {
            if !self.alphabet.contains(&symbol) {
                return SimulationResult::halted(
                    path,
                    current_state.clone(),
                    SimulationHalt::SymbolNotInAlphabet { symbol },
                );
            }
            current_state = match self.transition(current_state, &symbol) {
                Some(next_state) => next_state,
                None => {
                    return SimulationResult::halted(
                        path,
                        current_state.clone(),
                        SimulationHalt::NoTransitionDefined {
                            state: current_state.clone(),
                            symbol,
                        },
                    )
                }
            };
            path.push(current_state.clone());
        }
        SimulationResult {
            accepted: self.accept.contains(current_state),
            path,
            final_state: current_state.clone(),
            error: None,
        }
    }

    pub fn accepts<I>(&self, input: I) -> bool
    where
        I: IntoIterator<Item = A>,
    {
        self.simulate(input).accepted
    }

    /// Whether every state has a transition on every symbol.
    pub fn is_complete(&self) -> bool {
        self.states.iter().all(|state| {
            self.alphabet
                .iter()
                .all(|symbol| self.transition(state, symbol).is_some())
        })
    }

    pub fn reachable_states(&self) -> HashSet<S> {
        let mut reachable: HashSet<S> = HashSet::default();
        let mut stack: Vec<&S> = vec![&self.start];
        while let Some(state) = stack.pop() {
            if !reachable.insert(state.clone()) {
                continue;
            }
            if let Some(moves) = self.transitions.get(state) {
                stack.extend(
                    moves
                        .values()
                        .filter(|next_state| !reachable.contains(*next_state)),
                );
            }
        }
        reachable
    }

    /// Drops every state not reachable from the start state, in place.
    pub fn remove_unreachable_states(&mut self) {
        let reachable = self.reachable_states();
        self.accept.retain(|state| reachable.contains(state));
        self.transitions.retain(|state, moves| {
            if !reachable.contains(state) {
                return false;
            }
            moves.retain(|_, next_state| reachable.contains(next_state));
            !moves.is_empty()
        });
        self.states = reachable;
    }

    /// One `δ(state, symbol) = next` line per transition, sorted.
    pub fn format_transitions(&self) -> Vec<String> {
        self.sorted_transitions()
            .into_iter()
            .map(|(state, symbol, next_state)| format!("δ({state}, {symbol}) = {next_state}"))
            .collect()
    }

    /// Assembles an automaton whose invariants the caller already guarantees.
    pub(crate) fn from_parts(
        states: HashSet<S>,
        alphabet: HashSet<A>,
        transitions: HashMap<S, HashMap<A, S>>,
        start: S,
        accept: HashSet<S>,
    ) -> Self {
        let automaton = Self {
            states,
            alphabet,
            transitions,
            start,
            accept,
        };
        debug_assert!(automaton.validate().is_ok());
        automaton
    }
}

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl<S: State, A: Symbol> Display for Automaton<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Automaton with {} states over {{{}}}, start {}, accept {{{}}}:",
            self.states.len(),
            join(&self.sorted_alphabet()),
            self.start,
            join(&self.sorted_accept_states()),
        )?;
        for line in self.format_transitions() {
            writeln!(f, "  {line}")?;
        }
        Ok(())
    }
}
