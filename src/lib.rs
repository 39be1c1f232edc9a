//! # DFA_Minimizer
//!
//! `dfa_minimizer` crate provides a convenient way to simulate deterministic finite automata and
//! to compute their minimal equivalents.
//!
//! The core lives in [`automaton`] and is generic over state and symbol types. [`wire`],
//! [`service`] and [`catalog`] expose it through the JSON format used by the command line tool
//! and the Python bindings.

pub mod automaton;
pub mod catalog;
pub mod config;
pub mod error;
mod minimizer;
pub mod service;
pub mod table;
pub mod telemetry;
pub mod wire;

pub use automaton::{Automaton, SimulationHalt, SimulationResult, State, Symbol};
pub use error::{Error, Result, ValidationError};

#[cfg(feature = "python-bindings")]
mod python_bindings;
