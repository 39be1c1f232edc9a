//! Provides tools and interfaces to integrate the crate's functionality with Python.

use std::sync::{Arc, PoisonError, RwLock};

use bincode::{config, Decode, Encode};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use rustc_hash::FxHashMap as HashMap;

use crate::automaton::Automaton;
use crate::wire::{DfaDefinition, SimulateResponse, Transitions};

#[pyclass(name = "Automaton", module = "dfa_minimizer.dfa_minimizer_rs")]
#[derive(Clone, Debug)]
pub struct PyAutomaton(Arc<RwLock<Automaton>>);

/// Owned, order-stable image of an [`Automaton`] used for pickling.
#[derive(Debug, Encode, Decode)]
struct Snapshot {
    states: Vec<String>,
    alphabet: Vec<char>,
    transitions: Vec<(String, char, String)>,
    start: String,
    accept: Vec<String>,
}

impl From<&Automaton> for Snapshot {
    fn from(dfa: &Automaton) -> Self {
        Snapshot {
            states: dfa.sorted_states().into_iter().cloned().collect(),
            alphabet: dfa.sorted_alphabet().into_iter().copied().collect(),
            transitions: dfa
                .sorted_transitions()
                .into_iter()
                .map(|(from, symbol, to)| (from.clone(), *symbol, to.clone()))
                .collect(),
            start: dfa.start_state().clone(),
            accept: dfa.sorted_accept_states().into_iter().cloned().collect(),
        }
    }
}

impl TryFrom<Snapshot> for Automaton {
    type Error = crate::ValidationError;

    fn try_from(snapshot: Snapshot) -> Result<Self, Self::Error> {
        Automaton::new(
            snapshot.states,
            snapshot.alphabet,
            snapshot
                .transitions
                .into_iter()
                .map(|(from, symbol, to)| ((from, symbol), to)),
            snapshot.start,
            snapshot.accept,
        )
    }
}

fn map_poison_error_to_pyerr<G>(_: PoisonError<G>) -> PyErr {
    PyErr::new::<pyo3::exceptions::PyRuntimeError, _>("RwLock poisoned")
}

impl PyAutomaton {
    fn wrap(dfa: Automaton) -> Self {
        PyAutomaton(Arc::new(RwLock::new(dfa)))
    }
}

#[pymethods]
impl PyAutomaton {
    #[new]
    #[pyo3(signature = (states, alphabet, transitions, start_state, accept_states))]
    fn __new__(
        py: Python<'_>,
        states: Vec<String>,
        alphabet: Vec<String>,
        transitions: HashMap<(String, String), String>,
        start_state: String,
        accept_states: Vec<String>,
    ) -> PyResult<Self> {
        let definition = DfaDefinition {
            states,
            alphabet,
            transitions: Transitions::List(
                transitions
                    .into_iter()
                    .map(|((from, symbol), to)| vec![from, symbol, to])
                    .collect(),
            ),
            start_state,
            accept_states,
        };
        py.allow_threads(|| {
            definition
                .to_automaton()
                .map(PyAutomaton::wrap)
                .map_err(Into::into)
        })
    }

    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        let dfa = DfaDefinition::from_json(json)?.to_automaton()?;
        Ok(PyAutomaton::wrap(dfa))
    }

    fn to_json(&self) -> PyResult<String> {
        let dfa_guard = self.0.read().map_err(map_poison_error_to_pyerr)?;
        Ok(DfaDefinition::from(&*dfa_guard).to_json()?)
    }

    fn simulate<'py>(&self, py: Python<'py>, input: &str) -> PyResult<Bound<'py, PyAny>> {
        let dfa_guard = self.0.read().map_err(map_poison_error_to_pyerr)?;
        let response = SimulateResponse::from(dfa_guard.simulate(input.chars()));
        Ok(serde_pyobject::to_pyobject(py, &response)?)
    }

    fn accepts(&self, input: &str) -> PyResult<bool> {
        let dfa_guard = self.0.read().map_err(map_poison_error_to_pyerr)?;
        Ok(dfa_guard.accepts(input.chars()))
    }

    fn is_complete(&self) -> PyResult<bool> {
        let dfa_guard = self.0.read().map_err(map_poison_error_to_pyerr)?;
        Ok(dfa_guard.is_complete())
    }

    fn get_states(&self) -> PyResult<Vec<String>> {
        let dfa_guard = self.0.read().map_err(map_poison_error_to_pyerr)?;
        Ok(dfa_guard.sorted_states().into_iter().cloned().collect())
    }

    fn get_start_state(&self) -> PyResult<String> {
        let dfa_guard = self.0.read().map_err(map_poison_error_to_pyerr)?;
        Ok(dfa_guard.start_state().clone())
    }

    fn get_accept_states(&self) -> PyResult<Vec<String>> {
        let dfa_guard = self.0.read().map_err(map_poison_error_to_pyerr)?;
        Ok(dfa_guard.sorted_accept_states().into_iter().cloned().collect())
    }

    fn get_next_state(&self, state: String, symbol: char) -> PyResult<Option<String>> {
        let dfa_guard = self.0.read().map_err(map_poison_error_to_pyerr)?;
        Ok(dfa_guard.transition(&state, &symbol).cloned())
    }

    fn reachable_states(&self) -> PyResult<Vec<String>> {
        let dfa_guard = self.0.read().map_err(map_poison_error_to_pyerr)?;
        let mut reachable: Vec<String> = dfa_guard.reachable_states().into_iter().collect();
        reachable.sort();
        Ok(reachable)
    }

    fn remove_unreachable_states(&self) -> PyResult<()> {
        let mut dfa_guard = self.0.write().map_err(map_poison_error_to_pyerr)?;
        dfa_guard.remove_unreachable_states();
        Ok(())
    }

    fn minimize(&self) -> PyResult<Self> {
        let dfa_guard = self.0.read().map_err(map_poison_error_to_pyerr)?;
        Ok(PyAutomaton::wrap(dfa_guard.minimize()))
    }

    fn equivalent_state_groups(&self) -> PyResult<Vec<Vec<String>>> {
        let dfa_guard = self.0.read().map_err(map_poison_error_to_pyerr)?;
        Ok(dfa_guard.equivalent_state_groups())
    }

    fn format_transitions(&self) -> PyResult<Vec<String>> {
        let dfa_guard = self.0.read().map_err(map_poison_error_to_pyerr)?;
        Ok(dfa_guard.format_transitions())
    }

    fn __repr__(&self) -> PyResult<String> {
        let dfa_guard = self.0.read().map_err(map_poison_error_to_pyerr)?;
        Ok(format!("{:#?}", *dfa_guard))
    }

    fn __str__(&self) -> PyResult<String> {
        let dfa_guard = self.0.read().map_err(map_poison_error_to_pyerr)?;
        Ok(format!("{}", *dfa_guard))
    }

    fn __eq__(&self, other: &PyAutomaton) -> PyResult<bool> {
        if Arc::ptr_eq(&self.0, &other.0) {
            return Ok(true);
        }
        let self_guard = self.0.read().map_err(map_poison_error_to_pyerr)?;
        let other_guard = other.0.read().map_err(map_poison_error_to_pyerr)?;
        Ok(*self_guard == *other_guard)
    }

    fn __deepcopy__(&self, _py: Python<'_>, _memo: Py<PyDict>) -> PyResult<Self> {
        let dfa_guard = self.0.read().map_err(map_poison_error_to_pyerr)?;
        Ok(PyAutomaton::wrap(dfa_guard.clone()))
    }

    fn __reduce__(&self) -> PyResult<(PyObject, (Vec<u8>,))> {
        Python::with_gil(|py| {
            let cls =
                PyModule::import(py, "dfa_minimizer.dfa_minimizer_rs")?.getattr("Automaton")?;
            let dfa_guard = self.0.read().map_err(map_poison_error_to_pyerr)?;
            let binary_data: Vec<u8> =
                bincode::encode_to_vec(Snapshot::from(&*dfa_guard), config::standard()).map_err(
                    |e| {
                        PyErr::new::<PyValueError, _>(format!(
                            "Serialization of Automaton failed: {}",
                            e
                        ))
                    },
                )?;
            Ok((cls.getattr("from_binary")?.unbind(), (binary_data,)))
        })
    }

    #[staticmethod]
    fn from_binary(binary_data: Vec<u8>) -> PyResult<Self> {
        let (snapshot, _): (Snapshot, usize) =
            bincode::decode_from_slice(&binary_data[..], config::standard()).map_err(|e| {
                PyErr::new::<PyValueError, _>(format!("Deserialization of Automaton failed: {}", e))
            })?;
        Ok(PyAutomaton::wrap(Automaton::try_from(snapshot)?))
    }
}

#[pymodule]
fn dfa_minimizer_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyAutomaton>()?;

    Ok(())
}
