//! JSON wire format: automaton definitions, requests and replies.
//!
//! A [`DfaDefinition`] accepts transitions either as `[from, symbol, to]` triples or as an object
//! keyed by `"from,symbol"`. Both are normalized into the core transition mapping by
//! [`DfaDefinition::to_automaton`]. Symbols travel as strings and must be single characters.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::automaton::{Automaton, SimulationResult, State, Symbol};
use crate::error::ValidationError;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DfaDefinition {
    pub states: Vec<String>,
    pub alphabet: Vec<String>,
    pub transitions: Transitions,
    pub start_state: String,
    pub accept_states: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Transitions {
    /// `[["q0", "a", "q1"], ...]`
    List(Vec<Vec<String>>),
    /// `{"q0,a": "q1", ...}`
    Map(BTreeMap<String, String>),
}

impl Transitions {
    /// Flattens either encoding into `(from, symbol, to)` triples.
    pub fn to_triples(&self) -> Result<Vec<(String, String, String)>> {
        match self {
            Transitions::List(entries) => entries
                .iter()
                .map(|entry| -> Result<(String, String, String)> {
                    match entry.as_slice() {
                        [from, symbol, to] => Ok((from.clone(), symbol.clone(), to.clone())),
                        _ => Err(Error::MalformedTransition(format!("{entry:?}"))),
                    }
                })
                .collect(),
            Transitions::Map(entries) => entries
                .iter()
                .map(|(key, to)| -> Result<(String, String, String)> {
                    // split on the first comma only, a comma may itself be a symbol
                    let (from, symbol) = key
                        .split_once(',')
                        .ok_or_else(|| Error::MalformedTransitionKey(key.clone()))?;
                    Ok((from.trim().to_string(), symbol.trim().to_string(), to.clone()))
                })
                .collect(),
        }
    }
}

fn single_char(symbol: &str) -> Option<char> {
    let mut chars = symbol.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Fields a definition must carry, in the order they are reported missing.
const REQUIRED_FIELDS: [&str; 5] = [
    "states",
    "alphabet",
    "transitions",
    "start_state",
    "accept_states",
];

fn check_required_fields(definition: &Map<String, Value>) -> Result<()> {
    match REQUIRED_FIELDS
        .into_iter()
        .find(|field| !definition.contains_key(*field))
    {
        Some(field) => Err(Error::MissingField(field)),
        None => Ok(()),
    }
}

/// Parses a request whose `dfa` member is a definition.
///
/// An empty `dfa` object counts as no definition at all.
fn parse_request<T: DeserializeOwned>(body: &str) -> Result<T> {
    let mut request: Value = serde_json::from_str(body)?;
    if let Some(members) = request.as_object_mut() {
        match members.get("dfa") {
            Some(Value::Object(dfa)) if dfa.is_empty() => {
                members.remove("dfa");
            }
            Some(Value::Object(dfa)) => check_required_fields(dfa)?,
            _ => {}
        }
    }
    Ok(serde_json::from_value(request)?)
}

impl DfaDefinition {
    pub fn from_json(json: &str) -> Result<Self> {
        let definition: Value = serde_json::from_str(json)?;
        if let Value::Object(members) = &definition {
            check_required_fields(members)?;
        }
        Ok(serde_json::from_value(definition)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Normalizes the definition and builds a validated automaton from it.
    pub fn to_automaton(&self) -> Result<Automaton> {
        let alphabet = self
            .alphabet
            .iter()
            .map(|symbol| single_char(symbol).ok_or_else(|| Error::InvalidSymbol(symbol.clone())))
            .collect::<Result<Vec<char>>>()?;
        let transitions = self
            .transitions
            .to_triples()?
            .into_iter()
            .map(|(from, symbol, to)| -> Result<((String, char), String)> {
                match single_char(&symbol) {
                    Some(c) => Ok(((from, c), to)),
                    // cannot be in an alphabet made of single characters
                    None => Err(Error::Validation(ValidationError::BadTransitionSymbol(symbol))),
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Automaton::new(
            self.states.iter().cloned(),
            alphabet,
            transitions,
            self.start_state.clone(),
            self.accept_states.iter().cloned(),
        )?)
    }
}

/// Canonical form of an automaton: sorted lists, transitions as triples.
impl<S: State, A: Symbol> From<&Automaton<S, A>> for DfaDefinition {
    fn from(automaton: &Automaton<S, A>) -> Self {
        DfaDefinition {
            states: automaton.sorted_states().iter().map(ToString::to_string).collect(),
            alphabet: automaton.sorted_alphabet().iter().map(ToString::to_string).collect(),
            transitions: Transitions::List(
                automaton
                    .sorted_transitions()
                    .into_iter()
                    .map(|(from, symbol, to)| {
                        vec![from.to_string(), symbol.to_string(), to.to_string()]
                    })
                    .collect(),
            ),
            start_state: automaton.start_state().to_string(),
            accept_states: automaton
                .sorted_accept_states()
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulateRequest {
    #[serde(default)]
    pub dfa: Option<DfaDefinition>,
    #[serde(default)]
    pub input_string: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimizeRequest {
    #[serde(default)]
    pub dfa: Option<DfaDefinition>,
}

impl SimulateRequest {
    pub fn from_json(body: &str) -> Result<Self> {
        parse_request(body)
    }
}

impl MinimizeRequest {
    pub fn from_json(body: &str) -> Result<Self> {
        parse_request(body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulateResponse {
    pub accepted: bool,
    pub path: Vec<String>,
    pub final_state: String,
    /// Why the input was not fully consumed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<S: State, A: Symbol> From<SimulationResult<S, A>> for SimulateResponse {
    fn from(result: SimulationResult<S, A>) -> Self {
        SimulateResponse {
            accepted: result.accepted,
            path: result.path.iter().map(ToString::to_string).collect(),
            final_state: result.final_state.to_string(),
            error: result.error.map(|halt| halt.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimizeResponse {
    pub original_states: usize,
    pub minimized_states: usize,
    pub minimized_dfa: DfaDefinition,
    pub equivalent_groups: Vec<Vec<String>>,
}

/// The `{"success": ..}` envelope every reply is wrapped in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply<T> {
    pub success: bool,
    #[serde(flatten)]
    pub body: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> Reply<T> {
    pub fn success(body: T) -> Self {
        Reply {
            success: true,
            body: Some(body),
            error: None,
        }
    }

    pub fn failure(error: &Error) -> Self {
        Reply {
            success: false,
            body: None,
            error: Some(error.to_string()),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<T: Serialize> From<Result<T>> for Reply<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(body) => Reply::success(body),
            Err(e) => Reply::failure(&e),
        }
    }
}
