//! Request handling around the automaton core.
//!
//! Every request is checked against [`Limits`] before its automaton is built, and every request
//! owns its automaton from construction to reply.

use tracing::{debug, info, warn};

use crate::automaton::Automaton;
use crate::config::Limits;
use crate::wire::{
    DfaDefinition, MinimizeRequest, MinimizeResponse, SimulateRequest, SimulateResponse,
};
use crate::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct DfaService {
    limits: Limits,
}

impl DfaService {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Checks `definition` against the limits, then builds and validates its automaton.
    pub fn build(&self, definition: &DfaDefinition) -> Result<Automaton> {
        self.limits.check_definition(definition)?;
        definition.to_automaton()
    }

    pub fn simulate(&self, request: &SimulateRequest) -> Result<SimulateResponse> {
        let definition = request.dfa.as_ref().ok_or(Error::MissingDfa)?;
        self.limits.check_input(&request.input_string)?;
        let automaton = self.build(definition)?;
        let result = automaton.simulate(request.input_string.chars());
        if let Some(halt) = &result.error {
            debug!(%halt, steps = result.path.len() - 1, "simulation halted");
        }
        info!(
            accepted = result.accepted,
            final_state = %result.final_state,
            input_length = request.input_string.chars().count(),
            "simulated automaton"
        );
        Ok(result.into())
    }

    pub fn minimize(&self, request: &MinimizeRequest) -> Result<MinimizeResponse> {
        let definition = request.dfa.as_ref().ok_or(Error::MissingDfa)?;
        let automaton = self.build(definition)?;
        let minimized = automaton.minimize();
        let equivalent_groups = automaton.equivalent_state_groups();
        info!(
            original_states = automaton.num_states(),
            minimized_states = minimized.num_states(),
            "minimized automaton"
        );
        Ok(MinimizeResponse {
            original_states: automaton.num_states(),
            minimized_states: minimized.num_states(),
            minimized_dfa: DfaDefinition::from(&minimized),
            equivalent_groups,
        })
    }

    /// Answers a raw JSON simulation request.
    pub fn handle_simulate(&self, body: &str) -> Result<SimulateResponse> {
        SimulateRequest::from_json(body)
            .and_then(|request| self.simulate(&request))
            .inspect_err(log_rejection)
    }

    /// Answers a raw JSON minimization request.
    pub fn handle_minimize(&self, body: &str) -> Result<MinimizeResponse> {
        MinimizeRequest::from_json(body)
            .and_then(|request| self.minimize(&request))
            .inspect_err(log_rejection)
    }
}

fn log_rejection(error: &Error) {
    if error.is_client_error() {
        warn!(%error, "rejected request");
    } else {
        warn!(?error, "failed to process request");
    }
}
