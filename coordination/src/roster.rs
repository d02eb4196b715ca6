//! Ordered collection of agents, filtered by capability tag.
//!
//! Order matters: it is the default turn order for every dialogue.

use crate::agent::{Agent, Capability};
use crate::errors::CoordinationError;

#[derive(Debug, Default)]
pub struct Roster {
    agents: Vec<Agent>,
}

impl Roster {
    /// Build a roster in the given turn order. Fails on duplicate names.
    pub fn new(agents: Vec<Agent>) -> Result<Self, CoordinationError> {
        let mut roster = Self::default();
        for agent in agents {
            roster.push(agent)?;
        }
        Ok(roster)
    }

    /// Add an agent at the end of the turn order.
    ///
    /// Names must be unique within a roster.
    pub fn push(&mut self, agent: Agent) -> Result<(), CoordinationError> {
        if self.agents.iter().any(|a| a.name() == agent.name()) {
            return Err(CoordinationError::Configuration(format!(
                "duplicate agent name: {}",
                agent.name()
            )));
        }
        self.agents.push(agent);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    pub fn get(&self, name: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.name() == name)
    }

    /// Roster positions of every agent with `capability`, in roster order.
    pub fn indices_with(&self, capability: Capability) -> Vec<usize> {
        self.agents
            .iter()
            .enumerate()
            .filter(|(_, a)| a.capability() == capability)
            .map(|(i, _)| i)
            .collect()
    }

    /// First agent with `capability`, or `MissingCapability`.
    pub fn first_with(&self, capability: Capability) -> Result<&Agent, CoordinationError> {
        self.agents
            .iter()
            .find(|a| a.capability() == capability)
            .ok_or(CoordinationError::MissingCapability(capability))
    }

    pub fn writers(&self) -> impl Iterator<Item = &Agent> {
        self.agents
            .iter()
            .filter(|a| a.capability() == Capability::Writer)
    }

    /// Append `text` to every agent's shared context.
    pub fn broadcast(&mut self, text: &str) {
        for agent in &mut self.agents {
            agent.update_shared(text);
        }
    }
}
