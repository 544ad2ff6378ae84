// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Error types for graph and topology operations

use thiserror::Error;

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Result type for topology derivation
pub type TopologyResult<T> = Result<T, TopologyError>;

/// Errors raised by the relationship graph and inheritance resolution
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// No vertex is registered under the id
    #[error("Vertex not found in the graph: {0}")]
    NotFound(String),

    /// A vertex with the id already exists (callers treat this as idempotent)
    #[error("Vertex already exists in the graph: {0}")]
    AlreadyExists(String),

    /// An `extendsInterface` chain loops back onto itself
    #[error("Inheritance cycle detected: {}", chain.join(" -> "))]
    CycleDetected { chain: Vec<String> },
}

impl GraphError {
    /// True for the duplicate-insertion error every caller swallows
    pub fn is_already_exists(&self) -> bool {
        matches!(self, GraphError::AlreadyExists(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GraphError::NotFound(_))
    }
}

/// Errors raised while deriving triggers and bindings for an Interface
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// A dependency of a trigger or binding has not been reconciled yet
    #[error("{kind} not found: {name}")]
    NotFound { kind: String, name: String },

    /// One or more triggers/bindings could not be derived
    #[error("Topology for {interface} is incomplete ({failures} failure(s)); first: {first}")]
    PartialTopologyFailure {
        interface: String,
        failures: usize,
        first: Box<TopologyError>,
    },

    /// Graph lookup failure surfaced during derivation
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TopologyError {
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        TopologyError::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

impl From<serde_json::Error> for TopologyError {
    fn from(e: serde_json::Error) -> Self {
        TopologyError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_chain() {
        let err = GraphError::CycleDetected {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "Inheritance cycle detected: a -> b -> a");
    }

    #[test]
    fn test_partial_failure_reports_first() {
        let err = TopologyError::PartialTopologyFailure {
            interface: "fleet".into(),
            failures: 2,
            first: Box::new(TopologyError::not_found("TwinInterface", "vehicle")),
        };
        assert!(err.to_string().ends_with("first: TwinInterface not found: vehicle"));
    }
}
