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

//! Instance graph snapshot served to deployed twin services
//!
//! The server holds one immutable generation at a time. A rebuild constructs
//! a complete graph off to the side and then replaces the generation pointer
//! under a write lock held only for the swap. Readers clone the pointer
//! under a read lock and serialize outside it, so a reader sees either the
//! old graph or the new one and never a half-built one.

use crate::twin_graph::{instance_graph, InstanceGraph};
use chrono::{DateTime, Utc};
use ktwin_core::{TwinInstance, TwinInstanceRelationship};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Relationship entry as seen by a twin service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRelationshipSettings {
    pub name: String,
    pub interface: String,
    pub instance: String,
}

impl From<&TwinInstanceRelationship> for InstanceRelationshipSettings {
    fn from(relationship: &TwinInstanceRelationship) -> Self {
        Self {
            name: relationship.name.clone(),
            interface: relationship.interface.clone(),
            instance: relationship.instance.clone(),
        }
    }
}

/// One Instance in the snapshot document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSettings {
    pub name: String,
    pub interface: String,
    #[serde(default)]
    pub relationships: Vec<InstanceRelationshipSettings>,
}

impl From<&TwinInstance> for InstanceSettings {
    fn from(instance: &TwinInstance) -> Self {
        Self {
            name: instance.name().to_string(),
            interface: instance.interface().to_string(),
            relationships: instance.relationships().iter().map(Into::into).collect(),
        }
    }
}

/// Summary of the generation currently being served
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotStats {
    pub generation: u64,
    pub vertices: usize,
    pub edges: usize,
    pub built_at: DateTime<Utc>,
}

struct Generation {
    number: u64,
    built_at: DateTime<Utc>,
    graph: InstanceGraph,
}

impl Generation {
    fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            generation: self.number,
            vertices: self.graph.len(),
            edges: self.graph.edge_count(),
            built_at: self.built_at,
        }
    }
}

/// Holder of the current Instance graph generation
pub struct TwinGraphServer {
    current: RwLock<Arc<Generation>>,
}

impl Default for TwinGraphServer {
    fn default() -> Self {
        Self::new()
    }
}

impl TwinGraphServer {
    /// Server with an empty generation 0
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Generation {
                number: 0,
                built_at: Utc::now(),
                graph: InstanceGraph::new(),
            })),
        }
    }

    /// Replace the served graph with one built from `instances`
    pub fn rebuild(&self, instances: &[TwinInstance]) -> SnapshotStats {
        let graph = instance_graph(instances);

        let stats = {
            let mut current = self.current.write();
            let next = Arc::new(Generation {
                number: current.number + 1,
                built_at: Utc::now(),
                graph,
            });
            let stats = next.stats();
            *current = next;
            stats
        };

        info!(
            generation = stats.generation,
            vertices = stats.vertices,
            edges = stats.edges,
            "twin graph rebuilt"
        );
        stats
    }

    fn generation(&self) -> Arc<Generation> {
        self.current.read().clone()
    }

    /// Serialize the current generation as a JSON array of Instance settings.
    ///
    /// Computed fresh on every call; nothing is cached between calls.
    pub fn serialize_snapshot(&self) -> serde_json::Result<Vec<u8>> {
        let generation = self.generation();
        let settings: Vec<InstanceSettings> = generation
            .graph
            .vertices()
            .filter(|vertex| !vertex.is_temporary())
            .map(|vertex| InstanceSettings::from(vertex.payload()))
            .collect();
        serde_json::to_vec(&settings)
    }

    pub fn stats(&self) -> SnapshotStats {
        self.generation().stats()
    }

    /// Run a read-only closure against the current graph
    pub fn with_graph<R>(&self, f: impl FnOnce(&InstanceGraph) -> R) -> R {
        let generation = self.generation();
        f(&generation.graph)
    }
}

/// Parse a snapshot document produced by [`TwinGraphServer::serialize_snapshot`]
pub fn parse_snapshot(bytes: &[u8]) -> serde_json::Result<Vec<InstanceSettings>> {
    serde_json::from_slice(bytes)
}
