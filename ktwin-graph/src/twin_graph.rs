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

//! Graph builders for Interfaces and Instances

use crate::graph::RelationshipGraph;
use ktwin_core::{normalize_name, TwinEntity, TwinInstance, TwinInterface};
use tracing::{debug, warn};

/// Interfaces connected by their Relationships
pub type InterfaceGraph = RelationshipGraph<TwinInterface>;

/// Instances connected by their InstanceRelationships
pub type InstanceGraph = RelationshipGraph<TwinInstance>;

/// Build the Interface graph in arrival order.
///
/// Relationship targets that have not arrived yet become temporary vertices
/// and are promoted when their definition shows up later in the slice.
pub fn interface_graph<'a, I>(interfaces: I) -> InterfaceGraph
where
    I: IntoIterator<Item = &'a TwinInterface>,
{
    let mut graph = InterfaceGraph::new();

    for interface in interfaces {
        // Duplicates and promotions both report AlreadyExists
        if graph.add_entity(interface.clone()).is_err() {
            debug!(interface = %interface.name(), "interface vertex already present");
        }

        for relationship in &interface.spec.relationships {
            graph.link_to_id(interface, &relationship.target);
        }
    }

    graph
}

/// Build the Instance graph in two passes: every Instance becomes a vertex,
/// then each InstanceRelationship adds an edge when its target Instance exists.
///
/// Relationships pointing at unknown Instances are logged and skipped.
pub fn instance_graph(instances: &[TwinInstance]) -> InstanceGraph {
    let mut graph = InstanceGraph::new();

    for instance in instances {
        // No temporary vertices exist yet, so this is always a real clash
        if graph.add_entity(instance.clone()).is_err() {
            warn!(
                instance = %instance.name(),
                id = %instance.twin_id(),
                "instance id already taken, dropping duplicate from the graph"
            );
        }
    }

    for instance in instances {
        let source_id = instance.twin_id();
        for relationship in instance.relationships() {
            let target_id = normalize_name(&relationship.instance);
            if let Err(err) = graph.connect(&source_id, &target_id) {
                warn!(
                    instance = %instance.name(),
                    relationship = %relationship.name,
                    target = %relationship.instance,
                    error = %err,
                    "skipping relationship to unknown instance"
                );
            }
        }
    }

    graph
}
