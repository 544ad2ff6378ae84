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

//! Single-parent inheritance resolution over the Interface graph
//!
//! An Interface names at most one parent through `extendsInterface`. The
//! ancestor chain runs child first, root last. A parent that has not been
//! reconciled yet ends the chain early instead of failing, so a child still
//! gets a usable (shorter) list. A chain that loops back on itself fails
//! with [`GraphError::CycleDetected`].

use crate::twin_graph::InterfaceGraph;
use ktwin_core::{
    normalize_name, GraphError, GraphResult, TwinCommand, TwinInterface, TwinProperty,
    TwinRelationship, TwinService, TwinTelemetry,
};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Resolve the `extendsInterface` chain of an Interface, self first.
///
/// # Errors
/// - `NotFound` if `interface_id` has no real vertex in the graph
/// - `CycleDetected` if an id repeats along the chain
pub fn resolve_ancestors(interface_id: &str, graph: &InterfaceGraph) -> GraphResult<Vec<TwinInterface>> {
    let start_id = normalize_name(interface_id);
    let start = graph
        .get_vertex(&start_id)
        .filter(|vertex| !vertex.is_temporary())
        .ok_or_else(|| GraphError::NotFound(start_id.clone()))?;

    let mut chain = vec![start_id.clone()];
    let mut visited = HashSet::from([start_id]);
    let mut ancestors = vec![start.payload().clone()];
    let mut current = start.payload();

    while let Some(parent_id) = current.parent_id() {
        if !visited.insert(parent_id.clone()) {
            chain.push(parent_id);
            return Err(GraphError::CycleDetected { chain });
        }

        let parent = match graph.get_vertex(&parent_id) {
            Some(vertex) if !vertex.is_temporary() => vertex.payload(),
            _ => {
                debug!(
                    interface = %current.name(),
                    parent = %parent_id,
                    "parent interface not reconciled yet, truncating ancestor chain"
                );
                break;
            }
        };

        chain.push(parent_id);
        ancestors.push(parent.clone());
        current = parent;
    }

    Ok(ancestors)
}

/// Members an Interface exposes once its ancestors are folded in.
///
/// Lists keep resolution order with no de-duplication; lookups return the
/// first occurrence, so the most specific declaration wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveInterface {
    pub interface_id: String,
    /// Resolved chain, self first
    pub ancestors: Vec<String>,
    pub properties: Vec<TwinProperty>,
    pub telemetries: Vec<TwinTelemetry>,
    pub commands: Vec<TwinCommand>,
    pub relationships: Vec<TwinRelationship>,
    /// Compute service of the Interface itself; never inherited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<TwinService>,
}

impl EffectiveInterface {
    /// Fold an ancestor list (as returned by [`resolve_ancestors`]) into one member set
    pub fn flatten(ancestors: &[TwinInterface]) -> Self {
        let mut effective = Self {
            interface_id: ancestors
                .first()
                .map(|interface| normalize_name(interface.name()))
                .unwrap_or_default(),
            ancestors: Vec::with_capacity(ancestors.len()),
            properties: Vec::new(),
            telemetries: Vec::new(),
            commands: Vec::new(),
            relationships: Vec::new(),
            service: ancestors.first().and_then(|interface| interface.spec.service.clone()),
        };

        for interface in ancestors {
            let spec = &interface.spec;
            effective.ancestors.push(normalize_name(interface.name()));
            effective.properties.extend(spec.properties.iter().cloned());
            effective.telemetries.extend(spec.telemetries.iter().cloned());
            effective.commands.extend(spec.commands.iter().cloned());
            effective.relationships.extend(spec.relationships.iter().cloned());
        }

        effective
    }

    pub fn property(&self, name: &str) -> Option<&TwinProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn telemetry(&self, name: &str) -> Option<&TwinTelemetry> {
        self.telemetries.iter().find(|t| t.name == name)
    }

    pub fn command(&self, name: &str) -> Option<&TwinCommand> {
        self.commands.iter().find(|c| c.name == name)
    }

    pub fn relationship(&self, name: &str) -> Option<&TwinRelationship> {
        self.relationships.iter().find(|r| r.name == name)
    }

    pub fn has_service(&self) -> bool {
        self.service.is_some()
    }
}

/// Resolve ancestors and flatten them in one step
pub fn resolve_effective(interface_id: &str, graph: &InterfaceGraph) -> GraphResult<EffectiveInterface> {
    let ancestors = resolve_ancestors(interface_id, graph)?;
    Ok(EffectiveInterface::flatten(&ancestors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::twin_graph::interface_graph;
    use ktwin_core::TwinEntity;

    fn property(name: &str, description: &str) -> TwinProperty {
        TwinProperty {
            name: name.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    fn with_property(mut interface: TwinInterface, prop: TwinProperty) -> TwinInterface {
        interface.spec.properties.push(prop);
        interface
    }

    #[test]
    fn test_root_interface_resolves_to_itself() {
        let root = TwinInterface::new("asset");
        let graph = interface_graph([&root]);

        let ancestors = resolve_ancestors("asset", &graph).unwrap();
        assert_eq!(ancestors.len(), 1);
        assert_eq!(ancestors[0].name(), "asset");
    }

    #[test]
    fn test_chain_is_child_to_root() {
        let asset = TwinInterface::new("asset");
        let vehicle = TwinInterface::new("vehicle").extends("asset");
        let truck = TwinInterface::new("truck").extends("vehicle");
        let graph = interface_graph([&truck, &vehicle, &asset]);

        let names: Vec<_> = resolve_ancestors("truck", &graph)
            .unwrap()
            .iter()
            .map(|i| i.twin_id())
            .collect();
        assert_eq!(names, vec!["truck", "vehicle", "asset"]);
    }

    #[test]
    fn test_missing_parent_truncates_chain() {
        let truck = TwinInterface::new("truck").extends("vehicle");
        let graph = interface_graph([&truck]);

        let ancestors = resolve_ancestors("truck", &graph).unwrap();
        assert_eq!(ancestors.len(), 1);
    }

    #[test]
    fn test_temporary_parent_truncates_chain() {
        // Vehicle is only known through a relationship edge
        let fleet = TwinInterface::new("fleet")
            .with_relationship(TwinRelationship::new("member", "vehicle"));
        let truck = TwinInterface::new("truck").extends("vehicle");
        let graph = interface_graph([&fleet, &truck]);

        let ancestors = resolve_ancestors("truck", &graph).unwrap();
        assert_eq!(ancestors.len(), 1);
    }

    #[test]
    fn test_unknown_interface_is_not_found() {
        let graph = InterfaceGraph::new();
        assert_eq!(
            resolve_ancestors("ghost", &graph).unwrap_err(),
            GraphError::NotFound("ghost".into())
        );
    }

    #[test]
    fn test_cycle_is_detected() {
        let a = TwinInterface::new("a").extends("b");
        let b = TwinInterface::new("b").extends("c");
        let c = TwinInterface::new("c").extends("a");
        let graph = interface_graph([&a, &b, &c]);

        let err = resolve_ancestors("a", &graph).unwrap_err();
        assert_eq!(
            err,
            GraphError::CycleDetected {
                chain: vec!["a".into(), "b".into(), "c".into(), "a".into()]
            }
        );
    }

    #[test]
    fn test_self_extension_is_a_cycle() {
        let a = TwinInterface::new("a").extends("A");
        let graph = interface_graph([&a]);
        assert!(matches!(
            resolve_ancestors("a", &graph),
            Err(GraphError::CycleDetected { .. })
        ));
    }

    #[test]
    fn test_flatten_first_occurrence_wins() {
        let asset = with_property(TwinInterface::new("asset"), property("status", "root"))
            .with_relationship(TwinRelationship::new("owner", "person"));
        let vehicle = with_property(
            TwinInterface::new("vehicle").extends("asset"),
            property("status", "vehicle"),
        )
        .with_service(TwinService::default());
        let graph = interface_graph([&asset, &vehicle]);

        let effective = resolve_effective("vehicle", &graph).unwrap();
        assert_eq!(effective.ancestors, vec!["vehicle", "asset"]);
        assert_eq!(effective.properties.len(), 2);
        assert_eq!(effective.property("status").unwrap().description, "vehicle");
        assert!(effective.relationship("owner").is_some());
        assert!(effective.has_service());
    }

    #[test]
    fn test_service_is_not_inherited() {
        let asset = TwinInterface::new("asset").with_service(TwinService::default());
        let tag = TwinInterface::new("tag").extends("asset");
        let graph = interface_graph([&asset, &tag]);

        assert!(!resolve_effective("tag", &graph).unwrap().has_service());
    }
}
