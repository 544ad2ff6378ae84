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

//! What the builder needs to know about the rest of the cluster

use ktwin_core::{normalize_name, TopologyError, TopologyResult, TwinInterface};
use ktwin_graph::RelationshipGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Answers whether an Interface has been reconciled
pub trait InterfaceLookup {
    fn contains_interface(&self, interface_id: &str) -> bool;
}

impl InterfaceLookup for RelationshipGraph<TwinInterface> {
    /// Temporary vertices don't count: the target is referenced but not defined
    fn contains_interface(&self, interface_id: &str) -> bool {
        self.is_resolved(&normalize_name(interface_id))
    }
}

impl<S: std::hash::BuildHasher> InterfaceLookup for std::collections::HashSet<String, S> {
    fn contains_interface(&self, interface_id: &str) -> bool {
        self.contains(&normalize_name(interface_id))
    }
}

/// Broker objects materialized by the platform for the current namespace.
///
/// The reconcile loop discovers these (the broker's exchange, the capture
/// queue, one queue per Trigger) and hands them to the builder, which only
/// ever reads them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrokerInventory {
    /// Exchange the eventing broker publishes every event onto
    pub exchange: Option<String>,
    /// Queue consumed by the event-capture service
    pub capture_queue: Option<String>,
    /// Trigger name to the queue backing it
    pub trigger_queues: BTreeMap<String, String>,
}

impl BrokerInventory {
    pub fn with_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = Some(exchange.into());
        self
    }

    pub fn with_capture_queue(mut self, queue: impl Into<String>) -> Self {
        self.capture_queue = Some(queue.into());
        self
    }

    pub fn with_trigger_queue(mut self, trigger: impl Into<String>, queue: impl Into<String>) -> Self {
        self.trigger_queues.insert(trigger.into(), queue.into());
        self
    }

    pub fn exchange(&self) -> TopologyResult<&str> {
        self.exchange
            .as_deref()
            .ok_or_else(|| TopologyError::not_found("Exchange", "broker exchange"))
    }

    pub fn capture_queue(&self) -> TopologyResult<&str> {
        self.capture_queue
            .as_deref()
            .ok_or_else(|| TopologyError::not_found("Queue", "event capture queue"))
    }

    pub fn trigger_queue(&self, trigger: &str) -> TopologyResult<&str> {
        self.trigger_queues
            .get(trigger)
            .map(String::as_str)
            .ok_or_else(|| TopologyError::not_found("Queue", format!("queue for trigger {}", trigger)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ktwin_core::TwinRelationship;
    use ktwin_graph::interface_graph;

    #[test]
    fn test_graph_lookup_ignores_temporary_vertices() {
        let fleet = TwinInterface::new("fleet")
            .with_relationship(TwinRelationship::new("member", "vehicle"));
        let graph = interface_graph([&fleet]);

        assert!(graph.contains_interface("Fleet"));
        assert!(!graph.contains_interface("vehicle"));
    }

    #[test]
    fn test_missing_inventory_entries_are_not_found() {
        let inventory = BrokerInventory::default().with_trigger_queue("fleet-real-service", "q1");

        assert_eq!(inventory.trigger_queue("fleet-real-service").unwrap(), "q1");
        assert!(matches!(
            inventory.exchange(),
            Err(TopologyError::NotFound { .. })
        ));
        assert!(inventory.capture_queue().is_err());
        assert!(inventory.trigger_queue("other").is_err());
    }

    #[test]
    fn test_inventory_from_json() {
        let inventory: BrokerInventory = serde_json::from_str(
            r#"{"exchange": "b.ktwin.ex", "triggerQueues": {"fleet-real-service": "t.fleet"}}"#,
        )
        .unwrap();
        assert_eq!(inventory.exchange().unwrap(), "b.ktwin.ex");
        assert!(inventory.capture_queue.is_none());
    }
}
