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

//! Integration tests for event topology derivation

use ktwin_core::{TopologyConfig, TwinInterface, TwinRelationship, TwinService};
use ktwin_graph::interface_graph;
use ktwin_topology::{BrokerInventory, EventTopologyBuilder, TopologyPlan};
use proptest::prelude::*;

const TARGETS: [&str; 6] = ["vehicle", "driver", "depot", "charger", "route", "sensor"];

fn relationships() -> Vec<TwinRelationship> {
    TARGETS
        .iter()
        .enumerate()
        .map(|(i, target)| {
            let relationship = TwinRelationship::new(format!("has_{}", target), *target);
            if i % 3 == 2 {
                relationship
            } else {
                relationship.aggregating()
            }
        })
        .chain(std::iter::once(
            // same normalized name and target as has_vehicle
            TwinRelationship::new("Has-Vehicle", "vehicle").aggregating(),
        ))
        .collect()
}

fn inventory() -> BrokerInventory {
    BrokerInventory::default()
        .with_exchange("b.ktwin.broker")
        .with_capture_queue("t.event-store")
        .with_trigger_queue("fleet-real-service", "t.fleet-real-service")
}

fn build(relationships: &[TwinRelationship]) -> TopologyPlan {
    let mut interfaces: Vec<TwinInterface> =
        TARGETS.iter().map(|t| TwinInterface::new(*t)).collect();
    let fleet = TwinInterface::new("fleet").with_service(TwinService::default());
    interfaces.push(fleet.clone());

    let graph = interface_graph(&interfaces);
    let config = TopologyConfig::with_dispatchers();
    let inventory = inventory();
    EventTopologyBuilder::new(&config, &graph, &inventory).build(&fleet, relationships)
}

proptest! {
    #[test]
    fn prop_plan_is_independent_of_relationship_order(
        order in Just((0..=TARGETS.len()).collect::<Vec<_>>()).prop_shuffle()
    ) {
        let canonical = build(&relationships());
        let shuffled: Vec<TwinRelationship> = order.iter().map(|&i| relationships()[i].clone()).collect();
        let reordered = build(&shuffled);

        prop_assert_eq!(
            serde_json::to_vec(&canonical).unwrap(),
            serde_json::to_vec(&reordered).unwrap()
        );
        prop_assert_eq!(canonical.fingerprint().unwrap(), reordered.fingerprint().unwrap());
    }
}

proptest! {
    #[test]
    fn prop_clashing_relationship_names_yield_unique_bindings(
        order in Just((0..=TARGETS.len()).collect::<Vec<_>>()).prop_shuffle()
    ) {
        let mut relationships: Vec<TwinRelationship> =
            order.iter().map(|&i| relationships()[i].clone()).collect();
        // redeclares has_driver and has_route against other targets
        relationships.push(TwinRelationship::new("HAS_DRIVER", "depot").aggregating());
        relationships.push(TwinRelationship::new("has:route", "sensor").aggregating());

        let plan = build(&relationships);
        let mut names: Vec<_> = plan.bindings.iter().map(|b| b.name.as_str()).collect();
        let total = names.len();
        names.dedup();
        prop_assert_eq!(names.len(), total);
        prop_assert_eq!(total, 4 * 3 + 2);
        prop_assert_eq!(
            plan.binding("fleet-has-driver-real-dispatcher").and_then(|b| b.event_type()),
            Some("real.driver")
        );
    }
}

#[test]
fn test_rebuilding_unchanged_interface_is_byte_identical() {
    let first = serde_json::to_string(&build(&relationships())).unwrap();
    let second = serde_json::to_string(&build(&relationships())).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_plan_names_follow_convention() {
    let plan = build(&relationships());
    assert!(plan.is_complete());

    for trigger in &plan.triggers {
        assert!(trigger.name.starts_with("fleet-"), "{}", trigger.name);
    }
    // four aggregating relationships: real, virtual and mqtt binding each,
    // plus the interface's own mqtt and cloud-event bindings
    assert_eq!(plan.bindings.len(), 4 * 3 + 2);
    assert!(plan.binding("fleet-has-vehicle-real-dispatcher").is_some());
    assert!(plan.binding("fleet-has-depot-real-dispatcher").is_none());

    let names: Vec<_> = plan.bindings.iter().map(|b| b.name.clone()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[test]
fn test_plan_wire_shape() {
    let plan = build(&[TwinRelationship::new("member", "vehicle").aggregating()]);
    let value = serde_json::to_value(&plan).unwrap();

    let binding = value["bindings"]
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["name"] == "fleet-member-real-dispatcher")
        .unwrap();
    assert_eq!(binding["filters"]["type"], "real.vehicle");
    assert_eq!(binding["filters"]["x-knative-trigger"], "fleet-real-service");
    assert_eq!(binding["filters"]["x-match"], "all");
    assert_eq!(binding["vhost"], "/");
    assert_eq!(binding["rabbitmqClusterReference"]["name"], "rabbitmq");
    assert_eq!(binding["labels"]["ktwin/twin-interface"], "fleet");
    assert_eq!(binding["ownerReferences"][0]["kind"], "TwinInterface");

    let trigger = value["triggers"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["name"] == "fleet-real-service")
        .unwrap();
    assert_eq!(trigger["filter"]["type"], "real.fleet");
    assert_eq!(trigger["subscriber"]["ref"]["kind"], "Service");
    assert!(value.get("failures").is_none());
}
