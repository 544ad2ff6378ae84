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

//! Derivation of Triggers and Bindings for one Interface
//!
//! Object names follow `<interfaceId>[-<relationshipName>]-<direction>-<purpose>`
//! with every component normalized, so running the builder again over an
//! unchanged Interface yields byte-identical objects.
//!
//! Missing dependencies (target Interface, exchange, queue) never abort the
//! derivation. The affected binding is skipped, the failure is collected and
//! everything else is still produced.

use crate::binding::{Binding, BindingFilter};
use crate::inventory::{BrokerInventory, InterfaceLookup};
use crate::resource::{binding_labels, trigger_labels, OwnerReference};
use crate::trigger::{service_annotations, EventTypeFilter, Subscriber, Trigger};
use ktwin_core::{
    normalize_name, EventChannel, EventDirection, TopologyConfig, TopologyError, TopologyResult,
    TwinEntity, TwinInterface, TwinPhase, TwinRelationship,
};
use ktwin_graph::{resolve_effective, InterfaceGraph};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Primary trigger feeding an Interface's compute service
pub fn service_trigger_name(interface_id: &str) -> String {
    format!("{}-real-service", interface_id)
}

/// Trigger feeding the event store for one direction
pub fn capture_trigger_name(interface_id: &str, direction: EventDirection) -> String {
    format!("{}-{}-event-store", interface_id, direction)
}

/// Everything derived for one Interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyPlan {
    pub interface: String,
    /// Sorted by name
    pub triggers: Vec<Trigger>,
    /// Sorted by name
    pub bindings: Vec<Binding>,
    #[serde(skip)]
    failures: Vec<TopologyError>,
}

impl TopologyPlan {
    fn new(interface: String) -> Self {
        Self {
            interface,
            triggers: Vec::new(),
            bindings: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Status the owning Interface should report
    pub fn phase(&self) -> TwinPhase {
        if self.failures.is_empty() {
            TwinPhase::Running
        } else {
            TwinPhase::Failed
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failures in the order they were hit
    pub fn failures(&self) -> &[TopologyError] {
        &self.failures
    }

    pub fn first_failure(&self) -> Option<&TopologyError> {
        self.failures.first()
    }

    pub fn trigger(&self, name: &str) -> Option<&Trigger> {
        self.triggers.iter().find(|t| t.name == name)
    }

    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.name == name)
    }

    /// Fail with the first collected error, wrapped as a partial failure
    pub fn into_result(self) -> TopologyResult<Self> {
        match self.failures.first() {
            None => Ok(self),
            Some(first) => Err(TopologyError::PartialTopologyFailure {
                interface: self.interface.clone(),
                failures: self.failures.len(),
                first: Box::new(first.clone()),
            }),
        }
    }

    /// blake3 of the canonical JSON form, hex encoded
    pub fn fingerprint(&self) -> TopologyResult<String> {
        let canonical = serde_json::to_vec(self)?;
        Ok(hex::encode(blake3::hash(&canonical).as_bytes()))
    }

    fn fail(&mut self, error: TopologyError) {
        debug!(interface = %self.interface, error = %error, "topology dependency missing");
        self.failures.push(error);
    }
}

/// Derives the event topology of Interfaces against a fixed view of the cluster
pub struct EventTopologyBuilder<'a> {
    config: &'a TopologyConfig,
    lookup: &'a dyn InterfaceLookup,
    inventory: &'a BrokerInventory,
}

impl<'a> EventTopologyBuilder<'a> {
    pub fn new(
        config: &'a TopologyConfig,
        lookup: &'a dyn InterfaceLookup,
        inventory: &'a BrokerInventory,
    ) -> Self {
        Self {
            config,
            lookup,
            inventory,
        }
    }

    /// Derive the topology of `interface` using the given (usually flattened)
    /// relationship set. Only the first declaration of each relationship
    /// name counts, so pass the most specific declarations first.
    pub fn build(&self, interface: &TwinInterface, relationships: &[TwinRelationship]) -> TopologyPlan {
        let id = interface.twin_id();
        let mut plan = TopologyPlan::new(id.clone());
        let scope = Scope::new(self.config, interface, &id);

        if let Some(service) = &interface.spec.service {
            let mut trigger = scope.trigger(
                service_trigger_name(&id),
                &EventChannel::real(&id),
                Subscriber::service(id.as_str()),
            );
            trigger.annotations = service_annotations(service);
            plan.triggers.push(trigger);
        }

        for direction in EventDirection::ALL {
            plan.triggers.push(scope.trigger(
                capture_trigger_name(&id, direction),
                &EventChannel::new(direction, &id),
                Subscriber::service(self.config.capture_service.as_str())
                    .with_path(self.config.capture_path.as_str()),
            ));
        }

        let mut aggregating: Vec<&TwinRelationship> = effective_relationships(&id, relationships)
            .into_iter()
            .filter(|r| r.aggregate_data)
            .collect();
        aggregating.sort_by_key(|r| normalize_name(&r.name));

        for relationship in aggregating {
            self.aggregate(&scope, interface, relationship, &mut plan);
        }

        if self.config.mqtt_dispatch {
            plan.bindings.push(scope.mqtt_binding(
                format!("{}-real-mqtt-dispatcher", id),
                &EventChannel::real(&id),
            ));
        }

        if self.config.cloud_event_dispatch {
            match self.inventory.exchange() {
                Ok(exchange) => plan.bindings.push(
                    scope
                        .binding(
                            format!("{}-virtual-cloud-event-dispatcher", id),
                            exchange,
                            &self.config.cloud_event_dispatcher_queue,
                        )
                        .filtered(BindingFilter::all(&EventChannel::virtual_(&id), id.as_str())),
                ),
                Err(err) => plan.fail(err),
            }
        }

        plan.triggers.sort_by(|a, b| a.name.cmp(&b.name));
        plan.bindings.sort_by(|a, b| a.name.cmp(&b.name));

        if let Some(first) = plan.first_failure() {
            warn!(
                interface = %id,
                failures = plan.failures.len(),
                first = %first,
                "event topology derived with missing dependencies"
            );
        }

        plan
    }

    /// Binding pair routing a related Interface's events into this one
    fn aggregate(
        &self,
        scope: &Scope<'_>,
        interface: &TwinInterface,
        relationship: &TwinRelationship,
        plan: &mut TopologyPlan,
    ) {
        let id = scope.interface_id;
        let target = normalize_name(&relationship.target);
        let prefix = format!("{}-{}", id, normalize_name(&relationship.name));

        if !self.lookup.contains_interface(&target) {
            plan.fail(TopologyError::not_found("TwinInterface", target));
            return;
        }

        let real = EventChannel::real(&target);
        let virtual_ = EventChannel::virtual_(&target);

        if interface.has_service() {
            let primary = service_trigger_name(id);
            let endpoints = self
                .inventory
                .exchange()
                .and_then(|exchange| Ok((exchange, self.inventory.trigger_queue(&primary)?)));
            match endpoints {
                Ok((exchange, queue)) => plan.bindings.push(
                    scope
                        .binding(format!("{}-real-dispatcher", prefix), exchange, queue)
                        .filtered(BindingFilter::all(&real, primary)),
                ),
                Err(err) => plan.fail(err),
            }
        } else {
            debug!(
                interface = %id,
                relationship = %relationship.name,
                "no compute service, skipping real aggregation binding"
            );
        }

        let endpoints = self
            .inventory
            .exchange()
            .and_then(|exchange| Ok((exchange, self.inventory.capture_queue()?)));
        match endpoints {
            Ok((exchange, queue)) => plan.bindings.push(
                scope
                    .binding(format!("{}-virtual-event-store", prefix), exchange, queue)
                    .filtered(BindingFilter::all(
                        &virtual_,
                        capture_trigger_name(id, EventDirection::Virtual),
                    )),
            ),
            Err(err) => plan.fail(err),
        }

        if self.config.mqtt_dispatch {
            plan.bindings
                .push(scope.mqtt_binding(format!("{}-real-mqtt-dispatcher", prefix), &real));
        }
    }

    /// Resolve an Interface's ancestors in `graph`, then derive its topology
    /// over the inherited relationship set
    pub fn build_resolved(&self, interface_id: &str, graph: &InterfaceGraph) -> TopologyResult<TopologyPlan> {
        let effective = resolve_effective(interface_id, graph)?;
        let interface = graph
            .payload(&effective.interface_id)
            .ok_or_else(|| TopologyError::not_found("TwinInterface", interface_id))?;
        Ok(self.build(interface, &effective.relationships))
    }
}

/// First declaration of every normalized relationship name, in input order.
///
/// Relationship names become part of object names, so a later declaration
/// with the same normalized name (an inherited one, or a case variant) is
/// shadowed rather than emitted under a clashing name.
fn effective_relationships<'r>(
    interface_id: &str,
    relationships: &'r [TwinRelationship],
) -> Vec<&'r TwinRelationship> {
    let mut seen = HashSet::new();
    relationships
        .iter()
        .filter(|relationship| {
            let fresh = seen.insert(normalize_name(&relationship.name));
            if !fresh {
                debug!(
                    interface = %interface_id,
                    relationship = %relationship.name,
                    target = %relationship.target,
                    "relationship shadowed by an earlier declaration"
                );
            }
            fresh
        })
        .collect()
}

/// Per-Interface values stamped onto every generated object
struct Scope<'a> {
    config: &'a TopologyConfig,
    interface_id: &'a str,
    interface_name: &'a str,
    namespace: String,
    owner: OwnerReference,
}

impl<'a> Scope<'a> {
    fn new(config: &'a TopologyConfig, interface: &'a TwinInterface, interface_id: &'a str) -> Self {
        let namespace = if interface.metadata.namespace.is_empty() {
            config.namespace.clone()
        } else {
            interface.metadata.namespace.clone()
        };

        Self {
            config,
            interface_id,
            interface_name: interface.name(),
            namespace,
            owner: OwnerReference::from(interface),
        }
    }

    fn trigger(&self, name: String, channel: &EventChannel, subscriber: Subscriber) -> Trigger {
        Trigger {
            name,
            namespace: self.namespace.clone(),
            broker: self.config.broker_name.clone(),
            filter: EventTypeFilter::from(channel),
            subscriber,
            labels: trigger_labels(self.interface_name),
            annotations: Default::default(),
            owner_references: vec![self.owner.clone()],
        }
    }

    fn binding(&self, name: String, source: &str, destination: &str) -> Binding {
        let mut binding = Binding::to_queue(
            name,
            self.namespace.clone(),
            self.config.vhost.clone(),
            source,
            destination,
            self.config.rabbitmq_cluster.clone(),
        );
        binding.labels = binding_labels(self.interface_name);
        binding.owner_references = vec![self.owner.clone()];
        binding
    }

    /// Topic binding from the MQTT exchange into the MQTT dispatcher queue
    fn mqtt_binding(&self, name: String, channel: &EventChannel) -> Binding {
        self.binding(
            name,
            &self.config.mqtt_exchange,
            &self.config.mqtt_dispatcher_queue,
        )
        .routed_by(channel.wildcard_routing_key())
    }
}
