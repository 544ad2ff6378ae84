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

//! Twin definitions: Interfaces (types) and Instances (concrete twins)
//!
//! The shapes mirror the `dtd.ktwin/v0` resources handed over by the
//! reconciliation loop, so they deserialize straight from the JSON the
//! cluster returns.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::naming::normalize_name;

pub const API_VERSION: &str = "dtd.ktwin/v0";
pub const INTERFACE_KIND: &str = "TwinInterface";
pub const INSTANCE_KIND: &str = "TwinInstance";

fn default_api_version() -> String {
    API_VERSION.to_string()
}

fn default_interface_kind() -> String {
    INTERFACE_KIND.to_string()
}

fn default_instance_kind() -> String {
    INSTANCE_KIND.to_string()
}

/// An entity that can live in a relationship graph
pub trait TwinEntity: Clone {
    /// Normalized id used as the graph key
    fn twin_id(&self) -> String;

    /// Stand-in payload for an entity referenced before its definition arrived
    fn placeholder(id: &str) -> Self;
}

/// Lifecycle phase reported in the status of Interfaces and Instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TwinPhase {
    #[default]
    Pending,
    Unknown,
    Running,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TwinStatus {
    #[serde(default)]
    pub status: TwinPhase,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl ObjectMeta {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Integer,
    String,
    Boolean,
    Double,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwinSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primitive_type: Option<PrimitiveType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwinProperty {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<TwinSchema>,
    #[serde(default)]
    pub writable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwinTelemetry {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<TwinSchema>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwinCommand {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// "async" or "sync"
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub command_type: String,
}

/// Interface-level relationship to another Interface
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwinRelationship {
    pub name: String,
    /// Target Interface id
    #[serde(alias = "interface")]
    pub target: String,
    /// Route the target's events into this Interface's own channels
    #[serde(default)]
    pub aggregate_data: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_multiplicity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_multiplicity: Option<u32>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl TwinRelationship {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            ..Default::default()
        }
    }

    pub fn aggregating(mut self) -> Self {
        self.aggregate_data = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoScaling {
    /// Messages a trigger dispatches concurrently
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallelism: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_scale: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_scale: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<u32>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub metric: String,
}

/// Resources requested by the dispatcher behind a trigger
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerResources {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cpu_request: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cpu_limit: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub memory_request: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub memory_limit: String,
}

/// Compute service attached to an Interface
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwinService {
    #[serde(default)]
    pub auto_scaling: AutoScaling,
    #[serde(default)]
    pub resources: TriggerResources,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwinInterfaceSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<TwinProperty>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<TwinCommand>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<TwinRelationship>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub telemetries: Vec<TwinTelemetry>,
    /// Parent Interface id (single inheritance)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub extends_interface: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<TwinService>,
}

/// A twin type definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwinInterface {
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_interface_kind")]
    pub kind: String,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: TwinInterfaceSpec,
    #[serde(default)]
    pub status: TwinStatus,
}

impl TwinInterface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_interface_kind(),
            metadata: ObjectMeta::named(name),
            spec: TwinInterfaceSpec::default(),
            status: TwinStatus::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Parent Interface id, normalized; `None` for a root Interface
    pub fn parent_id(&self) -> Option<String> {
        if self.spec.extends_interface.is_empty() {
            None
        } else {
            Some(normalize_name(&self.spec.extends_interface))
        }
    }

    pub fn has_service(&self) -> bool {
        self.spec.service.is_some()
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.spec.extends_interface = parent.into();
        self
    }

    pub fn with_relationship(mut self, relationship: TwinRelationship) -> Self {
        self.spec.relationships.push(relationship);
        self
    }

    pub fn with_service(mut self, service: TwinService) -> Self {
        self.spec.service = Some(service);
        self
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.metadata.namespace = namespace.into();
        self
    }
}

impl TwinEntity for TwinInterface {
    fn twin_id(&self) -> String {
        normalize_name(&self.metadata.name)
    }

    fn placeholder(id: &str) -> Self {
        let mut interface = TwinInterface::new(id);
        interface.spec.id = id.to_string();
        interface
    }
}

/// Materialization of an Interface-level relationship against a concrete target
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwinInstanceRelationship {
    pub name: String,
    /// Target Interface id
    pub interface: String,
    /// Target Instance id
    pub instance: String,
}

impl TwinInstanceRelationship {
    pub fn new(
        name: impl Into<String>,
        interface: impl Into<String>,
        instance: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            interface: interface.into(),
            instance: instance.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwinInstanceSpec {
    /// Interface this Instance materializes
    #[serde(default)]
    pub interface: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parent_instance: String,
    #[serde(default, alias = "relationships")]
    pub twin_instance_relationships: Vec<TwinInstanceRelationship>,
}

/// A concrete twin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwinInstance {
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_instance_kind")]
    pub kind: String,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: TwinInstanceSpec,
    #[serde(default)]
    pub status: TwinStatus,
}

impl TwinInstance {
    pub fn new(name: impl Into<String>, interface: impl Into<String>) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_instance_kind(),
            metadata: ObjectMeta::named(name),
            spec: TwinInstanceSpec {
                interface: interface.into(),
                ..Default::default()
            },
            status: TwinStatus::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn interface(&self) -> &str {
        &self.spec.interface
    }

    pub fn relationships(&self) -> &[TwinInstanceRelationship] {
        &self.spec.twin_instance_relationships
    }

    pub fn with_relationship(mut self, relationship: TwinInstanceRelationship) -> Self {
        self.spec.twin_instance_relationships.push(relationship);
        self
    }
}

impl TwinEntity for TwinInstance {
    fn twin_id(&self) -> String {
        normalize_name(&self.metadata.name)
    }

    fn placeholder(id: &str) -> Self {
        TwinInstance::new(id, "")
    }
}
