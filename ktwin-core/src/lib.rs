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

//! KTwin Core
//!
//! Fundamental data structures shared by the twin graph, the event topology
//! builder and the graph snapshot server:
//! - **Twin model**: `TwinInterface` and `TwinInstance` definitions as they
//!   arrive from the reconciliation loop
//! - **Naming contract**: RFC-1123 normalization and `real.` / `virtual.`
//!   event channels
//! - **Errors**: graph and topology error kinds
//! - **Configuration**: broker and capture-service settings for topology
//!   derivation

pub mod config;
pub mod error;
pub mod naming;
pub mod twin;

pub use config::{RabbitmqClusterReference, TopologyConfig};
pub use error::{GraphError, GraphResult, TopologyError, TopologyResult};
pub use naming::{normalize_name, EventChannel, EventDirection};
pub use twin::{
    AutoScaling, ObjectMeta, PrimitiveType, TriggerResources, TwinCommand, TwinEntity,
    TwinInstance, TwinInstanceRelationship, TwinInstanceSpec, TwinInterface, TwinInterfaceSpec,
    TwinPhase, TwinProperty, TwinRelationship, TwinSchema, TwinService, TwinStatus, TwinTelemetry,
};
