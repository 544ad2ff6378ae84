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

//! Twin relationship graph
//!
//! Keeps an in-memory picture of how twin entities reference one another:
//!
//! - [`RelationshipGraph`]: arena-style directed graph keyed by id that
//!   tolerates forward references through temporary vertices
//! - [`resolve_ancestors`]: single-parent `extendsInterface` chain resolution
//!   with cycle detection
//! - [`TwinGraphServer`]: generation-swapped Instance graph serialized for
//!   deployed twin services
//!
//! The graph is a derived cache: it is rebuilt from the cluster's resource
//! listing on restart and never persisted.

pub mod graph;
pub mod inheritance;
pub mod snapshot;
pub mod twin_graph;

pub use graph::{RelationshipGraph, Vertex};
pub use inheritance::{resolve_ancestors, resolve_effective, EffectiveInterface};
pub use snapshot::{
    parse_snapshot, InstanceRelationshipSettings, InstanceSettings, SnapshotStats, TwinGraphServer,
};
pub use twin_graph::{instance_graph, interface_graph, InstanceGraph, InterfaceGraph};
