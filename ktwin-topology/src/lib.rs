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

//! Event topology derivation for twin Interfaces
//!
//! Turns one Interface and its Relationships into the Triggers and Bindings
//! that route `real.<id>` and `virtual.<id>` events through the broker:
//!
//! - primary Trigger feeding the Interface's compute service
//! - capture Triggers feeding the event store in both directions
//! - aggregation Bindings fanning a related Interface's events into this one
//! - optional MQTT and cloud-event dispatcher Bindings
//!
//! The builder is a pure function of its inputs. It never talks to the
//! cluster; the reconcile loop applies the returned [`TopologyPlan`].

pub mod binding;
pub mod builder;
pub mod inventory;
pub mod resource;
pub mod trigger;

pub use binding::{Binding, BindingFilter};
pub use builder::{EventTopologyBuilder, TopologyPlan};
pub use inventory::{BrokerInventory, InterfaceLookup};
pub use resource::{OwnerReference, INTERFACE_LABEL, TRIGGER_LABEL};
pub use trigger::{EventTypeFilter, ServiceReference, Subscriber, Trigger};
