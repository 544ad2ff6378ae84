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

//! Binding records: broker-level routing rules between an exchange and a queue

use crate::resource::OwnerReference;
use ktwin_core::{EventChannel, RabbitmqClusterReference};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DESTINATION_QUEUE: &str = "queue";
const MATCH_ALL: &str = "all";

/// Header filter a Binding applies to messages on its source exchange.
///
/// Key names are read by the broker verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BindingFilter {
    #[serde(rename = "type")]
    pub event_type: String,
    /// Trigger whose queue-side filter accepts the routed message
    #[serde(rename = "x-knative-trigger")]
    pub knative_trigger: String,
    #[serde(rename = "x-match")]
    pub match_mode: String,
}

impl BindingFilter {
    /// Match every header: the event type and the destination trigger
    pub fn all(channel: &EventChannel, trigger: impl Into<String>) -> Self {
        Self {
            event_type: channel.to_string(),
            knative_trigger: trigger.into(),
            match_mode: MATCH_ALL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub name: String,
    pub namespace: String,
    pub vhost: String,
    /// Source exchange
    pub source: String,
    /// Destination queue
    pub destination: String,
    pub destination_type: String,
    /// Header filter; topic bindings route by key instead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<BindingFilter>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub routing_key: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub owner_references: Vec<OwnerReference>,
    pub rabbitmq_cluster_reference: RabbitmqClusterReference,
}

impl Binding {
    pub(crate) fn to_queue(
        name: String,
        namespace: String,
        vhost: String,
        source: impl Into<String>,
        destination: impl Into<String>,
        cluster: RabbitmqClusterReference,
    ) -> Self {
        Self {
            name,
            namespace,
            vhost,
            source: source.into(),
            destination: destination.into(),
            destination_type: DESTINATION_QUEUE.to_string(),
            filters: None,
            routing_key: String::new(),
            labels: BTreeMap::new(),
            owner_references: Vec::new(),
            rabbitmq_cluster_reference: cluster,
        }
    }

    pub(crate) fn filtered(mut self, filter: BindingFilter) -> Self {
        self.filters = Some(filter);
        self
    }

    pub(crate) fn routed_by(mut self, routing_key: String) -> Self {
        self.routing_key = routing_key;
        self
    }

    /// Event type this binding selects, if it filters by header
    pub fn event_type(&self) -> Option<&str> {
        self.filters.as_ref().map(|f| f.event_type.as_str())
    }
}
