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

//! Trigger records: standing subscriptions of one event type to one subscriber

use crate::resource::OwnerReference;
use ktwin_core::{EventChannel, TwinService};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const PARALLELISM_ANNOTATION: &str = "rabbitmq.eventing.knative.dev/parallelism";
pub const CPU_REQUEST_ANNOTATION: &str = "rabbitmq.eventing.knative.dev/cpu-request";
pub const CPU_LIMIT_ANNOTATION: &str = "rabbitmq.eventing.knative.dev/cpu-limit";
pub const MEMORY_REQUEST_ANNOTATION: &str = "rabbitmq.eventing.knative.dev/memory-request";
pub const MEMORY_LIMIT_ANNOTATION: &str = "rabbitmq.eventing.knative.dev/memory-limit";

const SERVICE_KIND: &str = "Service";
const SERVING_API_VERSION: &str = "serving.knative.dev/v1";

/// Exact-match filter on the CloudEvent `type` attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventTypeFilter {
    #[serde(rename = "type")]
    pub event_type: String,
}

impl From<&EventChannel> for EventTypeFilter {
    fn from(channel: &EventChannel) -> Self {
        Self {
            event_type: channel.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceReference {
    pub kind: String,
    pub api_version: String,
    pub name: String,
}

/// Where a Trigger delivers matching events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    #[serde(rename = "ref")]
    pub reference: ServiceReference,
    /// Path appended to the service URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl Subscriber {
    pub fn service(name: impl Into<String>) -> Self {
        Self {
            reference: ServiceReference {
                kind: SERVICE_KIND.to_string(),
                api_version: SERVING_API_VERSION.to_string(),
                name: name.into(),
            },
            uri: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.uri = Some(path.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    pub name: String,
    pub namespace: String,
    pub broker: String,
    pub filter: EventTypeFilter,
    pub subscriber: Subscriber,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub owner_references: Vec<OwnerReference>,
}

/// Dispatcher annotations derived from a compute service's scaling settings
pub(crate) fn service_annotations(service: &TwinService) -> BTreeMap<String, String> {
    let mut annotations = BTreeMap::new();
    let resources = &service.resources;

    if let Some(parallelism) = service.auto_scaling.parallelism {
        annotations.insert(PARALLELISM_ANNOTATION.to_string(), parallelism.to_string());
    }

    for (key, value) in [
        (CPU_REQUEST_ANNOTATION, &resources.cpu_request),
        (CPU_LIMIT_ANNOTATION, &resources.cpu_limit),
        (MEMORY_REQUEST_ANNOTATION, &resources.memory_request),
        (MEMORY_LIMIT_ANNOTATION, &resources.memory_limit),
    ] {
        if !value.is_empty() {
            annotations.insert(key.to_string(), value.clone());
        }
    }

    annotations
}

#[cfg(test)]
mod tests {
    use super::*;
    use ktwin_core::{AutoScaling, TriggerResources};

    #[test]
    fn test_filter_uses_type_key() {
        let filter = EventTypeFilter::from(&EventChannel::real("Vehicle"));
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            serde_json::json!({"type": "real.vehicle"})
        );
    }

    #[test]
    fn test_subscriber_wire_shape() {
        let subscriber = Subscriber::service("event-store").with_path("/api/v1/twin-events");
        assert_eq!(
            serde_json::to_value(&subscriber).unwrap(),
            serde_json::json!({
                "ref": {"kind": "Service", "apiVersion": "serving.knative.dev/v1", "name": "event-store"},
                "uri": "/api/v1/twin-events"
            })
        );
    }

    #[test]
    fn test_service_annotations_skip_unset_values() {
        let service = TwinService {
            auto_scaling: AutoScaling {
                parallelism: Some(8),
                ..Default::default()
            },
            resources: TriggerResources {
                cpu_limit: "500m".to_string(),
                ..Default::default()
            },
        };

        let annotations = service_annotations(&service);
        assert_eq!(annotations.len(), 2);
        assert_eq!(annotations[PARALLELISM_ANNOTATION], "8");
        assert_eq!(annotations[CPU_LIMIT_ANNOTATION], "500m");
        assert!(service_annotations(&TwinService::default()).is_empty());
    }
}
