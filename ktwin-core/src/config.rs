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

//! Configuration for event topology derivation
//!
//! Names of the shared broker objects every twin trigger and binding refers
//! to. Defaults match a standard `ktwin` namespace installation.

use serde::{Deserialize, Serialize};

/// Default namespace for twin resources
pub const DEFAULT_NAMESPACE: &str = "ktwin";

/// Default eventing broker name
pub const DEFAULT_BROKER_NAME: &str = "ktwin";

/// Default event-capture (event store) service name
pub const DEFAULT_CAPTURE_SERVICE: &str = "event-store";

/// Reference to the RabbitMQ cluster backing the broker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RabbitmqClusterReference {
    pub name: String,
    pub namespace: String,
}

impl Default for RabbitmqClusterReference {
    fn default() -> Self {
        Self {
            name: "rabbitmq".to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

/// Settings consumed by the event topology builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Namespace applied to triggers and bindings when the Interface has none
    pub namespace: String,

    /// Eventing broker every trigger subscribes through
    pub broker_name: String,

    /// Service that durably records every state change
    pub capture_service: String,

    /// HTTP path on the capture service that receives events
    pub capture_path: String,

    /// RabbitMQ vhost for bindings
    pub vhost: String,

    pub rabbitmq_cluster: RabbitmqClusterReference,

    /// Exchange MQTT devices publish onto
    pub mqtt_exchange: String,

    /// Queue consumed by the MQTT dispatcher
    pub mqtt_dispatcher_queue: String,

    /// Queue consumed by the cloud-event dispatcher
    pub cloud_event_dispatcher_queue: String,

    /// Emit MQTT dispatcher bindings for real events
    pub mqtt_dispatch: bool,

    /// Emit cloud-event dispatcher bindings for virtual events
    pub cloud_event_dispatch: bool,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            broker_name: DEFAULT_BROKER_NAME.to_string(),
            capture_service: DEFAULT_CAPTURE_SERVICE.to_string(),
            capture_path: "/api/v1/twin-events".to_string(),
            vhost: "/".to_string(),
            rabbitmq_cluster: RabbitmqClusterReference::default(),
            mqtt_exchange: "amq.topic".to_string(),
            mqtt_dispatcher_queue: "mqtt-dispatcher-queue".to_string(),
            cloud_event_dispatcher_queue: "cloud-event-dispatcher-queue".to_string(),
            mqtt_dispatch: false,
            cloud_event_dispatch: false,
        }
    }
}

impl TopologyConfig {
    /// Config with every optional dispatcher binding enabled
    pub fn with_dispatchers() -> Self {
        Self {
            mqtt_dispatch: true,
            cloud_event_dispatch: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TopologyConfig::default();
        assert_eq!(config.broker_name, "ktwin");
        assert_eq!(config.capture_service, "event-store");
        assert!(!config.mqtt_dispatch);
        assert!(!config.cloud_event_dispatch);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: TopologyConfig =
            serde_json::from_str(r#"{"broker_name": "edge", "mqtt_dispatch": true}"#).unwrap();
        assert_eq!(config.broker_name, "edge");
        assert!(config.mqtt_dispatch);
        assert_eq!(config.vhost, "/");
        assert_eq!(config.rabbitmq_cluster.name, "rabbitmq");
    }
}
