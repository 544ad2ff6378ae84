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

//! Metadata shared by every generated broker object

use ktwin_core::TwinInterface;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label naming the Interface a broker object belongs to
pub const INTERFACE_LABEL: &str = "ktwin/twin-interface";

/// Label naming the Trigger a Binding feeds
pub const TRIGGER_LABEL: &str = "eventing.knative.dev/trigger";

/// Ties a generated object to the Interface that owns it, so deleting the
/// Interface garbage-collects its topology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,
}

impl From<&TwinInterface> for OwnerReference {
    fn from(interface: &TwinInterface) -> Self {
        Self {
            api_version: interface.api_version.clone(),
            kind: interface.kind.clone(),
            name: interface.metadata.name.clone(),
            uid: interface.metadata.uid.clone(),
        }
    }
}

pub(crate) fn trigger_labels(interface_name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(INTERFACE_LABEL.to_string(), interface_name.to_string())])
}

pub(crate) fn binding_labels(interface_name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (INTERFACE_LABEL.to_string(), interface_name.to_string()),
        (TRIGGER_LABEL.to_string(), interface_name.to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_reference_from_interface() {
        let mut interface = TwinInterface::new("fleet");
        interface.metadata.uid = "abc-123".to_string();

        let owner = OwnerReference::from(&interface);
        assert_eq!(owner.api_version, "dtd.ktwin/v0");
        assert_eq!(owner.kind, "TwinInterface");
        assert_eq!(owner.uid, "abc-123");
    }
}
