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

//! Naming contract for twin resources and event channels
//!
//! Event type strings are consumed verbatim by the broker and by deployed
//! twin services, so the format here is a wire contract:
//! `real.<normalizedId>` and `virtual.<normalizedId>`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters that are not valid in RFC-1123 host names and get replaced by `-`
const INVALID_CHARACTERS: [char; 3] = [':', ';', '_'];

/// Make a name compliant with RFC-1123 host names.
///
/// Lower-cases the input and replaces `:`, `;` and `_` with `-`.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if INVALID_CHARACTERS.contains(&c) { '-' } else { c })
        .collect()
}

/// Which side of a twin produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventDirection {
    /// Published by the physical ("real") twin
    Real,
    /// Published by the compute-service ("virtual") twin
    Virtual,
}

impl EventDirection {
    pub const ALL: [EventDirection; 2] = [EventDirection::Real, EventDirection::Virtual];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventDirection::Real => "real",
            EventDirection::Virtual => "virtual",
        }
    }
}

impl fmt::Display for EventDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A computed event channel name, used as a filter value on triggers and bindings
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventChannel {
    direction: EventDirection,
    interface_id: String,
}

impl EventChannel {
    /// Channel for an interface id; the id is normalized here
    pub fn new(direction: EventDirection, interface_id: &str) -> Self {
        Self {
            direction,
            interface_id: normalize_name(interface_id),
        }
    }

    pub fn real(interface_id: &str) -> Self {
        Self::new(EventDirection::Real, interface_id)
    }

    pub fn virtual_(interface_id: &str) -> Self {
        Self::new(EventDirection::Virtual, interface_id)
    }

    pub fn direction(&self) -> EventDirection {
        self.direction
    }

    pub fn interface_id(&self) -> &str {
        &self.interface_id
    }

    /// Topic-exchange routing key matching this channel and any sub-topic
    pub fn wildcard_routing_key(&self) -> String {
        format!("{}.#", self)
    }
}

impl fmt::Display for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.direction, self.interface_id)
    }
}

impl From<EventChannel> for String {
    fn from(channel: EventChannel) -> Self {
        channel.to_string()
    }
}
