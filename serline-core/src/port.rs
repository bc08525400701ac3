//! Port metadata and connection lifecycle state

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel port name meaning "nothing selected".
pub const NO_PORT: &str = "none";

/// Metadata for one enumerated serial interface.
///
/// Identity is the transport-assigned name, unique only at scan time.
/// Descriptors are produced fresh by every scan and go stale the moment the
/// OS topology changes; no stored scan result is trusted beyond a single
/// enumeration call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDescriptor {
    pub name: String,
    pub description: String,
    pub manufacturer: String,
    pub baud_rate: u32,
}

impl PortDescriptor {
    pub const DEFAULT_BAUD_RATE: u32 = 115_200;

    pub fn new(name: String, description: String, manufacturer: String) -> Self {
        Self {
            name,
            description,
            manufacturer,
            baud_rate: Self::DEFAULT_BAUD_RATE,
        }
    }

    /// The "nothing selected" descriptor.
    pub fn none() -> Self {
        Self::new(NO_PORT.to_string(), NO_PORT.to_string(), NO_PORT.to_string())
    }

    /// True when this descriptor does not name a real port.
    pub fn is_none(&self) -> bool {
        self.name.is_empty() || self.name == NO_PORT
    }
}

impl Default for PortDescriptor {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for PortDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} | {}", self.name, self.description, self.manufacturer)
    }
}

/// Connection lifecycle state, owned exclusively by the connection manager
/// and mutated only through its lifecycle operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No open transport (initial state).
    #[default]
    Disconnected,
    /// An open attempt is in progress.
    Connecting,
    /// The transport is open and bytes are flowing.
    Connected,
    /// A device fault was raised while the link was open.
    Faulted,
}

impl ConnectionState {
    /// True when data may be sent and received.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_descriptor_is_recognized() {
        assert!(PortDescriptor::none().is_none());
        assert!(!PortDescriptor::new("/dev/ttyACM0".into(), String::new(), String::new()).is_none());
    }

    #[test]
    fn empty_name_counts_as_no_selection() {
        let mut port = PortDescriptor::none();
        port.name.clear();
        assert!(port.is_none());
    }

    #[test]
    fn display_joins_name_description_manufacturer() {
        let port = PortDescriptor::new(
            "COM3".to_string(),
            "USB Serial Device".to_string(),
            "FTDI".to_string(),
        );
        assert_eq!(port.to_string(), "COM3 | USB Serial Device | FTDI");
    }

    #[test]
    fn default_state_is_disconnected() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
        assert!(!ConnectionState::Disconnected.is_connected());
        assert!(ConnectionState::Connected.is_connected());
    }
}
