//! Serial interface enumeration

use crate::fault::map_serial_error;
use serline_core::{LinkError, LinkResult, PortDescriptor};
use tokio_serial::SerialPortType;

/// Stateless enumeration of the serial interfaces visible to the OS.
pub struct PortCatalog;

impl PortCatalog {
    /// List the currently available ports with their metadata.
    ///
    /// Results are only trustworthy for the duration of this call; the OS
    /// topology can change at any moment and descriptors are never cached.
    pub fn scan() -> LinkResult<Vec<PortDescriptor>> {
        let ports = tokio_serial::available_ports()
            .map_err(|e| LinkError::Device(map_serial_error(&e)))?;

        Ok(ports.into_iter().map(Self::describe).collect())
    }

    fn describe(info: tokio_serial::SerialPortInfo) -> PortDescriptor {
        let (description, manufacturer) = match info.port_type {
            SerialPortType::UsbPort(usb) => (
                usb.product.unwrap_or_default(),
                usb.manufacturer.unwrap_or_default(),
            ),
            SerialPortType::BluetoothPort => ("Bluetooth".to_string(), String::new()),
            SerialPortType::PciPort => ("PCI".to_string(), String::new()),
            SerialPortType::Unknown => (String::new(), String::new()),
        };
        PortDescriptor::new(info.port_name, description, manufacturer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_usb_ports_get_a_type_label() {
        let port = PortCatalog::describe(tokio_serial::SerialPortInfo {
            port_name: "/dev/ttyS0".to_string(),
            port_type: SerialPortType::PciPort,
        });
        assert_eq!(port.name, "/dev/ttyS0");
        assert_eq!(port.description, "PCI");
        assert_eq!(port.baud_rate, PortDescriptor::DEFAULT_BAUD_RATE);
    }

    #[test]
    fn unknown_ports_have_empty_metadata() {
        let port = PortCatalog::describe(tokio_serial::SerialPortInfo {
            port_name: "COM9".to_string(),
            port_type: SerialPortType::Unknown,
        });
        assert!(port.description.is_empty());
        assert!(port.manufacturer.is_empty());
    }
}
