//! Fault-to-message rendering

use serline_core::DeviceFault;

/// Renders device faults as user-facing messages.
///
/// Every message names the affected port, or "no port" when none is
/// selected. There is no `NoError` to suppress: the transport layer only
/// surfaces real faults.
pub struct ErrorReporter;

impl ErrorReporter {
    /// Describe a fault against the port it occurred on.
    pub fn describe(fault: &DeviceFault, port: Option<&str>) -> String {
        let port = port.unwrap_or("no port");
        match fault {
            DeviceFault::DeviceNotFound => format!("Device {port} not found"),
            DeviceFault::PermissionDenied => format!("Permission denied on {port}"),
            DeviceFault::ResourceUnavailable => format!("Resource unavailable on {port}"),
            DeviceFault::UnsupportedOperation => format!("Unsupported operation on {port}"),
            DeviceFault::Timeout => format!("Timeout on {port}"),
            DeviceFault::NotOpen => format!("Port {port} is not open"),
            DeviceFault::Unknown(code) => format!("Unknown fault (code {code}) on {port}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_active_port() {
        let message = ErrorReporter::describe(&DeviceFault::DeviceNotFound, Some("/dev/ttyUSB0"));
        assert_eq!(message, "Device /dev/ttyUSB0 not found");
    }

    #[test]
    fn missing_port_reads_as_no_port() {
        let message = ErrorReporter::describe(&DeviceFault::PermissionDenied, None);
        assert_eq!(message, "Permission denied on no port");
    }

    #[test]
    fn unknown_fault_reports_the_raw_code() {
        let message = ErrorReporter::describe(&DeviceFault::Unknown(71), Some("COM3"));
        assert_eq!(message, "Unknown fault (code 71) on COM3");
    }
}
