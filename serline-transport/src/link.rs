//! Serial link trait

use async_trait::async_trait;
use serline_core::LinkResult;

/// Line parameters for one open attempt.
///
/// The engine always runs 8 data bits, no parity, one stop bit and no flow
/// control; only the port name and baud rate vary between connections.
#[derive(Debug, Clone)]
pub struct LinkSettings {
    pub port_name: String,
    pub baud_rate: u32,
    pub data_bits: tokio_serial::DataBits,
    pub stop_bits: tokio_serial::StopBits,
    pub parity: tokio_serial::Parity,
    pub flow_control: tokio_serial::FlowControl,
}

impl LinkSettings {
    /// Settings for 8-N-1 with no flow control.
    pub fn new(port_name: String, baud_rate: u32) -> Self {
        Self {
            port_name,
            baud_rate,
            data_bits: tokio_serial::DataBits::Eight,
            stop_bits: tokio_serial::StopBits::One,
            parity: tokio_serial::Parity::None,
            flow_control: tokio_serial::FlowControl::None,
        }
    }
}

/// Access to one physical or virtual serial line.
///
/// The connection manager owns a boxed link and recreates it on reset.
/// Implementations must map every driver error onto
/// [`serline_core::DeviceFault`] so callers see the closed taxonomy rather
/// than raw driver errors.
#[async_trait]
pub trait SerialLink: Send {
    /// Open the line in read-write mode with the given parameters.
    async fn open(&mut self, settings: &LinkSettings) -> LinkResult<()>;

    /// Close the line. Closing an already-closed link is a no-op.
    async fn close(&mut self) -> LinkResult<()>;

    fn is_open(&self) -> bool;

    /// Read available bytes into `buf`, returning the count.
    ///
    /// `Ok(0)` means the device went away.
    async fn read(&mut self, buf: &mut [u8]) -> LinkResult<usize>;

    /// Write `buf` in a single attempt, returning the count the driver
    /// accepted. A short count is reported as-is, never retried here.
    async fn write(&mut self, buf: &[u8]) -> LinkResult<usize>;

    /// Drive the DTR control line.
    async fn set_data_terminal_ready(&mut self, level: bool) -> LinkResult<()>;

    /// Drive the RTS control line.
    async fn set_request_to_send(&mut self, level: bool) -> LinkResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_default_to_8n1_no_flow_control() {
        let settings = LinkSettings::new("/dev/ttyUSB0".to_string(), 9600);
        assert_eq!(settings.port_name, "/dev/ttyUSB0");
        assert_eq!(settings.baud_rate, 9600);
        assert_eq!(settings.data_bits, tokio_serial::DataBits::Eight);
        assert_eq!(settings.parity, tokio_serial::Parity::None);
        assert_eq!(settings.stop_bits, tokio_serial::StopBits::One);
        assert_eq!(settings.flow_control, tokio_serial::FlowControl::None);
    }
}
