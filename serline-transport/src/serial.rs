//! Serial port link implementation

use crate::fault::{map_io_error, map_serial_error};
use crate::link::{LinkSettings, SerialLink};
use async_trait::async_trait;
use serline_core::{DeviceFault, LinkError, LinkResult};
use std::fmt;
use std::ops::{Deref, DerefMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{SerialPort, SerialStream};

/// Wrapper for SerialStream that implements Debug
struct DebugSerialStream(SerialStream);

impl fmt::Debug for DebugSerialStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialStream").finish()
    }
}

impl Deref for DebugSerialStream {
    type Target = SerialStream;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DebugSerialStream {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Serial link over a tokio-serial stream.
///
/// Holds no line parameters of its own; every `open` receives the settings
/// for that attempt, so a recreated link carries no stale configuration.
#[derive(Debug, Default)]
pub struct SerialPortLink {
    stream: Option<DebugSerialStream>,
}

impl SerialPortLink {
    pub fn new() -> Self {
        Self { stream: None }
    }

    fn stream_mut(&mut self) -> LinkResult<&mut DebugSerialStream> {
        self.stream
            .as_mut()
            .ok_or(LinkError::Device(DeviceFault::NotOpen))
    }
}

#[async_trait]
impl SerialLink for SerialPortLink {
    async fn open(&mut self, settings: &LinkSettings) -> LinkResult<()> {
        if self.stream.is_some() {
            self.close().await?;
        }

        let builder = tokio_serial::new(&settings.port_name, settings.baud_rate)
            .data_bits(settings.data_bits)
            .stop_bits(settings.stop_bits)
            .parity(settings.parity)
            .flow_control(settings.flow_control);

        let stream = SerialStream::open(&builder).map_err(|e| LinkError::OpenFailure {
            port: settings.port_name.clone(),
            reason: e.to_string(),
        })?;

        self.stream = Some(DebugSerialStream(stream));
        Ok(())
    }

    async fn close(&mut self) -> LinkResult<()> {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.flush().await;
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    async fn read(&mut self, buf: &mut [u8]) -> LinkResult<usize> {
        let stream = self.stream_mut()?;
        stream
            .read(buf)
            .await
            .map_err(|e| LinkError::Device(map_io_error(&e)))
    }

    async fn write(&mut self, buf: &[u8]) -> LinkResult<usize> {
        let stream = self.stream_mut()?;
        stream
            .write(buf)
            .await
            .map_err(|e| LinkError::Device(map_io_error(&e)))
    }

    async fn set_data_terminal_ready(&mut self, level: bool) -> LinkResult<()> {
        let stream = self.stream_mut()?;
        stream
            .write_data_terminal_ready(level)
            .map_err(|e| LinkError::Device(map_serial_error(&e)))
    }

    async fn set_request_to_send(&mut self, level: bool) -> LinkResult<()> {
        let stream = self.stream_mut()?;
        stream
            .write_request_to_send(level)
            .map_err(|e| LinkError::Device(map_serial_error(&e)))
    }
}
