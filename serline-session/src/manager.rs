//! Connection manager: owns the serial link and fans inbound bytes out

use crate::buffer::ByteStreamBuffer;
use crate::events::{EngineEvent, EventBus};
use crate::filter::{Frame, FrameFilter, FrameFilterConfig};
use crate::meter::{THROUGHPUT_WINDOW, ThroughputMeter};
use crate::reporter::ErrorReporter;
use bytes::Bytes;
use serline_core::{ConnectionState, DeviceFault, LinkError, LinkResult, PortDescriptor};
use serline_transport::{LinkSettings, PortCatalog, SerialLink, SerialPortLink};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Pause between dropping and raising the wake control lines.
const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Default cap on buffered, not-yet-consumed inbound bytes.
pub const DEFAULT_BUFFER_CAP: usize = 1024;

const READ_CHUNK: usize = 4096;

type LinkFactory = Box<dyn Fn() -> Box<dyn SerialLink> + Send>;

struct RegisteredFilter {
    filter: FrameFilter,
    frames: mpsc::UnboundedSender<Frame>,
}

enum Step {
    Tick,
    Read(LinkResult<usize>),
}

/// Owns the transport handle, drives its lifecycle, and routes inbound
/// bytes to the stream buffer and the registered frame filters.
///
/// The engine is single-task and event-driven: every method takes
/// `&mut self`, transport and timer activity are serialized through
/// [`drive`], and no locking exists anywhere. The transport handle and the
/// stream buffer are exclusively owned here; filters only observe the
/// buffer through their consumption cursors.
///
/// Construct inside a Tokio runtime: the throughput window starts ticking
/// at construction and keeps reporting (zeroes included) while
/// disconnected.
///
/// [`drive`]: ConnectionManager::drive
pub struct ConnectionManager {
    link: Option<Box<dyn SerialLink>>,
    make_link: LinkFactory,
    selected: PortDescriptor,
    state: ConnectionState,
    buffer: ByteStreamBuffer,
    filters: Vec<RegisteredFilter>,
    meter: ThroughputMeter,
    bus: EventBus,
    window: Interval,
}

impl ConnectionManager {
    /// Manager over real serial hardware.
    pub fn new() -> Self {
        Self::with_link_factory(|| Box::new(SerialPortLink::new()) as Box<dyn SerialLink>)
    }

    /// Manager over an arbitrary link implementation.
    pub fn with_link_factory<F>(make_link: F) -> Self
    where
        F: Fn() -> Box<dyn SerialLink> + Send + 'static,
    {
        let make_link: LinkFactory = Box::new(make_link);
        let link = Some(make_link());
        let mut window =
            tokio::time::interval_at(Instant::now() + THROUGHPUT_WINDOW, THROUGHPUT_WINDOW);
        window.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self {
            link,
            make_link,
            selected: PortDescriptor::none(),
            state: ConnectionState::Disconnected,
            buffer: ByteStreamBuffer::new(DEFAULT_BUFFER_CAP),
            filters: Vec::new(),
            meter: ThroughputMeter::new(),
            bus: EventBus::new(),
            window,
        }
    }

    /// Subscribe to engine notifications.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<EngineEvent> {
        self.bus.subscribe()
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn selected_port(&self) -> &PortDescriptor {
        &self.selected
    }

    pub fn meter(&self) -> &ThroughputMeter {
        &self.meter
    }

    /// Enumerate the serial interfaces currently visible to the OS.
    pub fn scan_ports(&self) -> LinkResult<Vec<PortDescriptor>> {
        PortCatalog::scan()
    }

    /// Set the connection target. No side effects on the transport.
    pub fn select_port(&mut self, descriptor: PortDescriptor) {
        self.selected = descriptor;
    }

    /// Change the baud rate used by the next `connect`.
    pub fn set_baud_rate(&mut self, baud_rate: u32) {
        self.selected.baud_rate = baud_rate;
    }

    /// Register a frame filter; the frames it extracts arrive on the
    /// returned channel. The same pattern may be registered repeatedly,
    /// each registration keeping its own consumption cursor over the
    /// shared stream.
    pub fn register_filter(&mut self, config: FrameFilterConfig) -> mpsc::UnboundedReceiver<Frame> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.filters.push(RegisteredFilter {
            filter: FrameFilter::new(config),
            frames: tx,
        });
        rx
    }

    /// Open the selected port in read-write mode: 8 data bits, no parity,
    /// one stop bit, no flow control, at the descriptor's baud rate.
    ///
    /// Connecting while already open closes the old line first. On success
    /// the stream buffer is cleared, the connection-changed notification
    /// fires, and the wake sequence runs before this returns.
    pub async fn connect(&mut self) -> LinkResult<()> {
        if self.selected.is_none() {
            self.fault("No port selected".to_string());
            return Err(LinkError::NoPortSelected);
        }
        if self.link.is_none() {
            // Fatal lifecycle violation; not routed through the fault
            // channel because the caller has to fix its construction order.
            return Err(LinkError::NotInitialized);
        }

        self.state = ConnectionState::Connecting;
        let settings = LinkSettings::new(self.selected.name.clone(), self.selected.baud_rate);
        let opened = match self.link.as_mut() {
            Some(link) => {
                if link.is_open() {
                    let _ = link.close().await;
                }
                link.open(&settings).await
            }
            None => Err(LinkError::NotInitialized),
        };

        if let Err(e) = opened {
            self.state = ConnectionState::Disconnected;
            self.fault(e.to_string());
            return Err(e);
        }

        self.buffer.clear();
        self.state = ConnectionState::Connected;
        self.bus.publish(&EngineEvent::ConnectionChanged(true));
        log::info!(
            "connected to {} at {} baud",
            self.selected.name,
            self.selected.baud_rate
        );

        if let Err(e) = self.toggle_wake_signals().await {
            self.fault(e.to_string());
            return Err(e);
        }
        Ok(())
    }

    /// Scan and connect to the first port whose manufacturer does not
    /// contain `exclude_manufacturer`, keeping the currently configured
    /// baud rate.
    pub async fn auto_connect(&mut self, exclude_manufacturer: &str) -> LinkResult<()> {
        let baud_rate = self.selected.baud_rate;
        for mut port in self.scan_ports()? {
            if port.manufacturer.contains(exclude_manufacturer) {
                continue;
            }
            port.baud_rate = baud_rate;
            self.selected = port;
            if self.connect().await.is_ok() {
                return Ok(());
            }
        }
        self.fault("No suitable serial port found".to_string());
        Err(LinkError::NoPortSelected)
    }

    /// Close the transport and settle in `Disconnected`.
    ///
    /// Close faults are reported on the fault channel but never propagate:
    /// whatever happens, the state machine ends up Disconnected.
    pub async fn disconnect(&mut self) {
        let mut close_error = None;
        if let Some(link) = self.link.as_mut() {
            if link.is_open() {
                if let Err(e) = link.close().await {
                    close_error = Some(e);
                }
            }
        }
        if let Some(e) = close_error {
            self.fault(format!("Error disconnecting: {e}"));
        }
        self.state = ConnectionState::Disconnected;
        self.bus.publish(&EngineEvent::ConnectionChanged(false));
    }

    /// Tear down and recreate the transport handle, discarding any
    /// unconsumed buffered bytes and the current port selection.
    ///
    /// The recovery hammer for a link object stuck in an internal state
    /// that an ordinary close/reopen cannot clear. This is the only
    /// operation that unconditionally throws away in-flight buffer
    /// content.
    pub async fn reset(&mut self) {
        if let Some(mut link) = self.link.take() {
            if link.is_open() {
                let _ = link.close().await;
            }
        }
        self.buffer.clear();
        self.selected = PortDescriptor::none();
        self.link = Some((self.make_link)());
        self.state = ConnectionState::Disconnected;
        self.bus.publish(&EngineEvent::ConnectionChanged(false));
        log::debug!("transport handle recreated");
    }

    /// Write `data` to the open link in one attempt.
    ///
    /// The bytes-sent notification always carries the exact input bytes. A
    /// short write is a failure; retrying is the caller's decision, never
    /// done here.
    pub async fn send_bytes(&mut self, data: &[u8]) -> LinkResult<()> {
        if !self.state.is_connected() {
            self.device_fault(&DeviceFault::NotOpen);
            return Err(LinkError::PortNotOpen);
        }

        let written = match self.link.as_mut() {
            Some(link) => link.write(data).await,
            None => return Err(LinkError::NotInitialized),
        };
        let written = match written {
            Ok(n) => n,
            Err(e) => {
                let reason = e.to_string();
                self.fault(format!(
                    "Error sending data on {}: {reason}",
                    self.selected.name
                ));
                return Err(LinkError::WriteFailure(reason));
            }
        };

        self.meter.record_sent(written);
        self.bus
            .publish(&EngineEvent::BytesSent(Bytes::copy_from_slice(data)));

        if written != data.len() {
            let reason = format!("short write: {written} of {} bytes", data.len());
            self.fault(format!(
                "Error sending data on {}: {reason}",
                self.selected.name
            ));
            return Err(LinkError::WriteFailure(reason));
        }
        Ok(())
    }

    /// Route one inbound chunk: buffer it, evict to the cap, account it,
    /// publish the raw bytes, then let every filter consume in
    /// registration order.
    pub fn on_bytes_available(&mut self, chunk: &[u8]) {
        if chunk.is_empty() {
            return;
        }
        self.buffer.append(chunk);
        let dropped = self.buffer.evict_to_capacity();
        if dropped > 0 {
            log::debug!("stream buffer over capacity, dropped {dropped} oldest bytes");
        }
        self.meter.record_received(chunk.len());
        self.bus
            .publish(&EngineEvent::BytesReceived(Bytes::copy_from_slice(chunk)));

        for registered in &mut self.filters {
            for frame in registered.filter.poll(&self.buffer) {
                let _ = registered.frames.send(frame);
            }
        }
    }

    /// Drop then raise DTR and RTS to wake the attached device. No-op when
    /// the link is closed.
    ///
    /// The settle delay is timer-deferred, so concurrent timers keep
    /// running; the sequence itself still spans roughly 100 ms.
    pub async fn toggle_wake_signals(&mut self) -> LinkResult<()> {
        let Some(link) = self.link.as_mut() else {
            return Err(LinkError::NotInitialized);
        };
        if !link.is_open() {
            return Ok(());
        }
        link.set_data_terminal_ready(false).await?;
        link.set_request_to_send(false).await?;
        tokio::time::sleep(SETTLE_DELAY).await;
        link.set_data_terminal_ready(true).await?;
        link.set_request_to_send(true).await?;
        Ok(())
    }

    /// One step of the engine's scheduler: wait for inbound bytes or the
    /// next throughput tick, whichever comes first, and process it.
    ///
    /// Read faults are published on the fault channel and returned; the
    /// embedding shell just keeps calling this in its loop.
    pub async fn drive(&mut self) -> LinkResult<()> {
        let mut chunk = [0u8; READ_CHUNK];
        let step = if self.state.is_connected() {
            let buf = &mut chunk[..];
            tokio::select! {
                _ = self.window.tick() => Step::Tick,
                result = read_step(self.link.as_mut(), buf) => Step::Read(result),
            }
        } else {
            self.window.tick().await;
            Step::Tick
        };

        match step {
            Step::Tick => {
                let sample = self.meter.take_sample();
                self.bus
                    .publish(&EngineEvent::Throughput(sample.bytes_in_window));
                Ok(())
            }
            Step::Read(Ok(0)) => Err(self.fail_link(DeviceFault::ResourceUnavailable).await),
            Step::Read(Ok(n)) => {
                self.on_bytes_available(&chunk[..n]);
                Ok(())
            }
            Step::Read(Err(LinkError::NotInitialized)) => Err(LinkError::NotInitialized),
            Step::Read(Err(LinkError::Device(fault))) => Err(self.fail_link(fault).await),
            Step::Read(Err(e)) => {
                self.state = ConnectionState::Faulted;
                let reason = e.to_string();
                self.fault(format!(
                    "Error reading from {}: {reason}",
                    self.selected.name
                ));
                Err(LinkError::ReadFailure(reason))
            }
        }
    }

    /// Close the link after a device fault and report it.
    async fn fail_link(&mut self, fault: DeviceFault) -> LinkError {
        if let Some(link) = self.link.as_mut() {
            let _ = link.close().await;
        }
        self.state = ConnectionState::Faulted;
        self.device_fault(&fault);
        self.bus.publish(&EngineEvent::ConnectionChanged(false));
        LinkError::ReadFailure(fault.to_string())
    }

    fn fault(&self, message: String) {
        log::error!("{message}");
        self.bus.publish(&EngineEvent::Fault(message));
    }

    fn device_fault(&self, fault: &DeviceFault) {
        let port = (!self.selected.is_none()).then(|| self.selected.name.as_str());
        self.fault(ErrorReporter::describe(fault, port));
    }
}

async fn read_step(
    link: Option<&mut Box<dyn SerialLink>>,
    buf: &mut [u8],
) -> LinkResult<usize> {
    match link {
        Some(link) => link.read(buf).await,
        None => Err(LinkError::NotInitialized),
    }
}
