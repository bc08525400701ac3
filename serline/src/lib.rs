//! serline - serial-device communication engine
//!
//! Owns a physical or virtual serial connection, accumulates inbound bytes
//! into a bounded stream buffer, extracts discrete application frames with
//! independently configurable header/terminator filters, tracks throughput,
//! and translates driver faults into a stable error taxonomy.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `serline-core`: error taxonomy, port metadata and lifecycle state
//! - `serline-transport`: the `SerialLink` trait, its tokio-serial
//!   implementation, fault mapping, and the port catalog
//! - `serline-session`: stream buffer, frame filters, throughput meter,
//!   event bus, and the connection manager
//!
//! # Usage
//!
//! ```no_run
//! use serline::{ConnectionManager, FrameFilterConfig};
//!
//! # async fn demo() -> serline::LinkResult<()> {
//! let mut manager = ConnectionManager::new();
//! let mut events = manager.subscribe();
//! let mut frames = manager.register_filter(FrameFilterConfig::new(b"<<", b">>"));
//!
//! if let Some(port) = manager.scan_ports()?.into_iter().next() {
//!     manager.select_port(port);
//!     manager.connect().await?;
//! }
//!
//! loop {
//!     let _ = manager.drive().await;
//!     while let Ok(frame) = frames.try_recv() {
//!         println!("frame: {frame:?}");
//!     }
//!     while let Ok(event) = events.try_recv() {
//!         println!("event: {event:?}");
//!     }
//! }
//! # }
//! ```

// Re-export core types
pub use serline_core::{ConnectionState, DeviceFault, LinkError, LinkResult, NO_PORT, PortDescriptor};

// Re-export the transport layer
pub use serline_transport::{LinkSettings, PortCatalog, SerialLink, SerialPortLink};

// Re-export the session layer
pub use serline_session::{
    ByteStreamBuffer, ConnectionManager, DEFAULT_BUFFER_CAP, EngineEvent, ErrorReporter, EventBus,
    Frame, FrameFilter, FrameFilterConfig, THROUGHPUT_WINDOW, ThroughputMeter, ThroughputSample,
    decode_frame_text,
};
