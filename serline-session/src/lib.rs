//! Session layer for the serline engine
//!
//! Everything between the raw serial link and the application: the bounded
//! stream buffer, header/terminator frame filters, throughput accounting,
//! the engine event bus, and the connection manager that ties them to a
//! [`serline_transport::SerialLink`].

pub mod buffer;
pub mod events;
pub mod filter;
pub mod manager;
pub mod meter;
pub mod reporter;

pub use buffer::ByteStreamBuffer;
pub use events::{EngineEvent, EventBus};
pub use filter::{Frame, FrameFilter, FrameFilterConfig, decode_frame_text};
pub use manager::{ConnectionManager, DEFAULT_BUFFER_CAP};
pub use meter::{THROUGHPUT_WINDOW, ThroughputMeter, ThroughputSample};
pub use reporter::ErrorReporter;
