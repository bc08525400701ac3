//! Core types and error taxonomy for the serline engine

pub mod error;
pub mod port;

pub use error::{DeviceFault, LinkError, LinkResult};
pub use port::{ConnectionState, PortDescriptor, NO_PORT};
