//! Transport layer for the serline engine
//!
//! Defines the [`SerialLink`] trait the session layer drives, the
//! tokio-serial implementation of it, the mapping from driver errors onto
//! the closed fault taxonomy, and the port catalog.

pub mod catalog;
pub mod fault;
pub mod link;
pub mod serial;

pub use catalog::PortCatalog;
pub use fault::{map_io_error, map_serial_error};
pub use link::{LinkSettings, SerialLink};
pub use serial::SerialPortLink;
