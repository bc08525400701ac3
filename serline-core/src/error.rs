use thiserror::Error;

/// Fault kinds raised by the underlying serial driver.
///
/// Closed taxonomy: every driver-level error maps onto exactly one of these
/// variants, with `Unknown` carrying the raw OS code for diagnostics.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceFault {
    #[error("device not found")]
    DeviceNotFound,

    #[error("permission denied")]
    PermissionDenied,

    #[error("resource unavailable")]
    ResourceUnavailable,

    #[error("unsupported operation")]
    UnsupportedOperation,

    #[error("operation timed out")]
    Timeout,

    #[error("port not open")]
    NotOpen,

    #[error("unknown fault (code {0})")]
    Unknown(i32),
}

/// Main error type for serline operations
#[derive(Error, Debug)]
pub enum LinkError {
    /// The transport handle was used before construction finished or after
    /// a teardown left it absent. A lifecycle violation on the caller's
    /// side, not a user-recoverable condition.
    #[error("Transport not initialized")]
    NotInitialized,

    #[error("No port selected")]
    NoPortSelected,

    #[error("Failed to open port {port}: {reason}")]
    OpenFailure { port: String, reason: String },

    #[error("Port is not open")]
    PortNotOpen,

    #[error("Write failed: {0}")]
    WriteFailure(String),

    #[error("Read failed: {0}")]
    ReadFailure(String),

    #[error("Device fault: {0}")]
    Device(#[from] DeviceFault),

    #[error("Decode failed: {0}")]
    DecodeFailure(String),
}

/// Result type alias for serline operations
pub type LinkResult<T> = Result<T, LinkError>;
