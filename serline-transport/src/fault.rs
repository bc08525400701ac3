//! Mapping from driver errors onto the closed fault taxonomy

use serline_core::DeviceFault;

/// Map a tokio-serial error onto the fault taxonomy.
pub fn map_serial_error(error: &tokio_serial::Error) -> DeviceFault {
    match error.kind() {
        tokio_serial::ErrorKind::NoDevice => DeviceFault::DeviceNotFound,
        tokio_serial::ErrorKind::InvalidInput => DeviceFault::UnsupportedOperation,
        tokio_serial::ErrorKind::Io(kind) => map_io_kind(kind, None),
        tokio_serial::ErrorKind::Unknown => DeviceFault::Unknown(-1),
    }
}

/// Map a raw I/O error onto the fault taxonomy, preserving the OS code for
/// anything outside the recognized kinds.
pub fn map_io_error(error: &std::io::Error) -> DeviceFault {
    map_io_kind(error.kind(), error.raw_os_error())
}

fn map_io_kind(kind: std::io::ErrorKind, code: Option<i32>) -> DeviceFault {
    use std::io::ErrorKind;

    match kind {
        ErrorKind::NotFound => DeviceFault::DeviceNotFound,
        ErrorKind::PermissionDenied => DeviceFault::PermissionDenied,
        ErrorKind::TimedOut | ErrorKind::WouldBlock => DeviceFault::Timeout,
        ErrorKind::BrokenPipe
        | ErrorKind::NotConnected
        | ErrorKind::ConnectionAborted
        | ErrorKind::ConnectionReset => DeviceFault::ResourceUnavailable,
        ErrorKind::Unsupported => DeviceFault::UnsupportedOperation,
        _ => DeviceFault::Unknown(code.unwrap_or(-1)),
    }
}
