// Licensed under the Apache-2.0 license

//! Shared infrastructure for the driver kit.
//!
//! Every driver carries a `Logger` as a generic parameter defaulting to
//! [`NoOpLogger`], so diagnostics can be routed to a UART (or anything else)
//! without the drivers depending on a concrete sink.

/// Diagnostic sink used by the drivers for protocol-level events
/// (NACKs, timeouts, give-ups).
pub trait Logger {
    fn log(&mut self, message: &str);
}

/// Logger that discards everything. The default for all drivers;
/// calls compile down to nothing.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    fn log(&mut self, _message: &str) {}
}
