//! Library side of the `tabconv` binary.

pub mod commands;
pub mod logging;
