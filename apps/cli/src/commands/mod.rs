//! Command implementations for the Lathe CLI.

pub mod evaluate;
pub mod reset;
pub mod status;
pub mod train;
pub mod upload;
pub mod watch;
