//! Logging collaborator built on `tracing`. See `bin/logger_demo.rs` for a
//! binary exercising filter reloads.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
