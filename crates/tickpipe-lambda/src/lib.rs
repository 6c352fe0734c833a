//! Lambda entry-point support: logging setup and process-wide publisher
//! construction.
//!
//! Each binary builds its publisher on the first invocation and keeps it for
//! the life of the execution environment. A failed build is not cached, so
//! the next invocation tries again.

pub mod bootstrap;
pub mod telemetry;
