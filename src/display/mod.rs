//! Display formatting for terminal output
//!
//! Provides utilities for formatting audit records and deltas for terminal
//! display.

pub mod delta;
pub mod record;

pub use delta::format_delta;
pub use record::{format_record_details, format_record_list};
