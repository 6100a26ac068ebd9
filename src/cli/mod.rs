//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the audit store.

pub mod export;
pub mod trail;

pub use export::{handle_export, ExportArgs, ExportFormat};
pub use trail::{
    handle_delta, handle_list, handle_show, handle_stats, DeltaArgs, ListArgs, ShowArgs,
};
