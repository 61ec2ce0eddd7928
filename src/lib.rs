// ABOUTME: Library root for impeller - exposes the orchestration engine for testing.
// ABOUTME: The main binary is in main.rs.

pub mod audit;
pub mod command;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod orchestrator;
pub mod output;
pub mod types;
