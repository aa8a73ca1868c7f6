//! Storage infrastructure: settings and engine configuration files.
//!
//! - **`config`**      – The editor's own TOML settings file in the
//!   platform-appropriate directory, with defaults on first run.
//! - **`engine_file`** – Reads and atomically writes the document consumed by
//!   the synchronization engine.
//!
//! Keeping storage concerns here, rather than scattered throughout the
//! application, means the use cases only ever see [`kvm_topology::Document`]
//! and [`kvm_topology::ServerConfig`] values.

pub mod config;
pub mod engine_file;
