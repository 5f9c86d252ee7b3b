//! hostaudit - point-in-time host audit library.
//!
//! Gathers identity, load, memory, interfaces, users, disks, busy processes,
//! per-program network throughput and systemd service state from a host
//! (locally or over SSH) and renders them as a text report, a JSON snapshot or
//! a Prometheus text exposition file.
//!
//! This library backs the `hostaudit` binary.

pub mod collector;
pub mod config;
pub mod error;
pub mod exporter;
pub mod normalize;
pub mod report;
pub mod storage;
