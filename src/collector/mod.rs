//! Host audit collector.
//!
//! This module runs the audit commands on a host and parses their output into
//! typed records, with support for remote hosts over SSH and for mocking in
//! tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Collector                           │
//! │  ┌─────────────────────┐   ┌─────────────────────────────┐  │
//! │  │      commands       │   │          parser             │  │
//! │  │  - uname, uptime    │   │  - LineOutcome / Parsed     │  │
//! │  │  - ip, df, ps       │   │  - InterfaceTable           │  │
//! │  │  - nethogs, systemd │   │  - one extractor per domain │  │
//! │  └──────────┬──────────┘   └──────────────┬──────────────┘  │
//! │             └──────────────┬──────────────┘                 │
//! │                            │                                │
//! │                   ┌────────▼────────┐                       │
//! │                   │  CommandRunner  │ (trait)               │
//! │                   └────────┬────────┘                       │
//! └────────────────────────────┼────────────────────────────────┘
//!                              │
//!              ┌───────────────┼───────────────┐
//!              │               │               │
//!       ┌──────▼──────┐ ┌──────▼──────┐ ┌──────▼──────┐
//!       │ LocalRunner │ │  SshRunner  │ │ MockRunner  │
//!       │  (sh -c)    │ │  (remote)   │ │ (Testing)   │
//!       └─────────────┘ └─────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production
//!
//! ```no_run
//! use hostaudit::collector::{Collector, LocalRunner};
//! use hostaudit::config::AuditConfig;
//!
//! let mut collector = Collector::new(LocalRunner::new(), AuditConfig::default());
//! let snapshot = collector.collect_snapshot();
//! println!("{}", snapshot.identity.hostname);
//! ```
//!
//! ## Testing (with MockRunner)
//!
//! ```
//! use hostaudit::collector::{Collector, MockRunner};
//! use hostaudit::config::AuditConfig;
//!
//! let runner = MockRunner::typical_host();
//! let mut collector = Collector::new(runner, AuditConfig::default());
//! let snapshot = collector.collect_snapshot();
//! assert_eq!(snapshot.identity.hostname, "web-01");
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod commands;
pub mod mock;
pub mod parser;
pub mod traits;

pub use collector::{Collector, CollectorTiming};
pub use mock::MockRunner;
pub use parser::{LineOutcome, Parsed};
pub use traits::{CommandRunner, LocalRunner, SshRunner};
