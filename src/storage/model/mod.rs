//! Data models for an audit snapshot.
//!
//! - [`system`]: identity, resources, interfaces, users, disks, flux, services
//! - [`process`]: processes above the CPU/memory thresholds
//! - [`snapshot`]: the aggregate written to JSON and projected to Prometheus
//!
//! ```text
//! AuditSnapshot
//!   ├── SystemIdentity
//!   ├── ResourceSample ── Option<LoadAverage>
//!   ├── NetworkInterface[]
//!   ├── UserSnapshot
//!   ├── DiskPartition[]
//!   ├── ProcessThresholdReport
//!   ├── NetworkFluxEntry[]
//!   └── ServiceStatus[] ── ServiceState
//! ```

mod process;
mod snapshot;
mod system;

pub use process::ProcessThresholdReport;
pub use snapshot::{AuditSnapshot, TIMESTAMP_FORMAT, UNKNOWN_HOSTNAME};
pub use system::{
    DiskPartition, LoadAverage, NOT_PRESENT_STATUS, NetworkFluxEntry, NetworkInterface,
    ResourceSample, ServiceState, ServiceStatus, SystemIdentity, UNKNOWN_MAC, UserSnapshot,
};
