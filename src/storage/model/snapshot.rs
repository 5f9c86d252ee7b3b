//! The aggregate audit snapshot.
//!
//! One `AuditSnapshot` is assembled per invocation and then consumed either by
//! the text report or by the JSON/Prometheus exporters.

use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};

use super::process::ProcessThresholdReport;
use super::system::{
    DiskPartition, NetworkFluxEntry, NetworkInterface, ResourceSample, ServiceStatus,
    SystemIdentity, UserSnapshot,
};

/// Timestamp layout used in the JSON document.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Label value used when the host did not report its name.
pub const UNKNOWN_HOSTNAME: &str = "unknown";

/// Point-in-time view of a host.
///
/// Field order matches collection order and the JSON document layout.
#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct AuditSnapshot {
    /// Wall-clock time taken once, before the first command ran.
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Local>,
    #[serde(rename = "system_info")]
    pub identity: SystemIdentity,
    pub resources: ResourceSample,
    #[serde(rename = "network_interfaces")]
    pub interfaces: Vec<NetworkInterface>,
    pub users: UserSnapshot,
    #[serde(rename = "disk_space")]
    pub partitions: Vec<DiskPartition>,
    pub processes: ProcessThresholdReport,
    #[serde(rename = "network_flux")]
    pub flux: Vec<NetworkFluxEntry>,
    pub services: Vec<ServiceStatus>,
}

impl AuditSnapshot {
    /// Creates a snapshot with every section empty.
    pub fn empty(timestamp: DateTime<Local>) -> Self {
        Self {
            timestamp,
            identity: SystemIdentity::default(),
            resources: ResourceSample::default(),
            interfaces: Vec::new(),
            users: UserSnapshot::default(),
            partitions: Vec::new(),
            processes: ProcessThresholdReport::default(),
            flux: Vec::new(),
            services: Vec::new(),
        }
    }

    /// Hostname for metric labels, [`UNKNOWN_HOSTNAME`] when empty.
    pub fn hostname(&self) -> &str {
        if self.identity.hostname.is_empty() {
            UNKNOWN_HOSTNAME
        } else {
            &self.identity.hostname
        }
    }
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Local>, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&ts.format(TIMESTAMP_FORMAT))
}
