//! Host-level records produced by the extractors.
//!
//! Magnitude fields (`"227G"`, `"3.5Gi"`, `"20%"`) are kept exactly as the
//! host printed them; conversion to numbers happens in the exporter via
//! [`crate::normalize`].

use serde::Serialize;

/// MAC placeholder for interfaces that never showed up in a link listing.
pub const UNKNOWN_MAC: &str = "unknown";

/// Status line reported for services whose unit file does not exist.
pub const NOT_PRESENT_STATUS: &str = "not present on system";

/// Machine identity.
#[derive(Clone, Serialize, Debug, Default, PartialEq, Eq)]
pub struct SystemIdentity {
    /// Source: `uname --nodename`
    pub hostname: String,
    /// Source: `lsb_release -ds`, falling back to `PRETTY_NAME` in `/etc/os-release`
    pub distribution: String,
    /// Source: `uname -r`
    pub kernel: String,
}

/// 1, 5 and 15 minute load averages, always reported together.
#[derive(Clone, Copy, Serialize, Debug, Default, PartialEq)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

/// Uptime, load and memory summary.
///
/// String fields are empty when the host did not report them.
#[derive(Clone, Serialize, Debug, Default, PartialEq)]
pub struct ResourceSample {
    /// Free-text uptime phrase, e.g. `up 3 days, 4 hours, 5 minutes`.
    /// Source: `uptime -p`
    pub uptime: String,
    /// Source: `load average:` fragment of `uptime`
    #[serde(rename = "load_average")]
    pub load: Option<LoadAverage>,
    /// Source: `Mem:` row of `free -h`, third column
    pub memory_used: String,
    /// Source: `Mem:` row of `free -h`, fourth column
    pub memory_available: String,
    /// Source: `Swap:` row of `free -h`, third column
    pub swap_used: String,
    /// Source: `Swap:` row of `free -h`, fourth column
    pub swap_available: String,
}

/// One network interface with its addresses.
#[derive(Clone, Serialize, Debug, PartialEq, Eq)]
pub struct NetworkInterface {
    /// Interface name, unique within a snapshot.
    pub name: String,
    /// Hardware address or [`UNKNOWN_MAC`].
    pub mac: String,
    /// IPv4 addresses (with or without prefix length), first-seen order.
    pub ipv4: Vec<String>,
    /// IPv6 addresses with prefix length, first-seen order.
    pub ipv6: Vec<String>,
}

impl NetworkInterface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mac: UNKNOWN_MAC.to_string(),
            ipv4: Vec::new(),
            ipv6: Vec::new(),
        }
    }

    /// Adds an IPv4 address unless it is already listed.
    pub fn add_ipv4(&mut self, addr: &str) {
        if !self.ipv4.iter().any(|a| a == addr) {
            self.ipv4.push(addr.to_string());
        }
    }

    /// Adds an IPv6 address unless it is already listed.
    pub fn add_ipv6(&mut self, addr: &str) {
        if !self.ipv6.iter().any(|a| a == addr) {
            self.ipv6.push(addr.to_string());
        }
    }

    pub fn has_mac(&self) -> bool {
        self.mac != UNKNOWN_MAC
    }
}

/// Human accounts and current sessions.
#[derive(Clone, Serialize, Debug, Default, PartialEq, Eq)]
pub struct UserSnapshot {
    /// Accounts from `/etc/passwd` above the human UID threshold.
    pub humans: Vec<String>,
    /// Distinct names from `who`, sorted.
    pub logged_in: Vec<String>,
}

/// One `df -h` row for a real device.
#[derive(Clone, Serialize, Debug, Default, PartialEq, Eq)]
pub struct DiskPartition {
    /// Device path, e.g. `/dev/sda1`.
    pub device: String,
    pub size: String,
    pub used: String,
    pub available: String,
    /// Percentage string as printed, e.g. `20%`.
    pub use_percent: String,
}

/// Per-program throughput captured by `nethogs`, in kilobytes.
#[derive(Clone, Serialize, Debug, Default, PartialEq)]
pub struct NetworkFluxEntry {
    pub interface: String,
    pub sent_kb: f64,
    pub received_kb: f64,
}

impl NetworkFluxEntry {
    pub fn total_kb(&self) -> f64 {
        self.sent_kb + self.received_kb
    }
}

/// State of a systemd unit.
#[derive(Clone, Serialize, Debug, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ServiceState {
    /// Unit file exists; both fields hold the raw `systemctl` answers.
    Present { active: String, enabled: String },
    /// No unit file for this name.
    NotPresent,
}

/// A checked service keyed by its short name (no `.service` suffix).
#[derive(Clone, Serialize, Debug, PartialEq, Eq)]
pub struct ServiceStatus {
    pub name: String,
    #[serde(flatten)]
    pub state: ServiceState,
}

impl ServiceStatus {
    /// `"<active> / <enabled>"`, or [`NOT_PRESENT_STATUS`].
    pub fn status_line(&self) -> String {
        match &self.state {
            ServiceState::Present { active, enabled } => format!("{} / {}", active, enabled),
            ServiceState::NotPresent => NOT_PRESENT_STATUS.to_string(),
        }
    }

    /// Active unless the status line mentions `inactive`; absent units never count.
    pub fn is_active(&self) -> bool {
        match self.state {
            ServiceState::Present { .. } => !self.status_line().contains("inactive"),
            ServiceState::NotPresent => false,
        }
    }
}
