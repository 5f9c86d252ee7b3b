//! Audit configuration.
//!
//! Filled by the command line in the binary; library users can start from
//! [`AuditConfig::default`].

use std::time::Duration;

use crate::normalize::UnitBase;

/// Services checked when none are requested.
pub const DEFAULT_SERVICES: [&str; 3] = ["ssh", "cron", "docker"];

/// Accounts with a high UID that are not people.
pub const EXCLUDED_ACCOUNTS: [&str; 3] = ["nobody", "nogroup", "nfsnobody"];

/// Settings consumed by the collector and the exporter.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditConfig {
    /// Keep processes whose %CPU is strictly above this value.
    pub cpu_threshold: f64,
    /// Keep processes whose %MEM is strictly above this value.
    pub memory_threshold: f64,
    /// Keep flux rows whose sent + received is at least this many kilobytes.
    pub flux_min_kb: f64,
    /// How long `nethogs` captures before it is stopped.
    pub flux_duration: Duration,
    /// Services to check; [`DEFAULT_SERVICES`] when empty.
    pub services: Vec<String>,
    /// Lowest UID considered a human account.
    pub min_human_uid: u32,
    /// How `K`/`M`/`G` suffixes are scaled in the exposition document.
    pub unit_base: UnitBase,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            cpu_threshold: 5.0,
            memory_threshold: 5.0,
            flux_min_kb: 2.0,
            flux_duration: Duration::from_secs(3),
            services: Vec::new(),
            min_human_uid: 1000,
            unit_base: UnitBase::Binary,
        }
    }
}

impl AuditConfig {
    /// Requested service names with blanks and repeats dropped, or the
    /// defaults. The first mention of a name fixes its position.
    pub fn services_to_check(&self) -> Vec<String> {
        let mut requested: Vec<String> = Vec::new();
        for name in self.services.iter().map(|s| s.trim()) {
            if !name.is_empty() && !requested.iter().any(|r| r == name) {
                requested.push(name.to_string());
            }
        }

        if requested.is_empty() {
            DEFAULT_SERVICES.iter().map(|s| s.to_string()).collect()
        } else {
            requested
        }
    }
}
