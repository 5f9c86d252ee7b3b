//! Main collector that runs every extractor against one host.
//!
//! The `Collector` struct issues the audit commands through a
//! [`CommandRunner`] and assembles the parsed results into an `AuditSnapshot`.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use crate::collector::commands;
use crate::collector::parser::{self, InterfaceTable};
use crate::collector::traits::CommandRunner;
use crate::config::AuditConfig;
use crate::storage::model::{
    AuditSnapshot, DiskPartition, NetworkFluxEntry, NetworkInterface, ProcessThresholdReport,
    ResourceSample, ServiceState, ServiceStatus, SystemIdentity, UserSnapshot,
};

/// Timing information for each collector phase.
///
/// Used for debugging slow hosts and SSH links.
#[derive(Debug, Clone, Default)]
pub struct CollectorTiming {
    /// Total snapshot collection time.
    pub total: Duration,
    pub identity: Duration,
    pub resources: Duration,
    pub interfaces: Duration,
    pub users: Duration,
    pub disk: Duration,
    pub processes: Duration,
    /// Dominated by the nethogs capture window.
    pub flux: Duration,
    pub services: Duration,
}

/// Collects audit snapshots from one host.
pub struct Collector<R: CommandRunner> {
    runner: R,
    config: AuditConfig,
    /// Timing information from the last collect_snapshot call.
    last_timing: Option<CollectorTiming>,
}

impl<R: CommandRunner> Collector<R> {
    /// Creates a new collector.
    ///
    /// # Arguments
    /// * `runner` - Where commands run (local shell, SSH or mock)
    /// * `config` - Thresholds, services and capture duration
    pub fn new(runner: R, config: AuditConfig) -> Self {
        Self {
            runner,
            config,
            last_timing: None,
        }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Returns timing information from the last collect_snapshot call.
    pub fn last_timing(&self) -> Option<&CollectorTiming> {
        self.last_timing.as_ref()
    }

    /// Runs one command; failures become empty output.
    fn run(&self, command: &str) -> String {
        match self.runner.run(command) {
            Ok(output) => output,
            Err(e) => {
                warn!("command `{}` failed on {}: {}", command, self.runner.describe(), e);
                String::new()
            }
        }
    }

    pub fn identity(&self) -> SystemIdentity {
        parser::parse_identity(
            &self.run(commands::HOSTNAME),
            &self.run(commands::DISTRIBUTION),
            &self.run(commands::KERNEL),
        )
    }

    pub fn resources(&self) -> ResourceSample {
        let sample = parser::parse_resources(
            &self.run(commands::UPTIME_PRETTY),
            &self.run(commands::UPTIME),
            &self.run(commands::FREE),
        );
        if sample.load.is_none() {
            debug!("load average not found in uptime output");
        }
        sample
    }

    pub fn interfaces(&self) -> Vec<NetworkInterface> {
        let mut table = InterfaceTable::new();
        let (addr_matched, addr_skipped) = table.apply_addresses(&self.run(commands::IP_ADDR));
        let (link_matched, link_skipped) = table.apply_links(&self.run(commands::IP_LINK));
        let interfaces = table.into_interfaces();
        debug!(
            "interfaces: {} found ({} without MAC), addr lines {}/{} skipped, link lines {}/{} skipped",
            interfaces.len(),
            interfaces.iter().filter(|i| !i.has_mac()).count(),
            addr_skipped,
            addr_matched + addr_skipped,
            link_skipped,
            link_matched + link_skipped
        );
        interfaces
    }

    pub fn users(&self) -> UserSnapshot {
        let humans =
            parser::parse_human_accounts(&self.run(commands::PASSWD), self.config.min_human_uid);
        debug!(
            "users: {} human accounts, {} passwd lines skipped",
            humans.matched, humans.skipped
        );
        UserSnapshot {
            humans: humans.value,
            logged_in: parser::parse_logged_in(&self.run(commands::WHO)),
        }
    }

    pub fn disk_space(&self) -> Vec<DiskPartition> {
        let parsed = parser::parse_disk_space(&self.run(commands::DF));
        debug!(
            "disk: {} partitions, {} lines skipped",
            parsed.matched, parsed.skipped
        );
        parsed.value
    }

    pub fn processes(&self) -> ProcessThresholdReport {
        parser::parse_processes(
            &self.run(commands::PS_BY_CPU),
            &self.run(commands::PS_BY_MEM),
            self.config.cpu_threshold,
            self.config.memory_threshold,
        )
    }

    pub fn network_flux(&self) -> Vec<NetworkFluxEntry> {
        let output = self.run(&commands::nethogs(self.config.flux_duration));
        let parsed = parser::parse_flux(&output, self.config.flux_min_kb);
        debug!(
            "flux: {} rows kept, {} below {} KB or malformed",
            parsed.matched, parsed.skipped, self.config.flux_min_kb
        );
        parsed.value
    }

    /// Checks every configured service.
    ///
    /// Unit existence is checked first; only existing units cost two more
    /// round trips (`is-active`, `is-enabled`).
    pub fn services(&self) -> Vec<ServiceStatus> {
        self.config
            .services_to_check()
            .iter()
            .map(|name| self.service(name))
            .collect()
    }

    fn service(&self, name: &str) -> ServiceStatus {
        let (unit, short) = parser::unit_name(name);
        if !parser::is_valid_service_name(&short) {
            warn!("refusing to query service with invalid name {:?}", name);
            return ServiceStatus {
                name: short,
                state: ServiceState::NotPresent,
            };
        }

        let listing = self.run(&commands::unit_files(&unit));
        let state = if parser::unit_listed(&listing, &unit) {
            parser::service_state(
                &self.run(&commands::is_active(&short)),
                &self.run(&commands::is_enabled(&short)),
            )
        } else {
            ServiceState::NotPresent
        };
        ServiceStatus { name: short, state }
    }

    /// Whether commands run as root, `None` when `id -u` gave no answer.
    pub fn is_privileged(&self) -> Option<bool> {
        self.run(commands::EFFECTIVE_UID)
            .trim()
            .parse::<u32>()
            .ok()
            .map(|uid| uid == 0)
    }

    /// Collects a complete snapshot stamped with the current local time.
    pub fn collect_snapshot(&mut self) -> AuditSnapshot {
        self.collect_snapshot_at(Local::now())
    }

    /// Collects a complete snapshot with the given timestamp.
    ///
    /// Sections are gathered in document order; a failing command leaves its
    /// section empty and never aborts the snapshot.
    pub fn collect_snapshot_at(&mut self, timestamp: DateTime<Local>) -> AuditSnapshot {
        let total_start = Instant::now();
        let mut timing = CollectorTiming::default();
        let mut snapshot = AuditSnapshot::empty(timestamp);

        let start = Instant::now();
        snapshot.identity = self.identity();
        timing.identity = start.elapsed();

        let start = Instant::now();
        snapshot.resources = self.resources();
        timing.resources = start.elapsed();

        let start = Instant::now();
        snapshot.interfaces = self.interfaces();
        timing.interfaces = start.elapsed();

        let start = Instant::now();
        snapshot.users = self.users();
        timing.users = start.elapsed();

        let start = Instant::now();
        snapshot.partitions = self.disk_space();
        timing.disk = start.elapsed();

        let start = Instant::now();
        snapshot.processes = self.processes();
        timing.processes = start.elapsed();

        let start = Instant::now();
        snapshot.flux = self.network_flux();
        timing.flux = start.elapsed();

        let start = Instant::now();
        snapshot.services = self.services();
        timing.services = start.elapsed();

        timing.total = total_start.elapsed();
        debug!("snapshot from {} collected: {:?}", self.runner.describe(), timing);
        self.last_timing = Some(timing);

        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockRunner;
    use chrono::TimeZone;

    fn at_noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_collect_snapshot() {
        let runner = MockRunner::typical_host();
        let mut collector = Collector::new(runner, AuditConfig::default());

        let snapshot = collector.collect_snapshot_at(at_noon());

        assert_eq!(snapshot.identity.hostname, "web-01");
        assert_eq!(snapshot.identity.distribution, "Ubuntu 22.04.4 LTS");
        assert_eq!(snapshot.resources.uptime, "up 3 days, 4 hours, 5 minutes");
        assert!(snapshot.resources.load.is_some());
        assert_eq!(snapshot.resources.memory_used, "3.5Gi");
        assert_eq!(snapshot.resources.swap_available, "2.0Gi");

        let names: Vec<&str> = snapshot.interfaces.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["lo", "eth0", "docker0"]);
        assert_eq!(snapshot.interfaces[1].mac, "52:54:00:12:34:56");
        assert_eq!(snapshot.interfaces[2].mac, "02:42:8f:11:22:33");

        assert_eq!(snapshot.users.humans, vec!["alice", "bob"]);
        assert_eq!(snapshot.users.logged_in, vec!["alice", "bob"]);

        let devices: Vec<&str> = snapshot.partitions.iter().map(|p| p.device.as_str()).collect();
        assert_eq!(devices, vec!["/dev/sda1", "/dev/nvme0n1p2", "/dev/mapper/vg-data"]);

        // header + mysqld
        assert_eq!(snapshot.processes.cpu.len(), 2);
        // header + mysqld + Web Content
        assert_eq!(snapshot.processes.memory.len(), 3);

        // curl appears in both refresh blocks; the last one wins
        assert_eq!(snapshot.flux.len(), 1);
        assert_eq!(snapshot.flux[0].interface, "/usr/bin/curl/4321/1000");
        assert!((snapshot.flux[0].received_kb - 250.75).abs() < 1e-9);

        let statuses: Vec<String> = snapshot.services.iter().map(|s| s.status_line()).collect();
        assert_eq!(
            statuses,
            vec!["active / enabled", "inactive / disabled", "not present on system"]
        );
        assert!(collector.last_timing().is_some());
    }

    #[test]
    fn test_commands_run_once_in_document_order() {
        let runner = MockRunner::typical_host();
        let observer = runner.clone();
        let mut collector = Collector::new(runner, AuditConfig::default());
        collector.collect_snapshot_at(at_noon());

        let calls = observer.calls();
        let position = |cmd: &str| {
            let hits: Vec<usize> = calls
                .iter()
                .enumerate()
                .filter(|(_, c)| c.as_str() == cmd)
                .map(|(i, _)| i)
                .collect();
            assert_eq!(hits.len(), 1, "{} ran {} times", cmd, hits.len());
            hits[0]
        };

        let order = [
            position(commands::HOSTNAME),
            position(commands::UPTIME),
            position(commands::IP_ADDR),
            position(commands::IP_LINK),
            position(commands::PASSWD),
            position(commands::DF),
            position(commands::PS_BY_CPU),
            position(&commands::nethogs(Duration::from_secs(3))),
            position(&commands::unit_files("ssh.service")),
        ];
        assert!(order.windows(2).all(|w| w[0] < w[1]), "order: {:?}", order);

        // Absent units are not queried further
        assert!(!calls.iter().any(|c| c == &commands::is_active("docker")));
        // The privilege probe is not part of a snapshot
        assert!(!calls.iter().any(|c| c == commands::EFFECTIVE_UID));
    }

    #[test]
    fn test_failing_runner_yields_empty_snapshot() {
        let mut collector = Collector::new(MockRunner::new(), AuditConfig::default());
        let snapshot = collector.collect_snapshot_at(at_noon());

        assert_eq!(snapshot.identity, SystemIdentity::default());
        assert_eq!(snapshot.resources, ResourceSample::default());
        assert!(snapshot.interfaces.is_empty());
        assert!(snapshot.users.humans.is_empty());
        assert!(snapshot.partitions.is_empty());
        assert!(snapshot.processes.cpu.is_empty());
        assert!(snapshot.flux.is_empty());
        // Services are still listed, all absent
        assert_eq!(snapshot.services.len(), 3);
        assert!(snapshot
            .services
            .iter()
            .all(|s| s.state == ServiceState::NotPresent));
    }

    #[test]
    fn test_interfaces_without_link_listing() {
        let runner = MockRunner::new().with(
            commands::IP_ADDR,
            "2: eth0    inet 10.0.0.5/24 brd 10.0.0.255 scope global eth0\\       valid_lft forever\n",
        );
        let collector = Collector::new(runner, AuditConfig::default());

        let interfaces = collector.interfaces();
        assert_eq!(interfaces.len(), 1);
        assert_eq!(interfaces[0].ipv4, vec!["10.0.0.5/24"]);
        assert!(!interfaces[0].has_mac());
    }

    #[test]
    fn test_invalid_service_name_runs_nothing() {
        let runner = MockRunner::typical_host();
        let observer = runner.clone();
        let config = AuditConfig {
            services: vec!["ssh;reboot".to_string()],
            ..AuditConfig::default()
        };
        let collector = Collector::new(runner, config);

        let services = collector.services();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].state, ServiceState::NotPresent);
        assert!(observer.calls().is_empty());
    }

    #[test]
    fn test_service_suffix_is_stripped_from_key() {
        let config = AuditConfig {
            services: vec!["ssh.service".to_string()],
            ..AuditConfig::default()
        };
        let collector = Collector::new(MockRunner::typical_host(), config);

        let services = collector.services();
        assert_eq!(services[0].name, "ssh");
        assert!(services[0].is_active());
    }

    #[test]
    fn test_is_privileged() {
        let collector = Collector::new(MockRunner::typical_host(), AuditConfig::default());
        assert_eq!(collector.is_privileged(), Some(true));

        let user = MockRunner::new().with(commands::EFFECTIVE_UID, "1000\n");
        let collector = Collector::new(user, AuditConfig::default());
        assert_eq!(collector.is_privileged(), Some(false));

        let collector = Collector::new(MockRunner::new(), AuditConfig::default());
        assert_eq!(collector.is_privileged(), None);
    }
}
