//! Projection of an audit snapshot onto metric series.

use std::collections::HashSet;

use crate::collector::parser::uptime_seconds;
use crate::normalize::{UnitBase, normalize_with};
use crate::storage::model::AuditSnapshot;

use super::metric::{self, MetricDesc, PrometheusMetric};

/// Device prefixes exported as filesystem series; everything else under
/// `/dev` (loop, sr, md...) is left out.
const EXPORTED_DEVICE_PREFIXES: [&str; 4] = ["/dev/nvme", "/dev/sd", "/dev/vd", "/dev/mapper/"];

pub fn is_exported_device(device: &str) -> bool {
    EXPORTED_DEVICE_PREFIXES
        .iter()
        .any(|prefix| device.starts_with(prefix))
}

/// `part / whole * 100`, truncated to two decimals; 0 for an empty whole.
///
/// The hundredths are nudged up by a millionth before truncating so that an
/// exact ratio stored as 28.999999... still reads 29.
pub fn usage_percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        let hundredths = part / whole * 100.0 * 100.0;
        (hundredths + 1e-6).trunc() / 100.0
    } else {
        0.0
    }
}

/// Projects a snapshot using binary unit suffixes.
pub fn project(snapshot: &AuditSnapshot) -> Vec<PrometheusMetric> {
    project_with(snapshot, UnitBase::Binary)
}

/// Projects a snapshot onto metric series.
///
/// Every series carries `hostname` as its first label. Sections that are
/// empty in the snapshot contribute no series, except memory and swap usage
/// which are always present (as zero when unknown).
///
/// A device, service or flux program listed twice is exported once, from
/// its first row.
pub fn project_with(snapshot: &AuditSnapshot, base: UnitBase) -> Vec<PrometheusMetric> {
    let hostname = snapshot.hostname();
    let series = |desc: MetricDesc, value: f64| {
        PrometheusMetric::new(desc, value).with_label("hostname", hostname)
    };
    let mut metrics = Vec::new();

    let resources = &snapshot.resources;
    if let Some(load) = resources.load {
        metrics.push(series(metric::LOAD1, load.one));
        metrics.push(series(metric::LOAD5, load.five));
        metrics.push(series(metric::LOAD15, load.fifteen));
    }

    let mem_used = normalize_with(&resources.memory_used, base);
    let mem_available = normalize_with(&resources.memory_available, base);
    let mem_total = mem_used + mem_available;
    metrics.push(series(metric::MEM_TOTAL, mem_total));
    metrics.push(series(metric::MEM_USED, mem_used));
    metrics.push(series(metric::MEM_AVAILABLE, mem_available));
    metrics.push(series(
        metric::MEM_PERCENT,
        usage_percent(mem_used, mem_total),
    ));

    metrics.push(series(
        metric::SWAP_USED,
        normalize_with(&resources.swap_used, base),
    ));
    if !resources.swap_available.is_empty() {
        metrics.push(series(
            metric::SWAP_AVAILABLE,
            normalize_with(&resources.swap_available, base),
        ));
    }

    let mut devices = HashSet::new();
    for partition in snapshot
        .partitions
        .iter()
        .filter(|p| is_exported_device(&p.device))
        .filter(|p| devices.insert(p.device.as_str()))
    {
        let disk = |desc: MetricDesc, value: f64| {
            series(desc, value).with_label("device", partition.device.as_str())
        };
        metrics.push(disk(metric::FS_SIZE, normalize_with(&partition.size, base)));
        metrics.push(disk(metric::FS_USED, normalize_with(&partition.used, base)));
        metrics.push(disk(
            metric::FS_AVAIL,
            normalize_with(&partition.available, base),
        ));
        metrics.push(disk(
            metric::FS_PERCENT,
            normalize_with(&partition.use_percent, base),
        ));
    }

    let mut services = HashSet::new();
    for service in snapshot
        .services
        .iter()
        .filter(|s| services.insert(s.name.as_str()))
    {
        let value = if service.is_active() { 1.0 } else { 0.0 };
        metrics.push(series(metric::SERVICE_STATUS, value).with_label("service", service.name.as_str()));
    }

    let mut programs = HashSet::new();
    for entry in snapshot
        .flux
        .iter()
        .filter(|e| programs.insert(e.interface.as_str()))
    {
        metrics.push(
            series(metric::FLUX_SENT, entry.sent_kb).with_label("interface", entry.interface.as_str()),
        );
        metrics.push(
            series(metric::FLUX_RECEIVED, entry.received_kb)
                .with_label("interface", entry.interface.as_str()),
        );
    }

    if let Some(seconds) = uptime_seconds(&resources.uptime) {
        metrics.push(series(metric::UPTIME, seconds as f64));
    }

    metrics
}
