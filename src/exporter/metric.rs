//! Metric series and the catalog of exported families.

/// Prometheus metric type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
        }
    }
}

/// Name, help text and type of one metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDesc {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
}

const fn gauge(name: &'static str, help: &'static str) -> MetricDesc {
    MetricDesc {
        name,
        help,
        kind: MetricKind::Gauge,
    }
}

pub const LOAD1: MetricDesc = gauge("node_load1", "1-minute load average");
pub const LOAD5: MetricDesc = gauge("node_load5", "5-minute load average");
pub const LOAD15: MetricDesc = gauge("node_load15", "15-minute load average");

pub const MEM_TOTAL: MetricDesc = gauge("node_memory_MemTotal_bytes", "Total memory in bytes");
pub const MEM_USED: MetricDesc = gauge("node_memory_MemUsed_bytes", "Used memory in bytes");
pub const MEM_AVAILABLE: MetricDesc =
    gauge("node_memory_MemAvailable_bytes", "Available memory in bytes");
pub const MEM_PERCENT: MetricDesc =
    gauge("node_memory_usage_percent", "Memory usage percentage");

pub const SWAP_USED: MetricDesc = gauge("node_swap_used_bytes", "Used swap in bytes");
pub const SWAP_AVAILABLE: MetricDesc =
    gauge("node_swap_available_bytes", "Available swap in bytes");

pub const FS_SIZE: MetricDesc = gauge("node_filesystem_size_bytes", "Filesystem size in bytes");
pub const FS_USED: MetricDesc =
    gauge("node_filesystem_used_bytes", "Filesystem used space in bytes");
pub const FS_AVAIL: MetricDesc = gauge(
    "node_filesystem_avail_bytes",
    "Filesystem available space in bytes",
);
pub const FS_PERCENT: MetricDesc =
    gauge("node_filesystem_usage_percent", "Filesystem usage percentage");

pub const SERVICE_STATUS: MetricDesc = gauge(
    "node_service_status",
    "Service status (1=active, 0=inactive)",
);

pub const FLUX_SENT: MetricDesc = gauge(
    "node_network_flux_sent_kilobytes",
    "Kilobytes sent per program during the capture window",
);
pub const FLUX_RECEIVED: MetricDesc = gauge(
    "node_network_flux_received_kilobytes",
    "Kilobytes received per program during the capture window",
);

pub const UPTIME: MetricDesc = MetricDesc {
    name: "node_uptime_seconds",
    help: "System uptime in seconds",
    kind: MetricKind::Counter,
};

/// One exposition series.
#[derive(Debug, Clone, PartialEq)]
pub struct PrometheusMetric {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    /// Label pairs in output order; keys are unique.
    pub labels: Vec<(String, String)>,
    pub value: f64,
    /// Milliseconds since the epoch; omitted from the output when `None`.
    pub timestamp: Option<i64>,
}

impl PrometheusMetric {
    pub fn new(desc: MetricDesc, value: f64) -> Self {
        Self {
            name: desc.name,
            help: desc.help,
            kind: desc.kind,
            labels: Vec::new(),
            value,
            timestamp: None,
        }
    }

    /// Sets a label, replacing the value of an existing key in place.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.labels.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.labels.push((key, value)),
        }
        self
    }

    pub fn with_timestamp(mut self, millis: i64) -> Self {
        self.timestamp = Some(millis);
        self
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_keys_are_unique() {
        let metric = PrometheusMetric::new(LOAD1, 0.5)
            .with_label("hostname", "a")
            .with_label("device", "/dev/sda1")
            .with_label("hostname", "b");

        assert_eq!(
            metric.labels,
            vec![
                ("hostname".to_string(), "b".to_string()),
                ("device".to_string(), "/dev/sda1".to_string()),
            ]
        );
        assert_eq!(metric.label("hostname"), Some("b"));
        assert_eq!(metric.label("service"), None);
    }

    #[test]
    fn test_uptime_is_a_counter() {
        assert_eq!(UPTIME.kind.as_str(), "counter");
        assert_eq!(MEM_PERCENT.kind.as_str(), "gauge");
    }
}
