//! Process threshold report.

use serde::Serialize;

/// Process rows above the CPU and memory thresholds.
///
/// Each list holds raw `ps` lines. The first line is the table header and is
/// kept even when no data row qualifies, so `["  PID USER ..."]` means
/// "nothing above threshold" while an empty list means the `ps` call failed.
#[derive(Clone, Serialize, Debug, Default, PartialEq)]
pub struct ProcessThresholdReport {
    pub cpu_threshold: f64,
    /// Source: `ps -eo pid,user,comm,%cpu,%mem --sort=-%cpu`
    pub cpu: Vec<String>,
    pub memory_threshold: f64,
    /// Source: `ps -eo pid,user,comm,%cpu,%mem --sort=-%mem`
    pub memory: Vec<String>,
}

impl ProcessThresholdReport {
    /// Data rows above the CPU threshold, header excluded.
    pub fn cpu_rows(&self) -> &[String] {
        self.cpu.get(1..).unwrap_or(&[])
    }

    /// Data rows above the memory threshold, header excluded.
    pub fn memory_rows(&self) -> &[String] {
        self.memory.get(1..).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_exclude_header() {
        let report = ProcessThresholdReport {
            cpu_threshold: 5.0,
            cpu: vec!["PID USER COMMAND %CPU %MEM".to_string(), "1 root init 9.0 0.1".to_string()],
            memory_threshold: 5.0,
            memory: vec!["PID USER COMMAND %CPU %MEM".to_string()],
        };
        assert_eq!(report.cpu_rows().len(), 1);
        assert!(report.memory_rows().is_empty());
        assert!(ProcessThresholdReport::default().cpu_rows().is_empty());
    }
}
