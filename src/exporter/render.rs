//! Prometheus text exposition format.

use std::collections::HashMap;
use std::fmt::Write;

use super::metric::PrometheusMetric;

/// Renders series as a text exposition document.
///
/// Series are grouped by metric name under a single `# HELP` / `# TYPE`
/// pair, families in order of first occurrence, separated by a blank line.
pub fn render(metrics: &[PrometheusMetric]) -> String {
    let mut families: Vec<Vec<&PrometheusMetric>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for metric in metrics {
        match index.get(metric.name) {
            Some(&idx) => families[idx].push(metric),
            None => {
                index.insert(metric.name, families.len());
                families.push(vec![metric]);
            }
        }
    }

    let mut out = String::new();
    for (i, family) in families.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let head = family[0];
        let _ = writeln!(out, "# HELP {} {}", head.name, escape_help(head.help));
        let _ = writeln!(out, "# TYPE {} {}", head.name, head.kind.as_str());
        for metric in family {
            write_series(&mut out, metric);
        }
    }
    out
}

fn write_series(out: &mut String, metric: &PrometheusMetric) {
    out.push_str(metric.name);
    if !metric.labels.is_empty() {
        out.push('{');
        for (i, (key, value)) in metric.labels.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(out, "{}=\"{}\"", key, escape_label_value(value));
        }
        out.push('}');
    }
    out.push(' ');
    out.push_str(&format_value(metric.value));
    if let Some(ts) = metric.timestamp {
        let _ = write!(out, " {}", ts);
    }
    out.push('\n');
}

/// Escapes `\`, `"` and newline in a label value.
pub fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::metric::{LOAD1, SERVICE_STATUS, UPTIME};

    #[test]
    fn test_families_are_grouped() {
        let metrics = vec![
            PrometheusMetric::new(SERVICE_STATUS, 1.0)
                .with_label("hostname", "h")
                .with_label("service", "ssh"),
            PrometheusMetric::new(LOAD1, 0.5).with_label("hostname", "h"),
            PrometheusMetric::new(SERVICE_STATUS, 0.0)
                .with_label("hostname", "h")
                .with_label("service", "cron"),
        ];

        let expected = "\
# HELP node_service_status Service status (1=active, 0=inactive)
# TYPE node_service_status gauge
node_service_status{hostname=\"h\",service=\"ssh\"} 1
node_service_status{hostname=\"h\",service=\"cron\"} 0

# HELP node_load1 1-minute load average
# TYPE node_load1 gauge
node_load1{hostname=\"h\"} 0.5
";
        assert_eq!(render(&metrics), expected);
    }

    #[test]
    fn test_each_name_has_one_help_line() {
        let metrics: Vec<PrometheusMetric> = (0..5)
            .map(|i| PrometheusMetric::new(SERVICE_STATUS, 1.0).with_label("service", format!("s{}", i)))
            .collect();
        let text = render(&metrics);
        assert_eq!(text.matches("# HELP node_service_status").count(), 1);
        assert_eq!(text.matches("# TYPE node_service_status").count(), 1);
    }

    #[test]
    fn test_label_escaping() {
        assert_eq!(escape_label_value(r#"a"b\c"#), r#"a\"b\\c"#);
        assert_eq!(escape_label_value("line\nbreak"), "line\\nbreak");

        let metric = PrometheusMetric::new(LOAD1, 1.0).with_label("hostname", "we\"ird");
        assert!(render(&[metric]).contains("node_load1{hostname=\"we\\\"ird\"} 1\n"));
    }

    #[test]
    fn test_timestamp_and_counter() {
        let metric = PrometheusMetric::new(UPTIME, 273_900.0)
            .with_label("hostname", "h")
            .with_timestamp(1_714_564_800_000);
        let text = render(&[metric]);
        assert!(text.contains("# TYPE node_uptime_seconds counter\n"));
        assert!(text.contains("node_uptime_seconds{hostname=\"h\"} 273900 1714564800000\n"));
    }

    #[test]
    fn test_special_values() {
        assert_eq!(format_value(f64::NAN), "NaN");
        assert_eq!(format_value(f64::INFINITY), "+Inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-Inf");
        assert_eq!(format_value(3_758_096_384.0), "3758096384");
        assert_eq!(format_value(25.92), "25.92");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(render(&[]), "");
    }
}
