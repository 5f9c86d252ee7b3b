//! Prometheus exporter.
//!
//! Turns an [`AuditSnapshot`](crate::storage::model::AuditSnapshot) into
//! metric series ([`project`]) and the series into a text exposition document
//! ([`render`]). Both steps are pure; writing the document to disk is the job
//! of [`crate::storage`].
//!
//! ```
//! use chrono::Local;
//! use hostaudit::exporter::{project, render};
//! use hostaudit::storage::model::AuditSnapshot;
//!
//! let mut snapshot = AuditSnapshot::empty(Local::now());
//! snapshot.identity.hostname = "h".to_string();
//! snapshot.resources.memory_used = "3.5G".to_string();
//! snapshot.resources.memory_available = "10G".to_string();
//!
//! let text = render(&project(&snapshot));
//! assert!(text.contains("node_memory_usage_percent{hostname=\"h\"} 25.92"));
//! ```

pub mod metric;
mod project;
mod render;

pub use metric::{MetricDesc, MetricKind, PrometheusMetric};
pub use project::{is_exported_device, project, project_with, usage_percent};
pub use render::{escape_label_value, format_value, render};
