pub mod model;
pub mod writer;

pub use model::AuditSnapshot;
pub use writer::{export, prometheus_path, write_atomic, write_json, write_prometheus};
