//! Atomic output files.
//!
//! Both the JSON snapshot and the exposition document are written to a
//! temporary file in the destination directory and renamed over the target,
//! so a scraper never sees a half-written file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{AuditError, Result};
use crate::exporter;
use crate::normalize::UnitBase;
use crate::storage::model::AuditSnapshot;

/// Permissions of written files; the node exporter textfile collector may run
/// as another user.
#[cfg(unix)]
const OUTPUT_MODE: u32 = 0o644;

/// Writes `contents` to `path` atomically.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let io_err = |source: io::Error| AuditError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = NamedTempFile::new_in(dir).map_err(io_err)?;
    file.write_all(contents).map_err(io_err)?;
    file.as_file().sync_all().map_err(io_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(fs::Permissions::from_mode(OUTPUT_MODE))
            .map_err(io_err)?;
    }

    file.persist(path).map_err(|e| AuditError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    debug!("wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Path of the exposition document that accompanies a JSON snapshot.
///
/// `/var/lib/audit/host.json` → `/var/lib/audit/host.prom`
pub fn prometheus_path(json_path: &Path) -> PathBuf {
    json_path.with_extension("prom")
}

/// Writes the snapshot as pretty-printed JSON.
pub fn write_json(path: &Path, snapshot: &AuditSnapshot) -> Result<()> {
    let mut json = serde_json::to_vec_pretty(snapshot)?;
    json.push(b'\n');
    write_atomic(path, &json)
}

/// Writes the exposition document for the snapshot.
pub fn write_prometheus(path: &Path, snapshot: &AuditSnapshot, base: UnitBase) -> Result<()> {
    let text = exporter::render(&exporter::project_with(snapshot, base));
    write_atomic(path, text.as_bytes())
}

/// Writes the JSON snapshot and its `.prom` sibling.
///
/// Returns the path of the exposition document.
pub fn export(json_path: &Path, snapshot: &AuditSnapshot, base: UnitBase) -> Result<PathBuf> {
    write_json(json_path, snapshot)?;
    let prom_path = prometheus_path(json_path);
    write_prometheus(&prom_path, snapshot, base)?;
    Ok(prom_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn snapshot() -> AuditSnapshot {
        let mut snapshot =
            AuditSnapshot::empty(Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        snapshot.identity.hostname = "web-01".to_string();
        snapshot.resources.memory_used = "3.5G".to_string();
        snapshot.resources.memory_available = "10G".to_string();
        snapshot
    }

    #[test]
    fn test_prometheus_path() {
        assert_eq!(
            prometheus_path(Path::new("/tmp/audit/host.json")),
            PathBuf::from("/tmp/audit/host.prom")
        );
        assert_eq!(prometheus_path(Path::new("report")), PathBuf::from("report.prom"));
    }

    #[test]
    fn test_export_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("audit.json");

        let prom_path = export(&json_path, &snapshot(), UnitBase::Binary).unwrap();
        assert_eq!(prom_path, dir.path().join("audit.prom"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json["system_info"]["hostname"], "web-01");
        assert_eq!(json["timestamp"], "2024-05-01 12:00:00");

        let prom = fs::read_to_string(&prom_path).unwrap();
        assert!(prom.contains("node_memory_usage_percent{hostname=\"web-01\"} 25.92\n"));

        // Only the two outputs remain, no temporaries
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 2);
    }

    #[test]
    fn test_write_atomic_replaces_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.prom");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, b"new\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_written_file_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_atomic(&path, b"{}").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");

        let err = write_json(&path, &snapshot()).unwrap_err();
        assert!(matches!(err, AuditError::Io { .. }));
        assert!(err.to_string().contains("out.json"));
    }
}
