//! Shell commands issued by the collector.
//!
//! Commands that print numbers run under `LANG=C` where the tool localizes
//! its output. Everything here is plain text so the same strings work locally
//! and over SSH.

use std::time::Duration;

pub const HOSTNAME: &str = "uname --nodename";
pub const DISTRIBUTION: &str =
    "lsb_release -ds 2>/dev/null || sed -n 's/^PRETTY_NAME=//p' /etc/os-release 2>/dev/null";
pub const KERNEL: &str = "uname -r";

pub const UPTIME_PRETTY: &str = "uptime -p";
pub const UPTIME: &str = "LANG=C uptime";
pub const FREE: &str = "LANG=C free -h";

pub const IP_ADDR: &str = "ip -o addr show";
pub const IP_LINK: &str = "ip -o link show";

pub const PASSWD: &str = "cat /etc/passwd";
pub const WHO: &str = "who";

pub const DF: &str = "df -h";

pub const PS_BY_CPU: &str = "ps -eo pid,user,comm,%cpu,%mem --sort=-%cpu";
pub const PS_BY_MEM: &str = "ps -eo pid,user,comm,%cpu,%mem --sort=-%mem";

pub const EFFECTIVE_UID: &str = "id -u";

/// `nethogs` in trace mode, stopped by `timeout` after `duration`.
pub fn nethogs(duration: Duration) -> String {
    format!(
        "timeout {} nethogs -t -a 2>/dev/null",
        duration.as_secs().max(1)
    )
}

/// Lists the unit file for `unit`; empty output when it does not exist.
pub fn unit_files(unit: &str) -> String {
    format!("systemctl list-unit-files {} --no-legend 2>/dev/null", unit)
}

pub fn is_active(name: &str) -> String {
    format!("systemctl is-active {} 2>/dev/null", name)
}

pub fn is_enabled(name: &str) -> String {
    format!("systemctl is-enabled {} 2>/dev/null", name)
}
