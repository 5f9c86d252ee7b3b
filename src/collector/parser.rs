//! Parsers for audit command output.
//!
//! These are pure functions that turn the text printed by `uptime`, `free`,
//! `ip`, `df`, `ps`, `nethogs`, `systemctl` and friends into typed records.
//! None of them fail: a line that does not have the expected shape is skipped,
//! and a number that cannot be read counts as zero. Line-oriented parsers
//! report how many lines they kept and skipped through [`Parsed`].

use std::collections::{BTreeSet, HashMap};
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::config::EXCLUDED_ACCOUNTS;
use crate::storage::model::{
    DiskPartition, LoadAverage, NetworkFluxEntry, NetworkInterface, ProcessThresholdReport,
    ResourceSample, ServiceState, SystemIdentity, UNKNOWN_MAC, UserSnapshot,
};

/// Outcome of classifying a single line of command output.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome<T> {
    /// The line had the expected shape.
    Matched(T),
    /// The line was ignored (header, pseudo filesystem, garbage...).
    Skipped,
}

impl<T> LineOutcome<T> {
    pub fn is_matched(&self) -> bool {
        matches!(self, LineOutcome::Matched(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            LineOutcome::Matched(v) => Some(v),
            LineOutcome::Skipped => None,
        }
    }
}

/// A parsed value together with line accounting.
///
/// Blank lines are neither matched nor skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    pub matched: usize,
    pub skipped: usize,
}

impl<T> Parsed<Vec<T>> {
    fn record(&mut self, outcome: LineOutcome<T>) {
        match outcome {
            LineOutcome::Matched(v) => {
                self.value.push(v);
                self.matched += 1;
            }
            LineOutcome::Skipped => self.skipped += 1,
        }
    }
}

fn collect_lines<T>(
    content: &str,
    mut classify: impl FnMut(&str) -> LineOutcome<T>,
) -> Parsed<Vec<T>> {
    let mut parsed = Parsed {
        value: Vec::new(),
        matched: 0,
        skipped: 0,
    };
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        parsed.record(classify(line));
    }
    parsed
}

/// Reads a float, accepting `,` as decimal separator. Anything else is 0.
fn lenient_f64(field: &str) -> f64 {
    field
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn first_line(content: &str) -> &str {
    content
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("")
}

// ============ Identity ============

/// Builds the identity record from the three single-line command outputs.
pub fn parse_identity(hostname: &str, distribution: &str, kernel: &str) -> SystemIdentity {
    SystemIdentity {
        hostname: first_line(hostname).to_string(),
        distribution: first_line(distribution).trim_matches('"').to_string(),
        kernel: first_line(kernel).to_string(),
    }
}

// ============ Resources ============

/// Extracts the `load average: a, b, c` fragment from `uptime` output.
///
/// Returns `None` unless all three values parse.
pub fn parse_load_average(uptime: &str) -> Option<LoadAverage> {
    let start = uptime.find("load average")?;
    let (_, values) = uptime[start..].split_once(':')?;

    let mut parts = values.split(',').map(|p| p.trim().parse::<f64>());
    let one = parts.next()?.ok()?;
    let five = parts.next()?.ok()?;
    let fifteen = parts.next()?.ok()?;

    if [one, five, fifteen]
        .iter()
        .all(|v| v.is_finite() && *v >= 0.0)
    {
        Some(LoadAverage { one, five, fifteen })
    } else {
        None
    }
}

/// Returns the used and free columns of the `free -h` row starting with `label`.
///
/// Format: `Mem:  total  used  free  shared  buff/cache  available`.
/// Missing columns come back as empty strings.
pub fn parse_free_row(free: &str, label: &str) -> (String, String) {
    for line in free.lines() {
        let mut fields = line.split_whitespace();
        if fields.next() == Some(label) {
            let cols: Vec<&str> = fields.collect();
            let used = cols.get(1).copied().unwrap_or("").to_string();
            let available = cols.get(2).copied().unwrap_or("").to_string();
            return (used, available);
        }
    }
    (String::new(), String::new())
}

/// Builds the resource sample from `uptime -p`, `uptime` and `free -h` output.
pub fn parse_resources(uptime_pretty: &str, uptime: &str, free: &str) -> ResourceSample {
    let (memory_used, memory_available) = parse_free_row(free, "Mem:");
    let (swap_used, swap_available) = parse_free_row(free, "Swap:");

    ResourceSample {
        uptime: first_line(uptime_pretty).to_string(),
        load: parse_load_average(uptime),
        memory_used,
        memory_available,
        swap_used,
        swap_available,
    }
}

/// Converts an `uptime -p` phrase into seconds.
///
/// Weeks, days, hours and minutes are each matched independently (first
/// occurrence wins); seconds are not part of the phrase. Returns `None` for an
/// empty phrase.
///
/// ```
/// use hostaudit::collector::parser::uptime_seconds;
///
/// assert_eq!(uptime_seconds("up 1 day, 2 hours, 3 minutes"), Some(93_780));
/// assert_eq!(uptime_seconds(""), None);
/// ```
pub fn uptime_seconds(phrase: &str) -> Option<u64> {
    let phrase = phrase.trim();
    if phrase.is_empty() {
        return None;
    }

    let tokens: Vec<&str> = phrase
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();

    let mut seen = [false; 4];
    let mut total: u64 = 0;
    for pair in tokens.windows(2) {
        let Ok(count) = pair[0].parse::<u64>() else {
            continue;
        };
        let (slot, unit_secs) = match pair[1] {
            "week" | "weeks" => (0, 7 * 86_400),
            "day" | "days" => (1, 86_400),
            "hour" | "hours" => (2, 3_600),
            "minute" | "minutes" => (3, 60),
            _ => continue,
        };
        if seen[slot] {
            continue;
        }
        seen[slot] = true;
        total = total.saturating_add(count.saturating_mul(unit_secs));
    }
    Some(total)
}

// ============ Network interfaces ============

/// An address token found in `ip -o addr` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    V4(String),
    V6(String),
}

/// Classifies a token as IPv4 (with or without prefix) or IPv6 (with prefix).
pub fn classify_address(token: &str) -> Option<Address> {
    let (addr, prefix) = match token.split_once('/') {
        Some((addr, prefix)) => (addr, Some(prefix)),
        None => (token, None),
    };
    if let Some(prefix) = prefix
        && (prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    if addr.parse::<Ipv4Addr>().is_ok() {
        Some(Address::V4(token.to_string()))
    } else if prefix.is_some() && addr.contains(':') && addr.parse::<Ipv6Addr>().is_ok() {
        Some(Address::V6(token.to_string()))
    } else {
        None
    }
}

/// Returns true for six colon-separated hex byte pairs.
pub fn is_mac_address(token: &str) -> bool {
    let parts: Vec<&str> = token.split(':').collect();
    parts.len() == 6
        && parts
            .iter()
            .all(|p| p.len() == 2 && p.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// Strips the trailing colon and any `@peer` suffix from an `ip` name token.
fn interface_name(token: &str) -> &str {
    let name = token.trim_end_matches(':');
    name.split_once('@').map(|(n, _)| n).unwrap_or(name)
}

/// Classifies one `ip -o addr show` line.
///
/// Format: `2: eth0    inet 10.0.0.5/24 brd 10.0.0.255 scope global eth0\ ...`
pub fn classify_addr_line(line: &str) -> LineOutcome<(String, Vec<Address>)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 4 {
        return LineOutcome::Skipped;
    }

    let name = interface_name(parts[1]);
    if name.is_empty() {
        return LineOutcome::Skipped;
    }

    let mut addresses = Vec::new();
    for (idx, token) in parts.iter().enumerate().skip(2) {
        // Broadcast addresses belong to the subnet, not the interface
        if parts[idx - 1] == "brd" {
            continue;
        }
        if let Some(addr) = classify_address(token) {
            addresses.push(addr);
        }
    }
    LineOutcome::Matched((name.to_string(), addresses))
}

/// Classifies one `ip -o link show` line; the first MAC-shaped token wins.
///
/// Format: `2: eth0: <BROADCAST,...> mtu 1500 ... link/ether 52:54:00:12:34:56 brd ff:ff:...`
pub fn classify_link_line(line: &str) -> LineOutcome<(String, String)> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 4 {
        return LineOutcome::Skipped;
    }

    let name = interface_name(parts[1]);
    match parts[2..].iter().find(|t| is_mac_address(t)) {
        Some(mac) if !name.is_empty() => {
            LineOutcome::Matched((name.to_string(), mac.to_string()))
        }
        _ => LineOutcome::Skipped,
    }
}

/// Interfaces keyed by name, built from address and link listings.
///
/// The two listings can be applied in either order and any number of times:
/// MACs seen before an interface appears in the address listing are kept
/// aside and attached when it does. Interfaces that only appear in the link
/// listing are not reported.
#[derive(Debug, Clone, Default)]
pub struct InterfaceTable {
    interfaces: Vec<NetworkInterface>,
    index: HashMap<String, usize>,
    macs: HashMap<String, String>,
}

impl InterfaceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `ip -o addr show` output. Returns (matched, skipped) line counts.
    pub fn apply_addresses(&mut self, content: &str) -> (usize, usize) {
        let parsed = collect_lines(content, classify_addr_line);
        for (name, addresses) in &parsed.value {
            let iface = self.entry(name);
            for addr in addresses {
                match addr {
                    Address::V4(a) => iface.add_ipv4(a),
                    Address::V6(a) => iface.add_ipv6(a),
                }
            }
        }
        (parsed.matched, parsed.skipped)
    }

    /// Applies `ip -o link show` output. Returns (matched, skipped) line counts.
    pub fn apply_links(&mut self, content: &str) -> (usize, usize) {
        let parsed = collect_lines(content, classify_link_line);
        for (name, mac) in &parsed.value {
            if let Some(&idx) = self.index.get(name) {
                self.interfaces[idx].mac = mac.clone();
            }
            self.macs.insert(name.clone(), mac.clone());
        }
        (parsed.matched, parsed.skipped)
    }

    fn entry(&mut self, name: &str) -> &mut NetworkInterface {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                let mut iface = NetworkInterface::new(name);
                iface.mac = self
                    .macs
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_MAC.to_string());
                self.interfaces.push(iface);
                self.index.insert(name.to_string(), self.interfaces.len() - 1);
                self.interfaces.len() - 1
            }
        };
        &mut self.interfaces[idx]
    }

    /// Interfaces in order of first appearance in the address listing.
    pub fn into_interfaces(self) -> Vec<NetworkInterface> {
        self.interfaces
    }
}

/// Merges `ip -o addr show` and `ip -o link show` output.
pub fn parse_interfaces(addr: &str, link: &str) -> Parsed<Vec<NetworkInterface>> {
    let mut table = InterfaceTable::new();
    let (addr_matched, addr_skipped) = table.apply_addresses(addr);
    let (link_matched, link_skipped) = table.apply_links(link);
    Parsed {
        value: table.into_interfaces(),
        matched: addr_matched + link_matched,
        skipped: addr_skipped + link_skipped,
    }
}

// ============ Users ============

/// Classifies one passwd record: `name:pw:uid:gid:gecos:home:shell`.
pub fn classify_passwd_line(line: &str, min_uid: u32) -> LineOutcome<String> {
    let line = line.trim();
    if line.starts_with('#') {
        return LineOutcome::Skipped;
    }
    let parts: Vec<&str> = line.split(':').collect();
    if parts.len() >= 3
        && !parts[0].is_empty()
        && let Ok(uid) = parts[2].parse::<u32>()
        && uid >= min_uid
        && !EXCLUDED_ACCOUNTS.contains(&parts[0])
    {
        LineOutcome::Matched(parts[0].to_string())
    } else {
        LineOutcome::Skipped
    }
}

/// Accounts with UID at or above `min_uid`, minus known pseudo-accounts.
pub fn parse_human_accounts(passwd: &str, min_uid: u32) -> Parsed<Vec<String>> {
    let mut parsed = collect_lines(passwd, |line| classify_passwd_line(line, min_uid));
    let mut seen = BTreeSet::new();
    parsed.value.retain(|name| seen.insert(name.clone()));
    parsed
}

/// Distinct login names from `who` output, sorted.
pub fn parse_logged_in(who: &str) -> Vec<String> {
    who.lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn parse_users(passwd: &str, who: &str, min_uid: u32) -> UserSnapshot {
    UserSnapshot {
        humans: parse_human_accounts(passwd, min_uid).value,
        logged_in: parse_logged_in(who),
    }
}

// ============ Disk space ============

fn is_loop_device(device: &str) -> bool {
    device.starts_with("/dev/loop")
}

/// Classifies one `df -h` line.
///
/// Only `/dev/<path> size used avail use% [mount]` lines are kept; headers,
/// pseudo filesystems (`tmpfs`, `overlay`, `udev`) and loop devices are skipped.
pub fn classify_df_line(line: &str) -> LineOutcome<DiskPartition> {
    if !line.starts_with("/dev/") {
        return LineOutcome::Skipped;
    }
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 5 || fields[0] == "/dev/" || is_loop_device(fields[0]) {
        return LineOutcome::Skipped;
    }

    LineOutcome::Matched(DiskPartition {
        device: fields[0].to_string(),
        size: fields[1].to_string(),
        used: fields[2].to_string(),
        available: fields[3].to_string(),
        use_percent: fields[4].to_string(),
    })
}

pub fn parse_disk_space(df: &str) -> Parsed<Vec<DiskPartition>> {
    collect_lines(df, classify_df_line)
}

// ============ Processes ============

/// Which percentage column of the `ps` table to filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessColumn {
    Cpu,
    Memory,
}

impl ProcessColumn {
    /// Position counted from the end of the row (`... %cpu %mem`).
    fn offset_from_end(self) -> usize {
        match self {
            ProcessColumn::Cpu => 2,
            ProcessColumn::Memory => 1,
        }
    }
}

/// Reads the %CPU or %MEM field of a `pid user comm %cpu %mem` row.
///
/// Fields are taken from the right so command names with spaces do not shift
/// them. Short rows and unreadable numbers give 0.
pub fn process_percent(line: &str, column: ProcessColumn) -> f64 {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 5 {
        return 0.0;
    }
    lenient_f64(fields[fields.len() - column.offset_from_end()])
}

/// Keeps the header plus rows whose `column` is strictly above `threshold`.
///
/// Empty input gives an empty list (no header).
pub fn filter_process_table(
    table: &str,
    column: ProcessColumn,
    threshold: f64,
) -> Parsed<Vec<String>> {
    let mut lines = table
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty());

    let mut parsed = Parsed {
        value: Vec::new(),
        matched: 0,
        skipped: 0,
    };
    let Some(header) = lines.next() else {
        return parsed;
    };
    parsed.value.push(header.to_string());

    for line in lines {
        let outcome = if process_percent(line, column) > threshold {
            LineOutcome::Matched(line.to_string())
        } else {
            LineOutcome::Skipped
        };
        parsed.record(outcome);
    }
    parsed
}

pub fn parse_processes(
    by_cpu: &str,
    by_memory: &str,
    cpu_threshold: f64,
    memory_threshold: f64,
) -> ProcessThresholdReport {
    ProcessThresholdReport {
        cpu_threshold,
        cpu: filter_process_table(by_cpu, ProcessColumn::Cpu, cpu_threshold).value,
        memory_threshold,
        memory: filter_process_table(by_memory, ProcessColumn::Memory, memory_threshold).value,
    }
}

// ============ Network flux ============

/// Reads one `nethogs -t` row: `program sent received` (kilobytes).
///
/// The last two columns are the counters, everything before them is the name.
pub fn parse_flux_row(line: &str) -> Option<NetworkFluxEntry> {
    let cols: Vec<&str> = line.split_whitespace().collect();
    if cols.len() < 3 {
        return None;
    }

    let n = cols.len();
    Some(NetworkFluxEntry {
        interface: cols[..n - 2].join(" "),
        sent_kb: lenient_f64(cols[n - 2]),
        received_kb: lenient_f64(cols[n - 1]),
    })
}

/// Classifies one `nethogs -t` row against the minimum total (inclusive).
pub fn classify_flux_line(line: &str, min_kb: f64) -> LineOutcome<NetworkFluxEntry> {
    match parse_flux_row(line) {
        Some(entry) if entry.total_kb() >= min_kb => LineOutcome::Matched(entry),
        _ => LineOutcome::Skipped,
    }
}

/// Parses a whole `nethogs -t` capture.
///
/// nethogs prints one `Refreshing:` block per refresh, so a program shows up
/// once per block. Each program keeps its last reported row, in order of
/// first appearance, and the minimum applies to that row. Superseded rows
/// count as skipped.
pub fn parse_flux(nethogs: &str, min_kb: f64) -> Parsed<Vec<NetworkFluxEntry>> {
    let mut latest: Vec<NetworkFluxEntry> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut skipped = 0;

    for line in nethogs.lines().filter(|l| !l.trim().is_empty()) {
        let Some(entry) = parse_flux_row(line) else {
            skipped += 1;
            continue;
        };
        match index.get(&entry.interface) {
            Some(&idx) => {
                latest[idx] = entry;
                skipped += 1;
            }
            None => {
                index.insert(entry.interface.clone(), latest.len());
                latest.push(entry);
            }
        }
    }

    let before = latest.len();
    latest.retain(|entry| entry.total_kb() >= min_kb);
    Parsed {
        matched: latest.len(),
        skipped: skipped + (before - latest.len()),
        value: latest,
    }
}

// ============ Services ============

const UNIT_SUFFIX: &str = ".service";

/// Returns the systemd unit name and the short name for a service.
///
/// `ssh` → (`ssh.service`, `ssh`); `ssh.service` → (`ssh.service`, `ssh`).
pub fn unit_name(service: &str) -> (String, String) {
    let short = service.strip_suffix(UNIT_SUFFIX).unwrap_or(service);
    (format!("{}{}", short, UNIT_SUFFIX), short.to_string())
}

/// Service names are interpolated into shell commands, so only unit-name
/// characters are accepted.
pub fn is_valid_service_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '_' | ':' | '-'))
}

/// True when `systemctl list-unit-files` output lists `unit`.
pub fn unit_listed(list_output: &str, unit: &str) -> bool {
    list_output
        .lines()
        .any(|line| line.split_whitespace().any(|token| token == unit))
}

/// State of an existing unit from the raw `is-active` / `is-enabled` answers.
pub fn service_state(active: &str, enabled: &str) -> ServiceState {
    ServiceState::Present {
        active: active.trim().to_string(),
        enabled: enabled.trim().to_string(),
    }
}
