//! Human-readable report of a snapshot.

use std::fmt::Write;

use crossterm::style::{Color, Stylize};

use crate::storage::model::{AuditSnapshot, ServiceState, ServiceStatus};

const MISSING: &str = "N/A";
const NONE: &str = "none";

struct Painter {
    color: bool,
}

impl Painter {
    fn label(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.color {
            text.with(color).to_string()
        } else {
            text.to_string()
        }
    }
}

fn or_missing(value: &str) -> &str {
    if value.is_empty() { MISSING } else { value }
}

fn join_or_none(values: &[String]) -> String {
    if values.is_empty() {
        NONE.to_string()
    } else {
        values.join(", ")
    }
}

/// Renders the snapshot as a sectioned text report.
///
/// With `color` set, section labels are bold and coloured with ANSI escapes.
pub fn render_text(snapshot: &AuditSnapshot, color: bool) -> String {
    let p = Painter { color };
    let mut out = String::new();

    let id = &snapshot.identity;
    let _ = writeln!(out, "{} {}", p.label("Hostname:", Color::Cyan), or_missing(&id.hostname));
    let _ = writeln!(
        out,
        "{} {}",
        p.label("Distribution:", Color::Cyan),
        or_missing(&id.distribution)
    );
    let _ = writeln!(out, "{} {}", p.label("Kernel:", Color::Cyan), or_missing(&id.kernel));

    let res = &snapshot.resources;
    let load = match res.load {
        Some(l) => format!("{:.2}, {:.2}, {:.2}", l.one, l.five, l.fifteen),
        None => MISSING.to_string(),
    };
    let _ = writeln!(out);
    let _ = writeln!(out, "{} {}", p.label("Uptime:", Color::Green), or_missing(&res.uptime));
    let _ = writeln!(
        out,
        "{} {}",
        p.label("Load average (1, 5, 15 min):", Color::Green),
        load
    );
    let _ = writeln!(
        out,
        "{} {} | {}",
        p.label("Memory used | available:", Color::Green),
        or_missing(&res.memory_used),
        or_missing(&res.memory_available)
    );
    let _ = writeln!(
        out,
        "{} {} | {}",
        p.label("Swap used | available:", Color::Green),
        or_missing(&res.swap_used),
        or_missing(&res.swap_available)
    );

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", p.label("Network interfaces:", Color::Blue));
    if snapshot.interfaces.is_empty() {
        let _ = writeln!(out, "  {}", NONE);
    }
    for iface in &snapshot.interfaces {
        let _ = writeln!(
            out,
            "  {}  mac {}  ipv4 {}  ipv6 {}",
            iface.name,
            iface.mac,
            join_or_none(&iface.ipv4),
            join_or_none(&iface.ipv6)
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} {}",
        p.label("Human users:", Color::Magenta),
        join_or_none(&snapshot.users.humans)
    );
    let _ = writeln!(
        out,
        "{} {}",
        p.label("Logged in:", Color::Magenta),
        join_or_none(&snapshot.users.logged_in)
    );

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", p.label("Disk space:", Color::Yellow));
    if snapshot.partitions.is_empty() {
        let _ = writeln!(out, "  {}", NONE);
    }
    for part in &snapshot.partitions {
        let _ = writeln!(
            out,
            "  {}  size {}  used {}  available {}  use {}",
            part.device, part.size, part.used, part.available, part.use_percent
        );
    }

    let procs = &snapshot.processes;
    let _ = writeln!(out);
    let heading = format!("Processes above {}% CPU:", procs.cpu_threshold);
    write_process_table(&mut out, &p, &heading, &procs.cpu);
    let heading = format!("Processes above {}% memory:", procs.memory_threshold);
    write_process_table(&mut out, &p, &heading, &procs.memory);

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", p.label("Network flux (KB):", Color::Blue));
    if snapshot.flux.is_empty() {
        let _ = writeln!(out, "  {}", NONE);
    }
    for entry in &snapshot.flux {
        let _ = writeln!(
            out,
            "  {}  sent {:.2}  received {:.2}",
            entry.interface, entry.sent_kb, entry.received_kb
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", p.label("Services:", Color::Cyan));
    for service in &snapshot.services {
        let _ = writeln!(out, "  {}: {}", service.name, service_line(&p, service));
    }

    out
}

fn write_process_table(out: &mut String, p: &Painter, heading: &str, rows: &[String]) {
    let _ = writeln!(out, "{}", p.label(heading, Color::Red));
    if rows.is_empty() {
        let _ = writeln!(out, "  {}", MISSING);
        return;
    }
    for row in rows {
        let _ = writeln!(out, "  {}", row);
    }
}

fn service_line(p: &Painter, service: &ServiceStatus) -> String {
    let color = match service.state {
        ServiceState::NotPresent => Color::DarkGrey,
        ServiceState::Present { .. } if service.is_active() => Color::Green,
        ServiceState::Present { .. } => Color::Red,
    };
    p.paint(&service.status_line(), color)
}
