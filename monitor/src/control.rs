//! Stdin control lines understood by `ducq_send`.
//!
//! ```text
//! command <text>   route <text>   payload <text>
//! host <name>      port <number>
//! send             close          quit
//! ```
//!
//! `\n` inside a text value becomes a newline, `\\` a backslash.

use anyhow::{anyhow, bail, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Command(String),
    Route(String),
    Payload(String),
    Host(String),
    Port(u16),
    /// Turn the session on.
    Send,
    /// Turn the session off.
    Close,
    Quit,
}

/// `Ok(None)` for blank lines.
pub fn parse_control(line: &str) -> Result<Option<Control>> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(None);
    }
    let (keyword, raw) = match line.trim_start().split_once(' ') {
        Some((keyword, raw)) => (keyword, raw),
        None => (line.trim(), ""),
    };
    // Payloads keep their spacing, everything else is trimmed.
    let value = Some(raw.trim()).filter(|v| !v.is_empty());

    let control = match (keyword, value) {
        ("payload", _) => Control::Payload(unescape(raw)),
        ("command", Some(v)) => Control::Command(unescape(v)),
        ("route", Some(v)) => Control::Route(unescape(v)),
        ("host", Some(v)) => Control::Host(v.to_string()),
        ("port", Some(v)) => Control::Port(v.parse().map_err(|e| anyhow!("invalid port {:?}: {}", v, e))?),
        ("send", None) => Control::Send,
        ("close", None) => Control::Close,
        ("quit" | "exit", None) => Control::Quit,
        ("command" | "route" | "host" | "port", None) => bail!("'{}' needs a value", keyword),
        _ => bail!("unknown control line {:?}", line),
    };
    Ok(Some(control))
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
