//! # Scan Target Model
//!
//! Validates the host a scan is aimed at.
//!
//! A target is accepted when it is:
//! * A dotted-quad IPv4 literal (e.g., `93.184.216.34`).
//! * A domain name with an alphabetic top-level label (e.g., `example.com`).
//!
//! Loopback and local names are refused even when they are well formed.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::ScanError;

const MAX_HOSTNAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// A validated scan target. Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Target {
    normalized: String,
    kind: TargetKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Ipv4(Ipv4Addr),
    Hostname,
}

impl Target {
    /// Checks `raw` against the restriction policy and then against the
    /// IPv4 and hostname shapes.
    ///
    /// The policy runs first so that `localhost`, which has no dot and is
    /// therefore not a hostname by shape, still reports as restricted.
    pub fn validate(raw: &str) -> Result<Self, ScanError> {
        let normalized = raw.trim().to_ascii_lowercase();

        if is_restricted(&normalized) {
            return Err(ScanError::RestrictedTarget { target: normalized });
        }

        if let Some(addr) = parse_ipv4(&normalized) {
            return Ok(Self {
                normalized,
                kind: TargetKind::Ipv4(addr),
            });
        }

        if is_hostname(&normalized) {
            return Ok(Self {
                normalized,
                kind: TargetKind::Hostname,
            });
        }

        Err(ScanError::InvalidFormat {
            target: raw.trim().to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    /// The literal address, when the target was given as one.
    pub fn ipv4(&self) -> Option<Ipv4Addr> {
        match self.kind {
            TargetKind::Ipv4(addr) => Some(addr),
            TargetKind::Hostname => None,
        }
    }
}

impl FromStr for Target {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::validate(s)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

fn is_restricted(normalized: &str) -> bool {
    if normalized == "localhost" || normalized.ends_with(".localhost") {
        return true;
    }

    parse_ipv4(normalized).is_some_and(|addr| addr.is_loopback() || addr.is_unspecified())
}

/// Strict dotted quad: four fields of one to three digits, each at most 255.
///
/// Leading zeros are read as plain decimal, so `010` is ten.
fn parse_ipv4(s: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut fields = s.split('.');

    for octet in octets.iter_mut() {
        let field = fields.next()?;
        if field.is_empty() || field.len() > 3 || !field.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = field.parse::<u8>().ok()?;
    }

    if fields.next().is_some() {
        return None;
    }

    Some(Ipv4Addr::from(octets))
}

fn is_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_HOSTNAME_LEN || !s.contains('.') {
        return false;
    }

    let labels: Vec<&str> = s.split('.').collect();
    if !labels.iter().all(|label| is_label(label)) {
        return false;
    }

    labels
        .last()
        .is_some_and(|tld| tld.len() >= 2 && tld.bytes().all(|b| b.is_ascii_alphabetic()))
}

fn is_label(label: &str) -> bool {
    if label.is_empty() || label.len() > MAX_LABEL_LEN {
        return false;
    }
    if label.starts_with('-') || label.ends_with('-') {
        return false;
    }
    label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
