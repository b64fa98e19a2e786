//! # Port Selection
//!
//! Turns a scan mode into the ordered list of ports one scan will probe.

use std::collections::HashSet;

use crate::error::ScanError;

/// Hard cap on the size of a numeric range.
pub const MAX_RANGE_PORTS: usize = 256;

const MIN_PORT: i64 = 1;
const MAX_PORT: i64 = u16::MAX as i64;

/// Well-known ports probed by [`ScanMode::Common`], in probe order.
pub const COMMON_PORTS: &[u16] = &[
    21, 22, 23, 25, 53, 80, 110, 111, 135, 139, 143, 443, 445, 993, 995, 1723, 3306, 3389, 5432,
    5900, 6379, 8080, 8443, 27017,
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScanMode {
    /// The curated [`COMMON_PORTS`] list.
    #[default]
    Common,
    /// A contiguous, inclusive numeric range.
    Range,
}

/// The ordered, deduplicated ports selected for one scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortSet {
    ports: Vec<u16>,
}

impl PortSet {
    /// Builds the port set for `mode`.
    ///
    /// Range bounds are ignored in [`ScanMode::Common`]. In [`ScanMode::Range`]
    /// they are clamped to `1..=65535` before the size check; a missing bound
    /// or an inverted range yields an empty set.
    pub fn build(
        mode: ScanMode,
        range_start: Option<i64>,
        range_end: Option<i64>,
    ) -> Result<Self, ScanError> {
        match mode {
            ScanMode::Common => Ok(Self::from_ports(COMMON_PORTS.iter().copied())),
            ScanMode::Range => {
                let range = clamp_range(range_start, range_end)?;
                Ok(Self::from_ports(range))
            }
        }
    }

    /// Keeps the first occurrence of every port, in input order.
    pub fn from_ports<I>(ports: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        let mut seen: HashSet<u16> = HashSet::new();
        let ports: Vec<u16> = ports.into_iter().filter(|port| seen.insert(*port)).collect();
        Self { ports }
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.ports
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.ports.iter().copied()
    }
}

impl<'a> IntoIterator for &'a PortSet {
    type Item = &'a u16;
    type IntoIter = std::slice::Iter<'a, u16>;

    fn into_iter(self) -> Self::IntoIter {
        self.ports.iter()
    }
}

/// Missing bounds, or bounds that are empty once clamped, select no ports.
fn clamp_range(range_start: Option<i64>, range_end: Option<i64>) -> Result<Vec<u16>, ScanError> {
    let (Some(raw_start), Some(raw_end)) = (range_start, range_end) else {
        return Ok(Vec::new());
    };

    let start: i64 = raw_start.max(MIN_PORT);
    let end: i64 = raw_end.min(MAX_PORT);
    let count: i64 = end.saturating_sub(start).saturating_add(1);

    if count > MAX_RANGE_PORTS as i64 {
        return Err(ScanError::RangeTooLarge {
            count,
            max: MAX_RANGE_PORTS,
        });
    }

    if count < 1 {
        return Ok(Vec::new());
    }

    // Both bounds sit inside 1..=65535 once count is known to be positive.
    Ok((start as u16..=end as u16).collect())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
