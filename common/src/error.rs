use thiserror::Error;

/// Errors that prevent a scan from producing a report.
///
/// Everything except [`ScanError::ScanCancelled`] is raised before the first
/// probe is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("'{target}' is neither a valid IPv4 address nor a valid domain name")]
    InvalidFormat { target: String },

    #[error("scanning '{target}' is restricted: loopback and local addresses are not allowed")]
    RestrictedTarget { target: String },

    #[error("range covers {count} ports, the maximum per scan is {max}")]
    RangeTooLarge { count: i64, max: usize },

    #[error("scan cancelled before all probes completed")]
    ScanCancelled,
}
