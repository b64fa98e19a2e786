use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use probr_common::network::target::Target;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{ProbeBackend, ProbeError};

const POPULAR_HOSTS: &[&str] = &["google", "github", "microsoft"];
const POPULAR_PORTS: &[u16] = &[80, 443];
const OPEN_THRESHOLD: f64 = 0.92;
const LATENCY_MS: std::ops::Range<u64> = 10..60;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubOutcome {
    Open(Duration),
    Closed,
    Filtered,
}

/// Network-free backend with reproducible results.
///
/// Every outcome is a pure function of `(seed, target, port)`:
/// 1. explicit per-port overrides win;
/// 2. hosts whose name mentions a well-known provider have 80 and 443 open;
/// 3. anything else is open with 8% probability, otherwise closed.
#[derive(Debug, Clone)]
pub struct StubBackend {
    seed: u64,
    overrides: HashMap<u16, StubOutcome>,
    delay: Option<(Duration, Duration)>,
}

impl StubBackend {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            overrides: HashMap::new(),
            delay: None,
        }
    }

    pub fn with_outcome(mut self, port: u16, outcome: StubOutcome) -> Self {
        self.overrides.insert(port, outcome);
        self
    }

    /// Makes each probe sleep for a per-port duration between `min` and `max`.
    ///
    /// The duration is derived from the same seed as the outcome, so the
    /// completion order is reproducible too.
    pub fn with_delay(mut self, min: Duration, max: Duration) -> Self {
        self.delay = Some((min, max.max(min)));
        self
    }

    pub fn simulate(&self, target: &Target, port: u16) -> StubOutcome {
        if let Some(outcome) = self.overrides.get(&port) {
            return *outcome;
        }

        let mut rng = self.rng_for(target, port);
        let latency = Duration::from_millis(rng.random_range(LATENCY_MS));

        let is_popular = POPULAR_HOSTS.iter().any(|host| target.as_str().contains(host));
        if is_popular && POPULAR_PORTS.contains(&port) {
            return StubOutcome::Open(latency);
        }

        if rng.random::<f64>() > OPEN_THRESHOLD {
            StubOutcome::Open(latency)
        } else {
            StubOutcome::Closed
        }
    }

    fn delay_for(&self, target: &Target, port: u16) -> Option<Duration> {
        let (min, max) = self.delay?;
        let spread = (max - min).as_millis() as u64;
        let mut rng = self.rng_for(target, port.wrapping_add(1));
        Some(min + Duration::from_millis(rng.random_range(0..=spread)))
    }

    fn rng_for(&self, target: &Target, port: u16) -> StdRng {
        StdRng::seed_from_u64(mix(self.seed, target.as_str(), port))
    }
}

/// FNV-1a over `seed`, `target` and `port` (integers little-endian).
/// The value must not change between releases.
fn mix(seed: u64, target: &str, port: u16) -> u64 {
    seed.to_le_bytes()
        .iter()
        .chain(target.as_bytes())
        .chain(port.to_le_bytes().iter())
        .fold(FNV_OFFSET, |hash, byte| (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME))
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new(0)
    }
}

#[async_trait]
impl ProbeBackend for StubBackend {
    async fn connect(
        &self,
        target: &Target,
        port: u16,
        _timeout: Duration,
    ) -> Result<Duration, ProbeError> {
        if let Some(delay) = self.delay_for(target, port) {
            tokio::time::sleep(delay).await;
        }

        match self.simulate(target, port) {
            StubOutcome::Open(latency) => Ok(latency),
            StubOutcome::Closed => Err(ProbeError::Refused),
            StubOutcome::Filtered => Err(ProbeError::Timeout),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    fn target(raw: &str) -> Target {
        Target::validate(raw).unwrap()
    }

    #[test]
    fn popular_hosts_expose_web_ports() {
        let stub = StubBackend::new(7);
        let github = target("github.com");

        assert!(matches!(stub.simulate(&github, 80), StubOutcome::Open(_)));
        assert!(matches!(stub.simulate(&github, 443), StubOutcome::Open(_)));
    }

    #[test]
    fn seed_mix_is_pinned() {
        assert_eq!(mix(7, "example.com", 443), 0xd565_334d_f52c_a27f);
        assert_eq!(mix(0, "", 0), 0x69d3_07cc_20f6_ef8d);
        assert_ne!(mix(7, "example.com", 443), mix(7, "example.com", 444));
        assert_ne!(mix(7, "example.com", 443), mix(8, "example.com", 443));
    }

    #[test]
    fn outcomes_are_reproducible() {
        let a = StubBackend::new(42);
        let b = StubBackend::new(42);
        let host = target("example.org");

        for port in 1..=512 {
            assert_eq!(a.simulate(&host, port), b.simulate(&host, port));
        }
    }

    #[test]
    fn latency_stays_in_range() {
        let stub = StubBackend::new(3);
        let host = target("10.1.2.3");

        for port in 1..=2_000 {
            if let StubOutcome::Open(latency) = stub.simulate(&host, port) {
                assert!(LATENCY_MS.contains(&(latency.as_millis() as u64)));
            }
        }
    }

    #[test]
    fn overrides_take_precedence() {
        let stub = StubBackend::new(1)
            .with_outcome(443, StubOutcome::Filtered)
            .with_outcome(22, StubOutcome::Closed);
        let google = target("google.com");

        assert_eq!(stub.simulate(&google, 443), StubOutcome::Filtered);
        assert_eq!(stub.simulate(&google, 22), StubOutcome::Closed);
    }

    #[tokio::test]
    async fn connect_maps_outcomes_to_probe_errors() {
        let stub = StubBackend::new(0)
            .with_outcome(1, StubOutcome::Open(Duration::from_millis(11)))
            .with_outcome(2, StubOutcome::Closed)
            .with_outcome(3, StubOutcome::Filtered);
        let host = target("example.net");
        let timeout = Duration::from_secs(1);

        assert_eq!(stub.connect(&host, 1, timeout).await, Ok(Duration::from_millis(11)));
        assert_eq!(stub.connect(&host, 2, timeout).await, Err(ProbeError::Refused));
        assert_eq!(stub.connect(&host, 3, timeout).await, Err(ProbeError::Timeout));
    }

    #[test]
    fn delay_is_bounded() {
        let stub = StubBackend::new(9).with_delay(Duration::from_millis(5), Duration::from_millis(20));
        let host = target("example.com");

        for port in 1..=100 {
            let delay = stub.delay_for(&host, port).unwrap();
            assert!(delay >= Duration::from_millis(5) && delay <= Duration::from_millis(20));
        }
    }
}
