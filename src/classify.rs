/*!
Infrastructure IP classification.

Security scanners and mail gateways follow links in phishing simulations
before a human ever sees the message. Their clicks are noise. This module
decides whether an address belongs to that infrastructure:

- a single hardcoded prefix rule (`40.94.`), and
- an exact-match set of known scanner addresses, optionally extended at
  startup with addresses from configuration.

Matching is plain string comparison; there is no CIDR math.
*/

use std::collections::HashSet;

use once_cell::sync::Lazy;
use tracing::warn;

/// Any address starting with this literal prefix is infrastructure.
pub const INFRASTRUCTURE_PREFIX: &str = "40.94.";

/// Known scanner / mail-relay addresses. The list carries duplicates as
/// collected; they collapse when the set is built.
const BUILTIN_INFRASTRUCTURE_IPS: &[&str] = &[
    "40.94.35.51", "20.29.104.211", "20.29.217.202", "20.41.15.125",
    "20.69.122.32", "20.7.159.167", "20.245.197.116", "20.245.23.33",
    "20.245.235.33", "20.242.28.84", "23.99.227.98", "23.101.122.145",
    "23.101.201.52", "4.154.11.187", "4.155.104.111", "4.155.105.193",
    "52.136.118.207", "52.143.122.98", "52.149.182.255", "52.151.52.78",
    "52.152.128.128", "52.176.50.116", "52.191.199.168", "172.203.124.33",
    "13.88.21.140", "13.92.186.145", "40.71.125.77", "20.230.224.3",
    "20.119.242.15", "172.174.39.181", "104.42.169.232", "13.91.127.81",
    "40.78.42.207", "40.84.39.216", "20.236.59.68", "172.202.88.108",
    "172.172.71.142", "20.12.213.197", "20.169.253.245", "40.77.111.31",
    "20.22.207.237", "137.117.86.228", "172.172.8.186", "168.61.170.4",
    "172.172.53.23", "40.83.213.64", "13.93.221.37", "40.83.38.140",
    "172.176.114.168", "20.169.128.221", "20.232.147.16", "137.135.50.44",
    "172.172.71.29", "20.125.60.209", "172.173.164.206", "20.231.19.87",
    "23.101.197.87", "20.124.252.33", "20.12.213.244", "13.67.128.227",
    "20.109.170.252", "20.109.112.126", "40.77.57.90", "13.86.29.63",
    "172.176.117.104", "13.89.233.158", "172.173.214.111", "20.112.16.235",
    "40.83.148.99", "13.87.247.220", "20.109.170.252", "20.124.252.33",
    "74.235.70.86", "20.228.107.36", "23.99.8.58", "104.43.232.151",
    "13.89.233.158", "20.36.19.251", "20.230.31.128", "20.12.213.244",
    "13.87.247.220", "13.67.128.227", "172.173.175.203", "20.230.31.128",
    "40.83.148.99", "20.12.213.244", "20.124.252.33", "172.212.146.7",
    "172.173.214.111", "23.99.8.58",
];

static BUILTIN: Lazy<HashSet<&'static str>> =
    Lazy::new(|| BUILTIN_INFRASTRUCTURE_IPS.iter().copied().collect());

/// Why an address was classified as infrastructure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    /// Matched [`INFRASTRUCTURE_PREFIX`].
    Prefix,
    /// Exact member of the built-in list.
    BuiltIn,
    /// Exact member of the configured additions.
    Configured,
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExclusionReason::Prefix => "prefix",
            ExclusionReason::BuiltIn => "built-in",
            ExclusionReason::Configured => "configured",
        };
        f.write_str(s)
    }
}

/// Immutable set of infrastructure addresses for one run.
///
/// Built once at startup from the built-in list plus configured additions and
/// never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct InfrastructureIpSet {
    configured: HashSet<String>,
}

impl InfrastructureIpSet {
    /// The built-in set with no additions.
    pub fn builtin() -> Self {
        Self::default()
    }

    /// The built-in set extended with `additional` literal addresses.
    /// Entries are trimmed; blank entries are skipped with a warning.
    pub fn with_additional<I, S>(additional: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut configured = HashSet::new();
        for entry in additional {
            let ip = entry.as_ref().trim();
            if ip.is_empty() {
                warn!("Ignoring blank entry in additional infrastructure IPs");
                continue;
            }
            if !BUILTIN.contains(ip) {
                configured.insert(ip.to_string());
            }
        }
        Self { configured }
    }

    /// Number of distinct literal addresses (built-in plus configured).
    pub fn len(&self) -> usize {
        BUILTIN.len() + self.configured.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of configured addresses not already in the built-in list.
    pub fn configured_len(&self) -> usize {
        self.configured.len()
    }

    /// Exact literal membership (ignores the prefix rule).
    pub fn contains(&self, ip: &str) -> bool {
        BUILTIN.contains(ip) || self.configured.contains(ip)
    }

    /// Classify `ip`, returning the reason if it should be excluded.
    pub fn classify(&self, ip: &str) -> Option<ExclusionReason> {
        if ip.starts_with(INFRASTRUCTURE_PREFIX) {
            Some(ExclusionReason::Prefix)
        } else if BUILTIN.contains(ip) {
            Some(ExclusionReason::BuiltIn)
        } else if self.configured.contains(ip) {
            Some(ExclusionReason::Configured)
        } else {
            None
        }
    }

    /// True if `ip` is infrastructure and must be dropped.
    pub fn is_excluded(&self, ip: &str) -> bool {
        self.classify(ip).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_duplicates_collapse() {
        assert_eq!(BUILTIN_INFRASTRUCTURE_IPS.len(), 90);
        let set = InfrastructureIpSet::builtin();
        assert_eq!(set.len(), 78);
        assert!(set.contains("20.124.252.33"));
    }

    #[test]
    fn prefix_rule_applies_regardless_of_membership() {
        let set = InfrastructureIpSet::builtin();
        assert!(!set.contains("40.94.99.1"));
        assert_eq!(set.classify("40.94.99.1"), Some(ExclusionReason::Prefix));
        // Only the dotted prefix counts.
        assert_eq!(set.classify("40.945.1.1"), None);
        assert_eq!(set.classify("140.94.1.1"), None);
    }

    #[test]
    fn exact_matching_only() {
        let set = InfrastructureIpSet::builtin();
        assert_eq!(set.classify("23.99.8.58"), Some(ExclusionReason::BuiltIn));
        assert_eq!(set.classify("23.99.8.5"), None);
        assert_eq!(set.classify(" 23.99.8.58"), None);
        assert!(!set.is_excluded("8.8.8.8"));
    }

    #[test]
    fn configured_additions() {
        let set = InfrastructureIpSet::with_additional(["9.9.9.9", " 1.1.1.1 ", "", "23.99.8.58"]);
        assert_eq!(set.classify("9.9.9.9"), Some(ExclusionReason::Configured));
        assert_eq!(set.classify("1.1.1.1"), Some(ExclusionReason::Configured));
        // Already built in; reported as such and not double counted.
        assert_eq!(set.classify("23.99.8.58"), Some(ExclusionReason::BuiltIn));
        assert_eq!(set.configured_len(), 2);
        assert_eq!(set.len(), 80);
    }
}
