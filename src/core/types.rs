//! Core type definitions used throughout the codebase

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Lifecycle phase of the simulated unit.
///
/// Phases are strictly ordered and each is entered exactly once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Setup,
    Operation,
    Teardown,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Setup, Phase::Operation, Phase::Teardown];

    pub fn index(self) -> usize {
        match self {
            Phase::Setup => 0,
            Phase::Operation => 1,
            Phase::Teardown => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Operation => "operation",
            Phase::Teardown => "teardown",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Substrate the unit is deployed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    K8s,
    Lxd,
}

impl Platform {
    /// Only k8s units run workload containers that report readiness.
    pub fn has_pebble(self) -> bool {
        self == Platform::K8s
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::K8s => f.write_str("k8s"),
            Platform::Lxd => f.write_str("lxd"),
        }
    }
}

/// Who an action is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    User,
    ThisCharm,
    OtherCharm,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::User, Source::ThisCharm, Source::OtherCharm];

    /// Uniform draw over all sources
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Source {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    /// Uniform draw over the two charm sources
    pub fn random_charm<R: Rng + ?Sized>(rng: &mut R) -> Source {
        if rng.gen_bool(0.5) {
            Source::ThisCharm
        } else {
            Source::OtherCharm
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::User => f.write_str("user"),
            Source::ThisCharm => f.write_str("this_charm"),
            Source::OtherCharm => f.write_str("other_charm"),
        }
    }
}

/// Event kinds that can be spliced in as background noise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundKind {
    ContainerReady,
    StatusUpdate,
}

impl BackgroundKind {
    pub const ALL: [BackgroundKind; 2] = [BackgroundKind::ContainerReady, BackgroundKind::StatusUpdate];

    pub fn index(self) -> usize {
        match self {
            BackgroundKind::ContainerReady => 0,
            BackgroundKind::StatusUpdate => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BackgroundKind::ContainerReady => "pebble-ready",
            BackgroundKind::StatusUpdate => "update-status",
        }
    }
}

impl fmt::Display for BackgroundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_phases_are_ordered() {
        assert!(Phase::Setup < Phase::Operation);
        assert!(Phase::Operation < Phase::Teardown);
        for (i, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(phase.index(), i);
        }
    }

    #[test]
    fn test_only_k8s_has_pebble() {
        assert!(Platform::K8s.has_pebble());
        assert!(!Platform::Lxd.has_pebble());
        assert_eq!(Platform::default(), Platform::K8s);
    }

    #[test]
    fn test_random_source_covers_all_values() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let drawn: std::collections::HashSet<Source> =
            (0..200).map(|_| Source::random(&mut rng)).collect();
        assert_eq!(drawn.len(), 3);
    }

    #[test]
    fn test_random_charm_source_never_user() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            assert_ne!(Source::random_charm(&mut rng), Source::User);
        }
    }
}
