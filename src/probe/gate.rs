//! Admission gate bounding in-flight probes.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Configured concurrency limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Concurrency {
    /// At most `n` probes in flight.
    Bounded(usize),
    /// Every target launched at once.
    #[default]
    Unbounded,
}

impl Concurrency {
    /// `Bounded(n)` for `Some(n)`, `Unbounded` for `None`.
    pub fn from_limit(limit: Option<usize>) -> Self {
        match limit {
            Some(n) => Self::Bounded(n),
            None => Self::Unbounded,
        }
    }

    pub fn limit(self) -> Option<usize> {
        match self {
            Self::Bounded(n) => Some(n),
            Self::Unbounded => None,
        }
    }
}

impl FromStr for Concurrency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("unlimited") || s.eq_ignore_ascii_case("unbounded") {
            return Ok(Self::Unbounded);
        }
        match s.parse::<usize>() {
            Ok(0) => Err("concurrency limit must be at least 1".to_string()),
            Ok(n) => Ok(Self::Bounded(n)),
            Err(_) => Err(format!(
                "invalid concurrency '{}': expected a number or 'unlimited'",
                s
            )),
        }
    }
}

impl fmt::Display for Concurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(n) => write!(f, "{}", n),
            Self::Unbounded => write!(f, "unlimited"),
        }
    }
}

impl Serialize for Concurrency {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bounded(n) => serializer.serialize_u64(*n as u64),
            Self::Unbounded => serializer.serialize_str("unlimited"),
        }
    }
}

impl<'de> Deserialize<'de> for Concurrency {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(usize),
            Text(String),
        }

        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(Self::Unbounded),
            Some(Raw::Number(0)) => Err(serde::de::Error::custom(
                "concurrency limit must be at least 1",
            )),
            Some(Raw::Number(n)) => Ok(Self::Bounded(n)),
            Some(Raw::Text(s)) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Runtime gate built from a [`Concurrency`] setting.
#[derive(Debug, Clone)]
pub enum AdmissionGate {
    Bounded(Arc<Semaphore>),
    Unbounded,
}

impl AdmissionGate {
    pub fn new(concurrency: Concurrency) -> Self {
        match concurrency {
            Concurrency::Bounded(n) => Self::Bounded(Arc::new(Semaphore::new(n.max(1)))),
            Concurrency::Unbounded => Self::Unbounded,
        }
    }

    /// Wait for a slot. The slot is released when the returned permit drops.
    pub async fn admit(&self) -> Option<OwnedSemaphorePermit> {
        match self {
            // The semaphore is never closed, so acquisition only fails if that changes.
            Self::Bounded(semaphore) => semaphore.clone().acquire_owned().await.ok(),
            Self::Unbounded => None,
        }
    }
}
