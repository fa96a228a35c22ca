//! # Exclusivity Guard
//!
//! Makes sure only one telephony factory drives the radios on a host. The
//! guard claims a well-known local endpoint and keeps it for as long as the
//! returned [`InstanceLock`] is alive. A second process trying the same name
//! retries a bounded number of times and then gives up with
//! [`GuardError::StartupConflict`]; there is no silent infinite retry.
//!
//! On Linux the endpoint is a Unix socket in the abstract namespace, so it
//! vanishes with the process and never leaves a stale file behind. Elsewhere
//! a lock file created with `create_new` stands in for it.

use std::io;
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::GuardConfig;
use crate::error::GuardError;

/// Something that can be claimed exclusively by at most one holder at a time.
pub trait ExclusiveEndpoint {
    /// Proof of ownership. Dropping it releases the endpoint.
    type Claim: Send;

    fn name(&self) -> &str;

    /// One claim attempt; must not block or retry internally.
    fn try_claim(&self) -> io::Result<Self::Claim>;
}

/// Host-wide named local endpoint.
#[derive(Debug, Clone)]
pub struct LocalEndpoint {
    name: String,
}

impl LocalEndpoint {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[cfg(target_os = "linux")]
impl ExclusiveEndpoint for LocalEndpoint {
    type Claim = std::os::unix::net::UnixListener;

    fn name(&self) -> &str {
        &self.name
    }

    fn try_claim(&self) -> io::Result<Self::Claim> {
        use std::os::linux::net::SocketAddrExt;
        use std::os::unix::net::{SocketAddr, UnixListener};

        let addr = SocketAddr::from_abstract_name(self.name.as_bytes())?;
        UnixListener::bind_addr(&addr)
    }
}

#[cfg(not(target_os = "linux"))]
impl ExclusiveEndpoint for LocalEndpoint {
    type Claim = LockFile;

    fn name(&self) -> &str {
        &self.name
    }

    fn try_claim(&self) -> io::Result<Self::Claim> {
        let path = std::env::temp_dir().join(format!("{}.lock", self.name));
        std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        Ok(LockFile { path })
    }
}

/// Lock file removed when dropped.
#[cfg(not(target_os = "linux"))]
#[derive(Debug)]
pub struct LockFile {
    path: std::path::PathBuf,
}

#[cfg(not(target_os = "linux"))]
impl Drop for LockFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Held exclusive claim. Keep it alive for the lifetime of the process.
#[derive(Debug)]
pub struct InstanceLock<C> {
    name: String,
    attempts: u32,
    _claim: C,
}

impl<C> InstanceLock<C> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// How many attempts it took to claim the endpoint (1 = first try).
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Bounded-retry acquisition of an [`ExclusiveEndpoint`].
pub struct ExclusivityGuard<E> {
    endpoint: E,
    max_retries: u32,
    retry_delay: Duration,
}

impl ExclusivityGuard<LocalEndpoint> {
    pub fn from_config(config: &GuardConfig) -> Self {
        Self::new(
            LocalEndpoint::new(config.name.clone()),
            config.max_retries,
            config.retry_delay,
        )
    }
}

impl<E: ExclusiveEndpoint> ExclusivityGuard<E> {
    pub fn new(endpoint: E, max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            endpoint,
            max_retries,
            retry_delay,
        }
    }

    /// Claim the endpoint, sleeping `retry_delay` between attempts.
    ///
    /// Makes at most `1 + max_retries` attempts. Exhausting them is fatal for
    /// the caller: a second instance must never drive the same radios.
    pub fn acquire(&self) -> Result<InstanceLock<E::Claim>, GuardError> {
        let total = self.max_retries.saturating_add(1);
        for attempt in 1..=total {
            match self.endpoint.try_claim() {
                Ok(claim) => {
                    info!(name = self.endpoint.name(), attempt, "exclusive endpoint claimed");
                    return Ok(InstanceLock {
                        name: self.endpoint.name().to_string(),
                        attempts: attempt,
                        _claim: claim,
                    });
                }
                Err(e) if attempt < total => {
                    warn!(
                        name = self.endpoint.name(),
                        attempt,
                        error = %e,
                        retry_in_ms = self.retry_delay.as_millis() as u64,
                        "exclusive endpoint busy, retrying"
                    );
                    thread::sleep(self.retry_delay);
                }
                Err(e) => {
                    warn!(name = self.endpoint.name(), attempt, error = %e, "exclusive endpoint busy");
                }
            }
        }
        Err(GuardError::StartupConflict {
            name: self.endpoint.name().to_string(),
            attempts: total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn unique_name(tag: &str) -> String {
        static SEQ: AtomicU32 = AtomicU32::new(0);
        format!(
            "telephony-factory-test-{}-{}-{}",
            std::process::id(),
            tag,
            SEQ.fetch_add(1, Ordering::Relaxed)
        )
    }

    /// Endpoint that stays busy for the first `busy_for` attempts.
    struct Flaky {
        busy_for: u32,
        calls: AtomicU32,
    }

    impl ExclusiveEndpoint for Flaky {
        type Claim = ();

        fn name(&self) -> &str {
            "flaky"
        }

        fn try_claim(&self) -> io::Result<()> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.busy_for {
                Err(io::Error::new(io::ErrorKind::AddrInUse, "busy"))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn first_claim_succeeds_immediately() {
        let guard = ExclusivityGuard::new(LocalEndpoint::new(unique_name("first")), 3, Duration::ZERO);
        let lock = guard.acquire().unwrap();
        assert_eq!(lock.attempts(), 1);
    }

    #[test]
    fn second_claim_conflicts_after_bounded_retries() {
        let name = unique_name("conflict");
        let first = ExclusivityGuard::new(LocalEndpoint::new(name.clone()), 0, Duration::ZERO);
        let _held = first.acquire().unwrap();

        let second = ExclusivityGuard::new(LocalEndpoint::new(name.clone()), 3, Duration::from_millis(1));
        match second.acquire() {
            Err(GuardError::StartupConflict { name: n, attempts }) => {
                assert_eq!(n, name);
                assert_eq!(attempts, 4);
            }
            Ok(_) => panic!("second instance must not claim a held endpoint"),
        }
    }

    #[test]
    fn released_endpoint_can_be_reclaimed() {
        let name = unique_name("release");
        let guard = ExclusivityGuard::new(LocalEndpoint::new(name), 0, Duration::ZERO);
        drop(guard.acquire().unwrap());
        assert!(guard.acquire().is_ok());
    }

    #[test]
    fn retries_until_endpoint_frees_up() {
        let guard = ExclusivityGuard::new(
            Flaky {
                busy_for: 2,
                calls: AtomicU32::new(0),
            },
            3,
            Duration::ZERO,
        );
        let lock = guard.acquire().unwrap();
        assert_eq!(lock.attempts(), 3);
    }

    #[test]
    fn gives_up_after_max_retries() {
        let endpoint = Flaky {
            busy_for: u32::MAX,
            calls: AtomicU32::new(0),
        };
        let guard = ExclusivityGuard::new(endpoint, 3, Duration::ZERO);
        assert!(guard.acquire().is_err());
        assert_eq!(guard.endpoint.calls.load(Ordering::SeqCst), 4);
    }
}
