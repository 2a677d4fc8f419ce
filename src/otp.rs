use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use rand::Rng;

#[derive(Debug, Clone)]
struct OtpEntry {
    code: String,
    issued_at: Instant,
}

impl OtpEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.issued_at.elapsed() >= ttl
    }
}

/// One-time codes keyed by phone number.
///
/// A code lives until it is consumed by a successful [`OtpStore::verify`],
/// replaced by a newer [`OtpStore::issue`] for the same phone, or its TTL runs
/// out. Clones share the same map.
#[derive(Debug, Clone)]
pub struct OtpStore {
    entries: Arc<DashMap<String, OtpEntry>>,
    ttl: Duration,
}

impl OtpStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Generate a fresh 4-digit code for `phone`, replacing any previous one.
    pub fn issue(&self, phone: &str) -> String {
        let code = format!("{:04}", rand::thread_rng().gen_range(0..10_000));
        self.insert(phone, code.clone());
        code
    }

    /// Store a known code for `phone`.
    pub fn insert(&self, phone: &str, code: String) {
        self.entries.insert(
            phone.to_string(),
            OtpEntry {
                code,
                issued_at: Instant::now(),
            },
        );
    }

    /// Check `code` against the stored one and consume it on success.
    ///
    /// A wrong code leaves the stored one in place. Expired codes are dropped.
    pub fn verify(&self, phone: &str, code: &str) -> bool {
        let removed = self
            .entries
            .remove_if(phone, |_, entry| entry.is_expired(self.ttl) || entry.code == code);
        match removed {
            Some((_, entry)) => !entry.is_expired(self.ttl) && entry.code == code,
            None => false,
        }
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(self.ttl));
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
