//! Cooldown Tracker
//!
//! Process-local registry of the last successful claim per identity signal.
//! Not durable: cooldowns reset when the process restarts.

use crate::domain::entities::CooldownEntry;
use crate::domain::services::cooldown_remaining;
use crate::domain::value_objects::{CooldownStatus, IdentitySignal};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;

#[derive(Debug, Default)]
struct Slot {
    last_claim_ms: Option<i64>,
    /// Serializes claims for this signal. Holders and waiters each own a
    /// clone, so the map's copy is the only one when nobody is claiming.
    gate: Arc<tokio::sync::Mutex<()>>,
}

impl Slot {
    fn remaining(&self, now_ms: i64, window: Duration) -> Option<Duration> {
        self.last_claim_ms
            .and_then(|last| cooldown_remaining(last, now_ms, window))
    }

    fn is_claiming(&self) -> bool {
        Arc::strong_count(&self.gate) > 1
    }
}

/// Shared cooldown state, injected into the claim use case.
///
/// The map lock is short and never held across an await. Waiting for a
/// signal's turn happens on that signal's own async gate.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    slots: Mutex<HashMap<IdentitySignal, Slot>>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `signal` is still inside its cooldown window at `now_ms`.
    /// Expired entries found here are dropped.
    pub fn status(&self, signal: &IdentitySignal, now_ms: i64, window: Duration) -> CooldownStatus {
        let mut slots = self.slots.lock();
        let Some(slot) = slots.get(signal) else {
            return CooldownStatus::Clear;
        };

        match slot.remaining(now_ms, window) {
            Some(remaining) => CooldownStatus::CoolingDown { remaining },
            None => {
                if !slot.is_claiming() {
                    slots.remove(signal);
                }
                CooldownStatus::Clear
            }
        }
    }

    /// Set the last claim time of `signal`. Last write wins.
    pub fn record(&self, signal: &IdentitySignal, now_ms: i64) {
        let mut slots = self.slots.lock();
        slots.entry(signal.clone()).or_default().last_claim_ms = Some(now_ms);
        tracing::debug!(signal = %signal, at_ms = now_ms, "Cooldown recorded");
    }

    /// Wait for exclusive use of `signal`.
    ///
    /// Claims for the same signal run one at a time: a second request waits
    /// here until the first permit is dropped, then checks `status` against
    /// whatever the first one did or did not record. Dropping a permit of a
    /// signal that never had a claim recorded leaves no entry behind.
    pub async fn acquire(&self, signal: &IdentitySignal) -> ClaimPermit<'_> {
        let gate = {
            let mut slots = self.slots.lock();
            slots.entry(signal.clone()).or_default().gate.clone()
        };
        let guard = gate.lock_owned().await;

        ClaimPermit {
            tracker: self,
            signal: signal.clone(),
            guard: Some(guard),
        }
    }

    /// Last recorded claim of `signal`, regardless of expiry
    pub fn last_claim(&self, signal: &IdentitySignal) -> Option<CooldownEntry> {
        let slots = self.slots.lock();
        let last_claim_at_ms = slots.get(signal)?.last_claim_ms?;
        Some(CooldownEntry {
            signal: signal.clone(),
            last_claim_at_ms,
        })
    }

    /// Number of signals with a recorded claim
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.last_claim_ms.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry whose window has elapsed. Returns how many went.
    pub fn evict_expired(&self, now_ms: i64, window: Duration) -> usize {
        let mut slots = self.slots.lock();
        let before = slots.len();
        slots.retain(|_, slot| slot.is_claiming() || slot.remaining(now_ms, window).is_some());
        before - slots.len()
    }

    fn release(&self, signal: &IdentitySignal) {
        let mut slots = self.slots.lock();
        let unused = slots
            .get(signal)
            .is_some_and(|slot| slot.last_claim_ms.is_none() && !slot.is_claiming());
        if unused {
            slots.remove(signal);
        }
    }
}

/// Exclusive turn to claim for one signal; see [`CooldownTracker::acquire`]
#[derive(Debug)]
pub struct ClaimPermit<'a> {
    tracker: &'a CooldownTracker,
    signal: IdentitySignal,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ClaimPermit<'_> {
    fn drop(&mut self) {
        // Unlock first so the gate's reference count reflects only waiters
        self.guard.take();
        self.tracker.release(&self.signal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);
    const T0: i64 = 1_700_000_000_000;

    fn signal(ip: &str) -> IdentitySignal {
        IdentitySignal::network(ip.parse().unwrap())
    }

    #[test]
    fn test_unknown_signal_is_clear() {
        let tracker = CooldownTracker::new();
        assert_eq!(
            tracker.status(&signal("203.0.113.7"), T0, WINDOW),
            CooldownStatus::Clear
        );
    }

    #[test]
    fn test_window_boundaries() {
        let tracker = CooldownTracker::new();
        let s = signal("203.0.113.7");
        tracker.record(&s, T0);

        let status = tracker.status(&s, T0 + 60_000 - 1, WINDOW);
        assert_eq!(status.remaining(), Some(Duration::from_millis(1)));

        let status = tracker.status(&s, T0 + 60_000 + 1, WINDOW);
        assert_eq!(status, CooldownStatus::Clear);
    }

    #[test]
    fn test_record_overwrites() {
        let tracker = CooldownTracker::new();
        let s = signal("203.0.113.7");
        tracker.record(&s, T0);
        tracker.record(&s, T0 + 30_000);

        assert_eq!(tracker.last_claim(&s).unwrap().last_claim_at_ms, T0 + 30_000);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_lazy_expiry_on_status() {
        let tracker = CooldownTracker::new();
        let s = signal("203.0.113.7");
        tracker.record(&s, T0);

        tracker.status(&s, T0 + 61_000, WINDOW);
        assert!(tracker.last_claim(&s).is_none());
        assert!(tracker.slots.lock().is_empty());
    }

    #[tokio::test]
    async fn test_second_acquire_waits_and_sees_recorded_claim() {
        let tracker = Arc::new(CooldownTracker::new());
        let s = signal("203.0.113.7");

        let first = tracker.acquire(&s).await;
        let waiter = {
            let tracker = tracker.clone();
            let s = s.clone();
            tokio::spawn(async move {
                let permit = tracker.acquire(&s).await;
                let status = tracker.status(&s, T0, WINDOW);
                drop(permit);
                status
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        tracker.record(&s, T0);
        drop(first);

        let status = waiter.await.unwrap();
        assert_eq!(status.remaining(), Some(WINDOW));
    }

    #[tokio::test]
    async fn test_second_acquire_sees_clear_when_first_records_nothing() {
        let tracker = Arc::new(CooldownTracker::new());
        let s = signal("203.0.113.7");

        let first = tracker.acquire(&s).await;
        let waiter = {
            let tracker = tracker.clone();
            let s = s.clone();
            tokio::spawn(async move {
                let permit = tracker.acquire(&s).await;
                let status = tracker.status(&s, T0, WINDOW);
                drop(permit);
                status
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(first);

        assert_eq!(waiter.await.unwrap(), CooldownStatus::Clear);
        assert!(tracker.is_empty());
        assert!(tracker.slots.lock().is_empty());
    }

    #[tokio::test]
    async fn test_dropped_permit_leaves_no_entry() {
        let tracker = CooldownTracker::new();
        let s = signal("203.0.113.7");

        drop(tracker.acquire(&s).await);

        assert!(tracker.last_claim(&s).is_none());
        assert!(tracker.slots.lock().is_empty());
        assert_eq!(tracker.evict_expired(T0, WINDOW), 0);
    }

    #[tokio::test]
    async fn test_recorded_claim_outlives_permit() {
        let tracker = CooldownTracker::new();
        let s = signal("203.0.113.7");

        let permit = tracker.acquire(&s).await;
        tracker.record(&s, T0);
        drop(permit);

        assert_eq!(
            tracker.status(&s, T0 + 1_000, WINDOW).remaining(),
            Some(Duration::from_secs(59))
        );
    }

    #[tokio::test]
    async fn test_evict_expired() {
        let tracker = CooldownTracker::new();
        tracker.record(&signal("203.0.113.1"), T0);
        tracker.record(&signal("203.0.113.2"), T0 + 30_000);
        let claiming = signal("203.0.113.3");
        let _permit = tracker.acquire(&claiming).await;

        let evicted = tracker.evict_expired(T0 + 70_000, WINDOW);

        assert_eq!(evicted, 1);
        assert!(tracker.last_claim(&signal("203.0.113.1")).is_none());
        assert!(tracker.last_claim(&signal("203.0.113.2")).is_some());
        assert!(tracker.slots.lock().contains_key(&claiming));
    }
}
