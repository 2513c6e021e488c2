//! Per-connection subscription manager.
//!
//! Tracks which tour IDs a WebSocket client is subscribed to and
//! provides server-side event filtering.

use std::collections::HashSet;

use crate::domain::TourId;

/// Manages the set of tour subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Subscribed tour IDs. If `subscribe_all` is true, this set is ignored.
    tour_ids: HashSet<TourId>,
    /// Whether the client subscribes to all tours (wildcard `"*"`).
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds tour IDs to the subscription set. `"*"` enables the wildcard.
    pub fn subscribe(&mut self, ids: &[TourId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        for id in ids {
            self.tour_ids.insert(*id);
        }
    }

    /// Removes tour IDs from the subscription set.
    pub fn unsubscribe(&mut self, ids: &[TourId]) {
        for id in ids {
            self.tour_ids.remove(id);
        }
    }

    /// Returns `true` if the given tour ID matches the subscription filter.
    #[must_use]
    pub fn matches(&self, tour_id: TourId) -> bool {
        self.subscribe_all || self.tour_ids.contains(&tour_id)
    }

    /// Returns the number of explicitly subscribed tour IDs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.tour_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn empty_matches_nothing() {
        let mgr = SubscriptionManager::new();
        assert!(!mgr.matches(TourId::new()));
    }

    #[test]
    fn subscribe_specific_tour() {
        let mut mgr = SubscriptionManager::new();
        let id = TourId::new();
        mgr.subscribe(&[id], false);
        assert!(mgr.matches(id));
        assert!(!mgr.matches(TourId::new()));
    }

    #[test]
    fn wildcard_matches_everything() {
        let mut mgr = SubscriptionManager::new();
        mgr.subscribe(&[], true);
        assert!(mgr.matches(TourId::new()));
    }

    #[test]
    fn unsubscribe_removes_tour() {
        let mut mgr = SubscriptionManager::new();
        let id = TourId::new();
        mgr.subscribe(&[id], false);
        assert!(mgr.matches(id));
        mgr.unsubscribe(&[id]);
        assert!(!mgr.matches(id));
    }

    #[test]
    fn count_tracks_explicit() {
        let mut mgr = SubscriptionManager::new();
        assert_eq!(mgr.count(), 0);
        mgr.subscribe(&[TourId::new(), TourId::new()], false);
        assert_eq!(mgr.count(), 2);
    }
}
