use std::time::{Duration, Instant};

/// Staggered fade-in of a page's items as they scroll into view
///
/// Item `i` is revealed `stagger * i` after it is first seen. Once revealed an
/// item stays revealed.
#[derive(Debug, Clone)]
pub struct RevealTracker {
    stagger: Duration,
    /// `None` until observed, then the instant the item becomes visible
    due: Vec<Option<Instant>>,
    revealed: Vec<bool>,
}

impl RevealTracker {
    pub fn new(items: usize, stagger: Duration) -> Self {
        Self {
            stagger,
            due: vec![None; items],
            revealed: vec![false; items],
        }
    }

    pub fn len(&self) -> usize {
        self.revealed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revealed.is_empty()
    }

    /// Items in `visible` entered the viewport at `now`
    pub fn observe(&mut self, visible: impl IntoIterator<Item = usize>, now: Instant) {
        for index in visible {
            if let Some(slot) = self.due.get_mut(index) {
                if slot.is_none() {
                    *slot = Some(now + self.stagger * index as u32);
                }
            }
        }
        self.tick(now);
    }

    pub fn tick(&mut self, now: Instant) {
        for (due, revealed) in self.due.iter().zip(self.revealed.iter_mut()) {
            if matches!(due, Some(at) if now >= *at) {
                *revealed = true;
            }
        }
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.get(index).copied().unwrap_or(false)
    }

    pub fn all_revealed(&self) -> bool {
        self.revealed.iter().all(|r| *r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stagger_by_index() {
        let start = Instant::now();
        let mut tracker = RevealTracker::new(3, Duration::from_millis(200));
        tracker.observe(0..3, start);
        assert!(tracker.is_revealed(0));
        assert!(!tracker.is_revealed(1));

        tracker.tick(start + Duration::from_millis(200));
        assert!(tracker.is_revealed(1));
        assert!(!tracker.is_revealed(2));

        tracker.tick(start + Duration::from_millis(400));
        assert!(tracker.all_revealed());
    }

    #[test]
    fn test_unobserved_items_stay_hidden() {
        let start = Instant::now();
        let mut tracker = RevealTracker::new(4, Duration::from_millis(100));
        tracker.observe([0, 1], start);
        tracker.tick(start + Duration::from_secs(10));
        assert!(tracker.is_revealed(1));
        assert!(!tracker.is_revealed(3));
        assert!(!tracker.is_revealed(99));
    }

    #[test]
    fn test_reobserving_keeps_first_deadline() {
        let start = Instant::now();
        let mut tracker = RevealTracker::new(2, Duration::from_millis(100));
        tracker.observe([1], start);
        tracker.observe([1], start + Duration::from_millis(50));
        tracker.tick(start + Duration::from_millis(100));
        assert!(tracker.is_revealed(1));
    }
}
