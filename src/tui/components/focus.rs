/// Index of the focused element among `len` focusable ones
///
/// Moving past either end wraps around.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusRing {
    index: usize,
    len: usize,
}

impl FocusRing {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_focused(&self, index: usize) -> bool {
        self.len > 0 && self.index == index
    }

    pub fn next(&mut self) {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
    }

    pub fn prev(&mut self) {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
    }

    pub fn focus(&mut self, index: usize) {
        if index < self.len {
            self.index = index;
        }
    }

    pub fn first(&mut self) {
        self.index = 0;
    }

    /// Change the number of focusables, keeping the index in range
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if self.index >= len {
            self.index = len.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_both_ways() {
        let mut ring = FocusRing::new(3);
        ring.prev();
        assert_eq!(ring.index(), 2);
        ring.next();
        assert_eq!(ring.index(), 0);
        ring.next();
        ring.next();
        ring.next();
        assert_eq!(ring.index(), 0);
    }

    #[test]
    fn test_empty_ring_is_inert() {
        let mut ring = FocusRing::new(0);
        ring.next();
        ring.prev();
        assert_eq!(ring.index(), 0);
        assert!(!ring.is_focused(0));
    }

    #[test]
    fn test_set_len_clamps() {
        let mut ring = FocusRing::new(5);
        ring.focus(4);
        ring.set_len(2);
        assert_eq!(ring.index(), 1);
        ring.focus(7);
        assert_eq!(ring.index(), 1);
    }
}
