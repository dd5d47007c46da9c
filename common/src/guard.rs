//! Out-of-order response protection.
//!
//! Each async concern (list fetch, modal loads) owns a `Generation`. A request
//! captures the ticket returned by `issue`; when its response arrives it is
//! applied only if `is_current` still holds for that ticket.

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Generation {
    current: u64,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request, making every earlier ticket stale.
    pub fn issue(&mut self) -> u64 {
        self.current = self.current.wrapping_add(1);
        self.current
    }

    /// Ticket of the latest `issue` or `invalidate`. Concerns that send several
    /// requests per round tag each of them with it instead of issuing.
    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.current == ticket
    }

    /// Marks outstanding requests stale without starting a new one, e.g. when
    /// a modal closes.
    pub fn invalidate(&mut self) {
        self.current = self.current.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_latest_ticket_is_current() {
        let mut generation = Generation::new();
        let first = generation.issue();
        let second = generation.issue();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
        generation.invalidate();
        assert!(!generation.is_current(second));
    }

    #[test]
    fn shared_ticket_survives_until_invalidated() {
        let mut generation = Generation::new();
        let round = generation.current();
        assert!(generation.is_current(round));
        assert_eq!(generation.current(), round);
        generation.invalidate();
        assert!(!generation.is_current(round));
        assert!(generation.is_current(generation.current()));
    }
}
