//! Human-shareable booking and ticket codes.
//!
//! Codes carry 36^6 (about 2.2e9) combinations of entropy, which makes
//! collisions rare but not impossible. Stores must still detect a clash and
//! draw again; [`allocate`] does that for callers that can test membership.

use rand::Rng;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Random characters in every code, after any prefix.
pub const CODE_LENGTH: usize = 6;

/// How many draws a store makes before giving up on a unique code.
pub const MAX_ATTEMPTS: usize = 8;

pub const TICKET_PREFIX: &str = "TKT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// `K7Q2ZD`
    Booking,
    /// `TKT9XW41B`
    Ticket,
}

impl ReferenceKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            ReferenceKind::Booking => "",
            ReferenceKind::Ticket => TICKET_PREFIX,
        }
    }

    pub fn generate(&self) -> String {
        generate(self.prefix())
    }

    pub fn is_well_formed(&self, candidate: &str) -> bool {
        match candidate.strip_prefix(self.prefix()) {
            Some(code) => {
                code.len() == CODE_LENGTH && code.bytes().all(|b| ALPHABET.contains(&b))
            }
            None => false,
        }
    }
}

/// Draws a fresh code: `prefix` followed by [`CODE_LENGTH`] characters
/// from `A-Z0-9`.
pub fn generate(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let mut code = String::with_capacity(prefix.len() + CODE_LENGTH);
    code.push_str(prefix);
    for _ in 0..CODE_LENGTH {
        let idx = rng.gen_range(0..ALPHABET.len());
        code.push(ALPHABET[idx] as char);
    }
    code
}

/// Draws codes until `taken` reports one as free, at most [`MAX_ATTEMPTS`] times.
pub fn allocate<F>(kind: ReferenceKind, mut taken: F) -> Option<String>
where
    F: FnMut(&str) -> bool,
{
    for attempt in 1..=MAX_ATTEMPTS {
        let candidate = kind.generate();
        if !taken(&candidate) {
            return Some(candidate);
        }
        tracing::warn!(attempt, "Reference collision on {}, drawing again", candidate);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_booking_codes_are_six_alphanumerics() {
        for _ in 0..100 {
            let code = ReferenceKind::Booking.generate();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
            assert!(ReferenceKind::Booking.is_well_formed(&code));
        }
    }

    #[test]
    fn test_ticket_codes_carry_prefix() {
        let code = ReferenceKind::Ticket.generate();
        assert!(code.starts_with("TKT"));
        assert_eq!(code.len(), 3 + CODE_LENGTH);
        assert!(ReferenceKind::Ticket.is_well_formed(&code));
        assert!(!ReferenceKind::Ticket.is_well_formed("TKT12"));
        assert!(!ReferenceKind::Ticket.is_well_formed("ABC123"));
    }

    #[test]
    fn test_ten_thousand_draws_do_not_collide() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(ReferenceKind::Booking.generate()));
        }
    }

    #[test]
    fn test_allocate_retries_past_taken_codes() {
        let mut calls = 0;
        let code = allocate(ReferenceKind::Booking, |_| {
            calls += 1;
            calls < 3
        });
        assert!(code.is_some());
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_allocate_gives_up_when_everything_is_taken() {
        assert!(allocate(ReferenceKind::Ticket, |_| true).is_none());
    }
}
