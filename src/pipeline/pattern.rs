//! Attack pattern classification
//!
//! The correlation rule operates only on the most recently appended history
//! entry, and only once at least two events have been seen: the first event
//! ever received always classifies as NORMAL, whatever its content.
//! Substring matching is case-sensitive and checked in a fixed priority
//! order.

use std::fmt;

/// Named correlation outcome derived from event content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackPattern {
    /// Port scans and probing activity.
    Reconnaissance,
    /// Repeated login / SSH failures.
    BruteForce,
    /// Connection floods.
    PossibleDdos,
    /// Nothing suspicious correlated.
    Normal,
}

impl AttackPattern {
    /// Wire name used in alert payloads and the threat context lookup.
    pub fn as_protocol(&self) -> &'static str {
        match self {
            AttackPattern::Reconnaissance => "ATAQUE_RECONOCIMIENTO",
            AttackPattern::BruteForce => "ATAQUE_FUERZA_BRUTA",
            AttackPattern::PossibleDdos => "POSIBLE_DDOS",
            AttackPattern::Normal => "NORMAL",
        }
    }

    pub fn is_normal(&self) -> bool {
        matches!(self, AttackPattern::Normal)
    }
}

impl fmt::Display for AttackPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_protocol())
    }
}

/// Classify the latest entry of an event history.
pub fn classify_latest(history: &[String]) -> AttackPattern {
    if history.len() < 2 {
        return AttackPattern::Normal;
    }
    match history.last() {
        Some(latest) => classify_event(latest),
        None => AttackPattern::Normal,
    }
}

fn classify_event(event: &str) -> AttackPattern {
    if event.contains("puerto") || event.contains("escaneo") {
        AttackPattern::Reconnaissance
    } else if event.contains("login") || event.contains("SSH") {
        AttackPattern::BruteForce
    } else if event.contains("conexiones") {
        AttackPattern::PossibleDdos
    } else {
        AttackPattern::Normal
    }
}
