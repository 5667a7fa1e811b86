//! Payment card category (four groups of four digits).

use super::{PatternMatcher, RuleKind};
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy)]
pub struct PaymentCardMatcher;

static PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b").expect("valid payment card regex")
});

impl PatternMatcher for PaymentCardMatcher {
    fn kind(&self) -> RuleKind {
        RuleKind::PaymentCard
    }

    fn pattern(&self) -> &Regex {
        &PATTERN
    }

    fn is_plausible(&self, matched: &str) -> bool {
        // Exactly 16 digits once separators are stripped. No checksum: a
        // shape hit that fails Luhn is still worth destroying, a real number
        // that slips through is not.
        matched.chars().filter(|c| c.is_ascii_digit()).count() == 16
    }
}
