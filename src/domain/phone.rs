//! Phone number category.
//!
//! Matches North American Numbering Plan (NANP) formats:
//! - (555) 123-4567
//! - 555-123-4567
//! - 555.123.4567
//! - +1 555 123 4567

use super::{PatternMatcher, RuleKind};
use once_cell::sync::Lazy;
use regex::Regex;

/// NANP phone number matcher.
#[derive(Debug, Clone, Copy)]
pub struct PhoneMatcher;

static PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:\+?\s*1[-.\s]?)?\(?\s*([2-9]\d{2})\s*\)?[-.\s]?\s*([2-9]\d{2})[-.\s]?\s*(\d{4})\b",
    )
    .expect("valid phone number regex")
});

impl PhoneMatcher {
    /// Validates that a candidate follows NANP rules.
    ///
    /// - Area code: first digit 2-9
    /// - Exchange code: first digit 2-9
    /// - Subscriber number: any 4 digits
    pub fn validate(area: &str, exchange: &str, subscriber: &str) -> bool {
        area.len() == 3
            && exchange.len() == 3
            && subscriber.len() == 4
            && area
                .chars()
                .next()
                .is_some_and(|c| ('2'..='9').contains(&c))
            && exchange
                .chars()
                .next()
                .is_some_and(|c| ('2'..='9').contains(&c))
    }
}

impl PatternMatcher for PhoneMatcher {
    fn kind(&self) -> RuleKind {
        RuleKind::Phone
    }

    fn pattern(&self) -> &Regex {
        &PATTERN
    }

    fn is_plausible(&self, matched: &str) -> bool {
        // A NANP number carries exactly 10 digits, or 11 with the country
        // code prefix.
        let digit_count = matched.chars().filter(char::is_ascii_digit).count();
        if digit_count != 10 && digit_count != 11 {
            return false;
        }
        PATTERN.captures(matched).is_some_and(|caps| {
            match (caps.get(1), caps.get(2), caps.get(3)) {
                (Some(area), Some(exchange), Some(subscriber)) => {
                    Self::validate(area.as_str(), exchange.as_str(), subscriber.as_str())
                }
                _ => false,
            }
        })
    }
}
