//! National identifier category (SSN-shaped, `DDD-DD-DDDD`).

use super::{PatternMatcher, RuleKind};
use once_cell::sync::Lazy;
use regex::Regex;

/// Nine-digit national identifier matcher with optional separators.
#[derive(Debug, Clone, Copy)]
pub struct NationalIdMatcher;

static PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{3})[-.\s]?(\d{2})[-.\s]?(\d{4})\b").expect("valid national id regex")
});

impl NationalIdMatcher {
    /// Area/group/serial plausibility per the SSA allocation rules: area
    /// 000, 666 and 900-999 are never issued, group 00 and serial 0000 are
    /// invalid.
    pub fn validate(area: &str, group: &str, serial: &str) -> bool {
        let area_num: u32 = match area.parse() {
            Ok(n) => n,
            Err(_) => return false,
        };
        area_num != 0
            && area_num != 666
            && area_num < 900
            && group != "00"
            && serial != "0000"
    }
}

impl PatternMatcher for NationalIdMatcher {
    fn kind(&self) -> RuleKind {
        RuleKind::NationalId
    }

    fn pattern(&self) -> &Regex {
        &PATTERN
    }

    fn is_plausible(&self, matched: &str) -> bool {
        PATTERN.captures(matched).is_some_and(|caps| {
            match (caps.get(1), caps.get(2), caps.get(3)) {
                (Some(area), Some(group), Some(serial)) => {
                    Self::validate(area.as_str(), group.as_str(), serial.as_str())
                }
                _ => false,
            }
        })
    }
}
