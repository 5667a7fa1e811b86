//! Email address category (conventional `local@domain.tld` shape).

use super::{PatternMatcher, RuleKind};
use once_cell::sync::Lazy;
use regex::Regex;

#[derive(Debug, Clone, Copy)]
pub struct EmailMatcher;

static PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid email regex")
});

impl PatternMatcher for EmailMatcher {
    fn kind(&self) -> RuleKind {
        RuleKind::Email
    }

    fn pattern(&self) -> &Regex {
        &PATTERN
    }
}
