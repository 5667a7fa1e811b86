//! Built-in sensitive-data pattern categories.
//!
//! Four rule categories ship with the pipeline: national identifiers
//! (SSN-shaped), email addresses, NANP phone numbers, and payment card
//! numbers. Each category pairs a compiled regex with a plausibility check
//! that weeds out shape-alike false positives, and can be toggled on or off
//! independently through [`RuleSet`].

pub mod email;
pub mod national_id;
pub mod payment_card;
pub mod phone;

pub use email::EmailMatcher;
pub use national_id::NationalIdMatcher;
pub use payment_card::PaymentCardMatcher;
pub use phone::PhoneMatcher;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Stable identifier for a built-in pattern category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    NationalId,
    Email,
    Phone,
    PaymentCard,
}

impl RuleKind {
    /// All built-in categories, in reporting order.
    pub fn all() -> [RuleKind; 4] {
        [
            RuleKind::NationalId,
            RuleKind::Email,
            RuleKind::Phone,
            RuleKind::PaymentCard,
        ]
    }

    /// Stable human-readable name, used in labels and reports.
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::NationalId => "identifier-9digit",
            RuleKind::Email => "email-address",
            RuleKind::Phone => "phone-number",
            RuleKind::PaymentCard => "payment-card",
        }
    }
}

/// Trait for pattern matching strategies.
pub trait PatternMatcher: Send + Sync {
    fn kind(&self) -> RuleKind;

    fn pattern(&self) -> &Regex;

    /// Secondary validation applied to each raw regex hit. Categories with
    /// structural rules beyond their regex (NANP digit classes, SSN area
    /// plausibility) reject shape-alike text here.
    fn is_plausible(&self, _matched: &str) -> bool {
        true
    }

    /// Byte ranges of every plausible match in `text`.
    fn find_spans(&self, text: &str) -> Vec<(usize, usize)> {
        self.pattern()
            .find_iter(text)
            .filter(|m| self.is_plausible(m.as_str()))
            .map(|m| (m.start(), m.end()))
            .collect()
    }
}

/// Returns the shared matcher for a category.
pub fn matcher(kind: RuleKind) -> &'static dyn PatternMatcher {
    match kind {
        RuleKind::NationalId => &NationalIdMatcher,
        RuleKind::Email => &EmailMatcher,
        RuleKind::Phone => &PhoneMatcher,
        RuleKind::PaymentCard => &PaymentCardMatcher,
    }
}

/// A toggleable set of pattern categories.
///
/// Disabling a category removes its matches from locator output and from all
/// downstream counting; the remaining categories are unaffected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    enabled: Vec<RuleKind>,
}

impl RuleSet {
    /// An empty set matching nothing.
    pub fn none() -> Self {
        Self {
            enabled: Vec::new(),
        }
    }

    /// Builds a set from an explicit list of categories.
    pub fn from_kinds(kinds: &[RuleKind]) -> Self {
        let mut set = Self::none();
        for kind in kinds {
            set.enable(*kind);
        }
        set
    }

    pub fn enable(&mut self, kind: RuleKind) {
        if !self.enabled.contains(&kind) {
            self.enabled.push(kind);
        }
    }

    pub fn disable(&mut self, kind: RuleKind) {
        self.enabled.retain(|k| *k != kind);
    }

    pub fn is_enabled(&self, kind: RuleKind) -> bool {
        self.enabled.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    /// Enabled categories in stable reporting order.
    pub fn enabled_kinds(&self) -> Vec<RuleKind> {
        RuleKind::all()
            .into_iter()
            .filter(|k| self.is_enabled(*k))
            .collect()
    }
}

impl Default for RuleSet {
    /// All four built-in categories enabled.
    fn default() -> Self {
        Self {
            enabled: RuleKind::all().to_vec(),
        }
    }
}
