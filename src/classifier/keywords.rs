//! Keyword override layer
//!
//! The fine-tuned model tends to read purchase requests that mention
//! technical products as technical support. Tickets with clear purchase
//! intent and no sign of a fault are routed to sales without consulting it.

/// Queue assigned when the sales override fires
pub const SALES_QUEUE: &str = "Sales and Pre-Sales";

/// Phrases signalling purchase intent
pub const SALES_KEYWORDS: &[&str] = &[
    "buy",
    "purchase",
    "order",
    "pricing",
    "price",
    "quote",
    "interested in buying",
    "would like to buy",
    "want to buy",
    "looking to purchase",
    "need to order",
    "how much does",
    "cost of",
    "available for sale",
    "in stock",
    "can i get",
    "interested in purchasing",
    "like to order",
    "place an order",
];

/// Phrases signalling something is broken
pub const PROBLEM_INDICATORS: &[&str] = &[
    "not working",
    "broken",
    "error",
    "issue",
    "problem",
    "failed",
    "crash",
    "bug",
    "fix",
    "help me fix",
    "stopped working",
    "doesn't work",
    "won't start",
    "can't access",
];

/// Result of scanning a ticket body for override phrases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordSignals {
    pub sales_intent: bool,
    pub problem: bool,
}

impl KeywordSignals {
    /// Scan `text` case-insensitively. Matching is by substring, so "order"
    /// also fires on "disorder".
    pub fn scan(text: &str) -> Self {
        let lowered = text.to_lowercase();
        Self {
            sales_intent: SALES_KEYWORDS.iter().any(|k| lowered.contains(k)),
            problem: PROBLEM_INDICATORS.iter().any(|k| lowered.contains(k)),
        }
    }

    pub fn is_sales_override(&self) -> bool {
        self.sales_intent && !self.problem
    }
}

/// Returns the overriding queue, if the keyword rule applies
pub fn keyword_override(text: &str) -> Option<&'static str> {
    KeywordSignals::scan(text)
        .is_sales_override()
        .then_some(SALES_QUEUE)
}
