//! Index to queue-label decoding
//!
//! Mirrors a fitted scikit-learn `LabelEncoder`: classes are held in sorted
//! order and the model's output index `i` decodes to the `i`-th class.

use super::ClassifierError;
use serde::{Deserialize, Serialize};

/// The ten queues the bundled model was fine-tuned on
pub const DEFAULT_QUEUE_LABELS: &[&str] = &[
    "Billing and Payments",
    "Customer Service",
    "General Inquiry",
    "Human Resources",
    "IT Support",
    "Product Support",
    "Returns and Exchanges",
    "Sales and Pre-Sales",
    "Service Outages and Maintenance",
    "Technical Support",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Build an encoder from class names; they are sorted and de-duplicated
    /// the way `LabelEncoder.fit` would store them.
    pub fn fit<I, S>(classes: I) -> Result<Self, ClassifierError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        classes.sort();
        classes.dedup();

        if classes.is_empty() {
            return Err(ClassifierError::EmptyLabelSet);
        }

        Ok(Self { classes })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn inverse_transform(&self, index: usize) -> Result<&str, ClassifierError> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or(ClassifierError::IndexOutOfRange {
                index,
                classes: self.classes.len(),
            })
    }

    /// Decode the argmax of a logits vector. NaN entries never win.
    pub fn decode_logits(&self, logits: &[f32]) -> Result<&str, ClassifierError> {
        let index = argmax(logits).ok_or(ClassifierError::EmptyLogits)?;
        self.inverse_transform(index)
    }
}

impl Default for LabelEncoder {
    fn default() -> Self {
        Self {
            classes: DEFAULT_QUEUE_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// First index of the maximum finite-or-infinite value, skipping NaN
fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}
