//! Positional batch responses

use serde_json::{Value, json};

/// Acknowledgement for one accepted record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub receipt: String,
}

impl Accepted {
    pub fn new(receipt: impl Into<String>) -> Self {
        Self {
            receipt: receipt.into(),
        }
    }
}

/// Outcome of one record in a batched request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemResult<T> {
    Accepted(T),
    Rejected { code: String, message: String },
}

impl<T> ItemResult<T> {
    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            code: code.into(),
            message: message.into(),
        }
    }

    #[inline]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    #[inline]
    pub fn is_rejected(&self) -> bool {
        !self.is_accepted()
    }

    pub fn accepted(&self) -> Option<&T> {
        match self {
            Self::Accepted(value) => Some(value),
            Self::Rejected { .. } => None,
        }
    }
}

impl ItemResult<Accepted> {
    /// JSON form attached to UoWs as the write result
    pub fn to_json(&self) -> Value {
        match self {
            Self::Accepted(accepted) => json!({
                "status": "accepted",
                "receipt": accepted.receipt,
            }),
            Self::Rejected { code, message } => json!({
                "status": "rejected",
                "code": code,
                "message": message,
            }),
        }
    }
}

/// Response to a batched request
///
/// Item `i` is the outcome of request record `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResponse<T> {
    pub items: Vec<ItemResult<T>>,
}

impl<T> BatchResponse<T> {
    pub fn new(items: Vec<ItemResult<T>>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of rejected items
    pub fn failed_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_rejected()).count()
    }

    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ItemResult<T>> {
        self.items.iter()
    }
}

impl<T> FromIterator<ItemResult<T>> for BatchResponse<T> {
    fn from_iter<I: IntoIterator<Item = ItemResult<T>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
