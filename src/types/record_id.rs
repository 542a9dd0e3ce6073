//! Record identifiers
//!
//! Datasets identify sales and customers with either JSON integers or strings, sometimes both in
//! the same file. The two forms are kept distinct: `42` and `"42"` are different identifiers.

use serde::Deserialize;

/// Identifier of a sale or customer record.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq)]
#[serde(untagged)]
pub enum RecordId {
    /// Integer identifier
    Number(i64),
    /// String identifier
    Text(String),
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}
