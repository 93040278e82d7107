//! Domain object references.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value-type reference to a domain object: `(object_type, object_id)`.
///
/// One ACL corresponds to exactly one `ObjectKey`. Equality is structural, so
/// keys built independently from the same pair compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKey {
    /// Domain type name, e.g. `"Report"`.
    pub object_type: String,
    /// Identifier within the type.
    pub object_id: i64,
}

impl ObjectKey {
    /// Creates a new object key.
    pub fn new(object_type: impl Into<String>, object_id: i64) -> Self {
        Self {
            object_type: object_type.into(),
            object_id,
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.object_type, self.object_id)
    }
}
