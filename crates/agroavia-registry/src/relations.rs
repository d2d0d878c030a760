//! Foreign-key relations between collections
//!
//! | Child | Key | Parent |
//! |---|---|---|
//! | Field | `customerId` | Customer |
//! | Order | `customerId` | Customer |
//! | Order | `fieldId` | Field |
//! | Order | `operatorId` | Operator |
//!
//! Keys are not validated on write. What happens to children when a parent
//! is deleted is chosen per call with a [`DeletePolicy`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What to do with dependents when deleting a parent record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletePolicy {
    /// Refuse the delete while dependents exist
    Block,
    /// Delete only the parent; children keep a dangling key
    #[default]
    Orphan,
    /// Delete dependent fields and orders; unassign dependent orders of an operator
    Cascade,
}

impl fmt::Display for DeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Block => write!(f, "block"),
            Self::Orphan => write!(f, "orphan"),
            Self::Cascade => write!(f, "cascade"),
        }
    }
}

impl FromStr for DeletePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "block" => Ok(Self::Block),
            "orphan" => Ok(Self::Orphan),
            "cascade" => Ok(Self::Cascade),
            other => Err(format!("unknown delete policy '{other}'")),
        }
    }
}

/// Records that reference a parent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dependents {
    /// Ids of referencing fields
    pub fields: Vec<String>,
    /// Ids of referencing orders
    pub orders: Vec<String>,
}

impl Dependents {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.orders.is_empty()
    }

    pub fn total(&self) -> usize {
        self.fields.len() + self.orders.len()
    }

    /// Count summary for a confirmation prompt, e.g. `2 fields, 1 order`
    pub fn describe(&self) -> String {
        fn plural(n: usize, one: &str, many: &str) -> String {
            format!("{} {}", n, if n == 1 { one } else { many })
        }

        let mut parts = Vec::new();
        if !self.fields.is_empty() {
            parts.push(plural(self.fields.len(), "field", "fields"));
        }
        if !self.orders.is_empty() {
            parts.push(plural(self.orders.len(), "order", "orders"));
        }
        if parts.is_empty() {
            "no dependents".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Outcome of a delete
#[derive(Debug, Clone, PartialEq)]
pub struct Removal<T> {
    /// The deleted record
    pub record: T,
    /// Dependents found at delete time
    pub dependents: Dependents,
    /// Policy that was applied
    pub policy: DeletePolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let mut deps = Dependents::default();
        assert!(deps.is_empty());
        assert_eq!(deps.describe(), "no dependents");

        deps.fields = vec!["f1".into(), "f2".into()];
        deps.orders = vec!["o1".into()];
        assert_eq!(deps.total(), 3);
        assert_eq!(deps.describe(), "2 fields, 1 order");
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("Cascade".parse::<DeletePolicy>(), Ok(DeletePolicy::Cascade));
        assert_eq!(DeletePolicy::default(), DeletePolicy::Orphan);
        assert!("drop".parse::<DeletePolicy>().is_err());
    }
}
