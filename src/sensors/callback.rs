//! Scripting-side callback targets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A scripting object and method that receives sensor readings.
///
/// Targets have value semantics: two targets naming the same object and
/// method are the same target, so a listener's callback set never notifies
/// one target twice for a single event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallbackTarget {
    object: String,
    method: String,
}

impl CallbackTarget {
    /// Create a target for `object.method`.
    pub fn new(object: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            method: method.into(),
        }
    }

    /// Build a target from optional host arguments.
    ///
    /// Returns `None` unless both names are present and non-empty.
    pub fn from_host(object: Option<&str>, method: Option<&str>) -> Option<Self> {
        match (object, method) {
            (Some(o), Some(m)) if !o.is_empty() && !m.is_empty() => Some(Self::new(o, m)),
            _ => None,
        }
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    pub fn method(&self) -> &str {
        &self.method
    }
}

impl fmt::Display for CallbackTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.object, self.method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equal_targets_collapse_in_set() {
        let mut set = HashSet::new();
        assert!(set.insert(CallbackTarget::new("Player", "OnGyro")));
        assert!(!set.insert(CallbackTarget::new("Player", "OnGyro")));
        assert!(set.insert(CallbackTarget::new("Player", "OnAccel")));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_split_point_matters() {
        // Same concatenation, different targets
        let a = CallbackTarget::new("Play", "erOnGyro");
        let b = CallbackTarget::new("Player", "OnGyro");
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_host_requires_both_names() {
        assert_eq!(
            CallbackTarget::from_host(Some("Player"), Some("OnGyro")),
            Some(CallbackTarget::new("Player", "OnGyro"))
        );
        assert_eq!(CallbackTarget::from_host(Some("Player"), None), None);
        assert_eq!(CallbackTarget::from_host(None, Some("OnGyro")), None);
        assert_eq!(CallbackTarget::from_host(Some(""), Some("OnGyro")), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            CallbackTarget::new("Player", "OnGyro").to_string(),
            "Player.OnGyro"
        );
    }
}
