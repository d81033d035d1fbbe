//! # Service identity.
//!
//! [`ServiceKey`] is the unique `(name, version)` identity of a service.
//! It is value-equal, hashable, ordered, and never mutated after creation —
//! every map in the runtime (validated set, group index, state store) is
//! keyed by it.

use std::fmt;
use std::sync::Arc;

/// Unique identity of a service: `(name, version)`.
///
/// Both components are interned as `Arc<str>`, so cloning a key is cheap and
/// keys can be shared freely between groups, the state store, and events.
///
/// ## Example
/// ```rust
/// use fleetvisor::ServiceKey;
///
/// let key = ServiceKey::new("gateway", "1.2.0");
/// assert_eq!(key.name(), "gateway");
/// assert_eq!(key.to_string(), "gateway@1.2.0");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceKey {
    name: Arc<str>,
    version: Arc<str>,
}

impl ServiceKey {
    /// Creates a key from a name and version.
    pub fn new(name: impl Into<Arc<str>>, version: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Service name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Service version.
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceKey({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_value_equality() {
        let a = ServiceKey::new("api", "1.0");
        let b = ServiceKey::new("api", "1.0");
        let c = ServiceKey::new("api", "2.0");
        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
        assert!(!set.contains(&c));
    }

    #[test]
    fn test_display_format() {
        let key = ServiceKey::new("db", "3.1.4");
        assert_eq!(key.to_string(), "db@3.1.4");
    }

    #[test]
    fn test_ordering_by_name_then_version() {
        let mut keys = vec![
            ServiceKey::new("b", "1.0"),
            ServiceKey::new("a", "2.0"),
            ServiceKey::new("a", "1.0"),
        ];
        keys.sort();
        assert_eq!(keys[0], ServiceKey::new("a", "1.0"));
        assert_eq!(keys[1], ServiceKey::new("a", "2.0"));
        assert_eq!(keys[2], ServiceKey::new("b", "1.0"));
    }
}
