// src/package.rs

//! Concrete provider packages
//!
//! A provider is a package that can satisfy a bare capability name,
//! independent of version constraints. The evaluator's set algebra
//! (`with`/`without`) operates over ordered sequences of providers;
//! the order is significant because cost ties are broken by the first
//! provider seen.

use std::fmt;

/// A concrete package identified by name and epoch:version-release
///
/// Identity is full value equality; two packages with the same name and
/// EVR are the same provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Package {
    pub name: String,
    pub epoch: u64,
    pub version: String,
    pub release: String,
}

impl Package {
    /// Create a new package
    pub fn new(
        name: impl Into<String>,
        epoch: u64,
        version: impl Into<String>,
        release: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            epoch,
            version: version.into(),
            release: release.into(),
        }
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-", self.name)?;
        if self.epoch > 0 {
            write!(f, "{}:", self.epoch)?;
        }
        write!(f, "{}-{}", self.version, self.release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_display() {
        let pkg = Package::new("nginx", 0, "1.21.0", "2");
        assert_eq!(pkg.to_string(), "nginx-1.21.0-2");

        let epoch_pkg = Package::new("bind", 32, "9.18", "1");
        assert_eq!(epoch_pkg.to_string(), "bind-32:9.18-1");
    }

    #[test]
    fn test_package_identity() {
        let a = Package::new("a", 0, "1.0", "1");
        let b = Package::new("a", 0, "1.0", "1");
        let c = Package::new("a", 0, "1.1", "1");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
