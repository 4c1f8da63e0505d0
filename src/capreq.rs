// src/capreq.rs

//! Capability requirements with optional version constraints
//!
//! A requirement names a single capability (a package name, a virtual
//! provide like `python3dist(requests)`, or a file path) and optionally
//! constrains the version that satisfies it with a relation and an
//! epoch:version-release (EVR) triple.
//!
//! Examples:
//! - `webserver` - any version satisfies
//! - `libfoo >= 1:2.3-4` - version 2.3-4 with epoch 1 or newer

use semver::Version;
use std::cmp::Ordering;
use std::fmt;

use crate::package::Package;

/// Version relation flags
///
/// Any combination of `<`, `=`, `>` is representable; an empty combination
/// means "any version satisfies the name".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Relation {
    /// Less-than flag (`<`)
    pub lt: bool,
    /// Equality flag (`=`)
    pub eq: bool,
    /// Greater-than flag (`>`)
    pub gt: bool,
}

impl Relation {
    /// No flags set: any version satisfies
    pub const ANY: Relation = Relation {
        lt: false,
        eq: false,
        gt: false,
    };

    /// Exact equality (`=`), used for pinning to a concrete package
    pub const EQUAL: Relation = Relation {
        lt: false,
        eq: true,
        gt: false,
    };

    /// True when no relation flag is set
    pub fn is_any(&self) -> bool {
        !(self.lt || self.eq || self.gt)
    }

    /// Set the flag for a relation character, returning false for
    /// non-relation characters
    pub fn set(&mut self, c: char) -> bool {
        match c {
            '<' => self.lt = true,
            '=' => self.eq = true,
            '>' => self.gt = true,
            _ => return false,
        }
        true
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.lt {
            write!(f, "<")?;
        }
        if self.gt {
            write!(f, ">")?;
        }
        if self.eq {
            write!(f, "=")?;
        }
        Ok(())
    }
}

/// An epoch:version-release triple
///
/// Format: `[epoch:]version[-release]`. The epoch and release are optional;
/// an absent epoch compares as 0.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Evr {
    pub epoch: Option<u64>,
    pub version: String,
    pub release: Option<String>,
}

impl Evr {
    /// Parse an EVR token
    ///
    /// Lenient by design: the expression grammar accepts any token in EVR
    /// position, so a prefix that is not a valid epoch simply stays part of
    /// the version string.
    pub fn parse(s: &str) -> Self {
        let (epoch, rest) = match s.split_once(':') {
            Some((e, rest)) if !e.is_empty() && e.bytes().all(|b| b.is_ascii_digit()) => {
                match e.parse::<u64>() {
                    Ok(n) => (Some(n), rest),
                    Err(_) => (None, s),
                }
            }
            _ => (None, s),
        };

        let (version, release) = match rest.split_once('-') {
            Some((v, r)) => (v.to_string(), Some(r.to_string())),
            None => (rest.to_string(), None),
        };

        Self {
            epoch,
            version,
            release,
        }
    }

    /// Convert the version component to a semver::Version for comparison
    ///
    /// Package versions may not be semver-compliant, so we normalize:
    /// - If the version parses as semver, use it directly
    /// - Otherwise, extract major.minor.patch from the dotted components
    fn to_semver(&self) -> Version {
        if let Ok(v) = Version::parse(&self.version) {
            return v;
        }

        let parts: Vec<&str> = self.version.split('.').collect();
        let major = parts.first().and_then(|s| s.parse::<u64>().ok()).unwrap_or(0);
        let minor = parts.get(1).and_then(|s| s.parse::<u64>().ok()).unwrap_or(0);
        let patch = parts.get(2).and_then(|s| s.parse::<u64>().ok()).unwrap_or(0);

        Version::new(major, minor, patch)
    }

    /// Compare two EVRs: epoch first, then version, then release
    pub fn compare(&self, other: &Evr) -> Ordering {
        match self.epoch.unwrap_or(0).cmp(&other.epoch.unwrap_or(0)) {
            Ordering::Equal => {}
            ord => return ord,
        }

        match self.to_semver().cmp(&other.to_semver()) {
            Ordering::Equal => {}
            ord => return ord,
        }

        self.release.cmp(&other.release)
    }
}

impl fmt::Display for Evr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(epoch) = self.epoch {
            write!(f, "{}:", epoch)?;
        }
        write!(f, "{}", self.version)?;
        if let Some(ref release) = self.release {
            write!(f, "-{}", release)?;
        }
        Ok(())
    }
}

impl Ord for Evr {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl PartialOrd for Evr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A version constraint attached to a requirement: relation plus EVR
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constraint {
    pub relation: Relation,
    pub evr: Evr,
}

/// A named capability requirement, optionally version-constrained
///
/// The atomic unit the expression language reasons about.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Requirement {
    /// Capability name
    pub name: String,
    /// Optional version constraint; None means any version satisfies
    pub constraint: Option<Constraint>,
}

impl Requirement {
    /// Create an unversioned requirement
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: None,
        }
    }

    /// Create a version-constrained requirement
    pub fn versioned(name: impl Into<String>, relation: Relation, evr: Evr) -> Self {
        Self {
            name: name.into(),
            constraint: Some(Constraint { relation, evr }),
        }
    }

    /// Create a requirement exactly pinned to a concrete package
    ///
    /// An epoch of 0 is omitted from the pin, matching how packages render
    /// their own identity.
    pub fn pinned(pkg: &Package) -> Self {
        let evr = Evr {
            epoch: if pkg.epoch > 0 { Some(pkg.epoch) } else { None },
            version: pkg.version.clone(),
            release: Some(pkg.release.clone()),
        };
        Self::versioned(pkg.name.clone(), Relation::EQUAL, evr)
    }

    /// True when the requirement carries a version constraint
    pub fn is_versioned(&self) -> bool {
        self.constraint.is_some()
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(ref c) = self.constraint {
            write!(f, " {} {}", c.relation, c.evr)?;
        }
        Ok(())
    }
}
