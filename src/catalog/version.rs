//! Parsed release identifiers and their total order

use crate::core::error::{RelgenError, RelgenResult};
use regex::Regex;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Pre-release marker, or its absence.
///
/// Variant order is the comparison table: at equal `MAJOR.MINOR.MICRO`,
/// `Dev(_) < Alpha(_) < ReleaseCandidate(_) < Final`, and two markers of the
/// same kind compare by their number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Qualifier {
  /// `.devN` snapshot
  Dev(u64),
  /// `aN` alpha
  Alpha(u64),
  /// `rcN` release candidate
  ReleaseCandidate(u64),
  /// No qualifier
  Final,
}

impl Qualifier {
  pub fn is_final(&self) -> bool {
    matches!(self, Qualifier::Final)
  }
}

impl fmt::Display for Qualifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Qualifier::Dev(n) => write!(f, ".dev{}", n),
      Qualifier::Alpha(n) => write!(f, "a{}", n),
      Qualifier::ReleaseCandidate(n) => write!(f, "rc{}", n),
      Qualifier::Final => Ok(()),
    }
  }
}

/// A release version such as `2.19.0rc2`.
///
/// Field order matters: the derived `Ord` compares the numeric triple first
/// and the qualifier last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
  pub major: u64,
  pub minor: u64,
  pub micro: u64,
  pub qualifier: Qualifier,
}

impl Version {
  /// A final release
  pub fn new(major: u64, minor: u64, micro: u64) -> Self {
    Self {
      major,
      minor,
      micro,
      qualifier: Qualifier::Final,
    }
  }

  pub fn with_qualifier(self, qualifier: Qualifier) -> Self {
    Self { qualifier, ..self }
  }

  pub fn is_final(&self) -> bool {
    self.qualifier.is_final()
  }
}

/// Total order over versions
pub fn compare_versions(a: &Version, b: &Version) -> Ordering {
  a.cmp(b)
}

impl fmt::Display for Version {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{}.{}{}", self.major, self.minor, self.micro, self.qualifier)
  }
}

impl Serialize for Version {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

/// Parses the un-prefixed form, e.g. `2.19.0.dev1`
impl FromStr for Version {
  type Err = RelgenError;

  fn from_str(s: &str) -> RelgenResult<Self> {
    parse_unprefixed(s).ok_or_else(|| RelgenError::malformed_tag(s))
  }
}

static VERSION: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"^(?P<major>[0-9]+)\.(?P<minor>[0-9]+)\.(?P<micro>[0-9]+)(?:\.dev(?P<dev>[0-9]+)|a(?P<alpha>[0-9]+)|rc(?P<rc>[0-9]+))?$",
  )
  .expect("version pattern is valid")
});

pub(crate) fn parse_unprefixed(s: &str) -> Option<Version> {
  let caps = VERSION.captures(s)?;
  // Digit runs only; a failed parse is a number past `u64`
  let number = |name: &str| caps.name(name).map(|m| m.as_str().parse::<u64>());

  let version = Version::new(
    number("major")?.ok()?,
    number("minor")?.ok()?,
    number("micro")?.ok()?,
  );
  let qualifier = if let Some(n) = number("dev") {
    Qualifier::Dev(n.ok()?)
  } else if let Some(n) = number("alpha") {
    Qualifier::Alpha(n.ok()?)
  } else if let Some(n) = number("rc") {
    Qualifier::ReleaseCandidate(n.ok()?)
  } else {
    Qualifier::Final
  };

  Some(version.with_qualifier(qualifier))
}
