//! Security identities: the principals and roles that grants are keyed by.
//!
//! A [`SecurityIdentity`] is never stored on its own. Its canonical string
//! form, `"{kind}:{name}"`, is the partition key of every access policy, which
//! is what makes reads scoped to one identity strongly consistent.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Principal class of a security identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IdentityKind {
    /// An individual user (principal).
    User,
    /// A role or granted authority.
    Role,
}

impl IdentityKind {
    /// Canonical upper-case tag used in the partition key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Role => "ROLE",
        }
    }
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdentityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "USER" => Ok(Self::User),
            "ROLE" => Ok(Self::Role),
            other => Err(Error::invalid_argument(format!(
                "unknown security identity kind '{other}' (expected USER or ROLE)"
            ))),
        }
    }
}

/// Immutable value identifying a user or role.
///
/// Equality and hashing follow the canonical string: two identities are equal
/// iff their `"{kind}:{name}"` forms are equal. The kind tag never contains a
/// colon, so the mapping is injective and deriving on the fields is enough.
///
/// # Examples
///
/// ```
/// use custos_core::SecurityIdentity;
///
/// let alice = SecurityIdentity::user("alice").unwrap();
/// assert_eq!(alice.to_string(), "USER:alice");
///
/// let parsed: SecurityIdentity = "USER:alice".parse().unwrap();
/// assert_eq!(parsed, alice);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecurityIdentity {
    kind: IdentityKind,
    name: String,
}

impl SecurityIdentity {
    /// Creates an identity, rejecting empty or whitespace-only names.
    pub fn new(kind: IdentityKind, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::invalid_argument(format!(
                "{kind} identity name must not be empty"
            )));
        }
        Ok(Self { kind, name })
    }

    /// Creates a user identity.
    pub fn user(name: impl Into<String>) -> Result<Self> {
        Self::new(IdentityKind::User, name)
    }

    /// Creates a role identity.
    pub fn role(name: impl Into<String>) -> Result<Self> {
        Self::new(IdentityKind::Role, name)
    }

    /// Parses the canonical `"{kind}:{name}"` form.
    ///
    /// Splits on the first colon only, so names may themselves contain
    /// colons.
    pub fn parse(canonical: &str) -> Result<Self> {
        let (kind, name) = canonical.split_once(':').ok_or_else(|| {
            Error::invalid_argument(format!(
                "malformed security identity '{canonical}' (expected KIND:name)"
            ))
        })?;
        Self::new(kind.parse()?, name)
    }

    /// Principal class.
    pub fn kind(&self) -> IdentityKind {
        self.kind
    }

    /// Principal or role name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical string form used as the store partition key.
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SecurityIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

impl FromStr for SecurityIdentity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SecurityIdentity {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<SecurityIdentity> for String {
    fn from(identity: SecurityIdentity) -> Self {
        identity.to_string()
    }
}

/// Renders a list of identities as a comma separated string for messages.
pub fn display_identities(identities: &[SecurityIdentity]) -> String {
    identities
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
