//! Access control entries, lists and policies.
//!
//! An [`Acp`] is an ordered list of named [`Acl`]s, each an ordered list of
//! [`Ace`]s. Evaluation walks ACLs then entries in order and the first entry
//! matching the principal and permission decides.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::keys::{KEY_ACE_GRANT, KEY_ACE_PERMISSION, KEY_ACE_PRINCIPAL, KEY_ACL, KEY_ACL_NAME, KEY_ACP};
use crate::state::State;
use crate::value::Value;

/// Permission implying every other permission.
pub const EVERYTHING: &str = "Everything";
pub const READ: &str = "Read";
pub const WRITE: &str = "Write";
pub const BROWSE: &str = "Browse";

/// Group of administrators.
pub const ADMINISTRATORS: &str = "administrators";
/// The built-in administrator principal.
pub const ADMINISTRATOR: &str = "Administrator";
/// Group of regular members.
pub const MEMBERS: &str = "members";
pub const EVERYONE: &str = "Everyone";

/// Name of the ACL holding entries set directly on a document.
pub const LOCAL_ACL: &str = "local";

/// Outcome of evaluating a permission against a policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Access {
    Grant,
    Deny,
    /// No entry matched.
    Unknown,
}

/// A single (principal, permission, grant) entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ace {
    pub principal: String,
    pub permission: String,
    pub granted: bool,
}

impl Ace {
    pub fn grant(principal: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            permission: permission.into(),
            granted: true,
        }
    }

    pub fn deny(principal: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            permission: permission.into(),
            granted: false,
        }
    }

    /// Whether this entry speaks about `permission` for `principal`.
    pub fn matches(&self, principal: &str, permission: &str) -> bool {
        self.principal == principal && (self.permission == permission || self.permission == EVERYTHING)
    }

    fn to_state(&self) -> State {
        State::new()
            .with(KEY_ACE_PRINCIPAL, self.principal.as_str())
            .with(KEY_ACE_PERMISSION, self.permission.as_str())
            .with(KEY_ACE_GRANT, self.granted)
    }

    fn from_state(state: &State) -> Result<Self, TypeError> {
        let field = |key: &str| {
            state.get_str(key).map(str::to_string).ok_or_else(|| TypeError::Malformed {
                key: key.to_string(),
                reason: "missing access control entry field".into(),
            })
        };
        Ok(Self {
            principal: field(KEY_ACE_PRINCIPAL)?,
            permission: field(KEY_ACE_PERMISSION)?,
            granted: state.get(KEY_ACE_GRANT).and_then(Value::as_bool).unwrap_or(false),
        })
    }
}

/// Named, ordered list of entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acl {
    pub name: String,
    pub entries: Vec<Ace>,
}

impl Acl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn with(mut self, ace: Ace) -> Self {
        self.entries.push(ace);
        self
    }

    /// First-match-wins evaluation.
    pub fn access(&self, principal: &str, permission: &str) -> Access {
        self.entries
            .iter()
            .find(|ace| ace.matches(principal, permission))
            .map_or(Access::Unknown, |ace| {
                if ace.granted {
                    Access::Grant
                } else {
                    Access::Deny
                }
            })
    }
}

/// Access control policy: ordered ACLs attached to a state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acp {
    pub acls: Vec<Acl>,
}

impl Acp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, acl: Acl) -> Self {
        self.acls.push(acl);
        self
    }

    /// Evaluate ACLs in order; the first one with an opinion decides.
    pub fn access(&self, principal: &str, permission: &str) -> Access {
        self.acls
            .iter()
            .map(|acl| acl.access(principal, permission))
            .find(|access| *access != Access::Unknown)
            .unwrap_or(Access::Unknown)
    }

    /// Principals granted read access, for the precomputed read-ACL field.
    pub fn read_principals(&self) -> BTreeSet<String> {
        self.acls
            .iter()
            .flat_map(|acl| acl.entries.iter())
            .map(|ace| ace.principal.as_str())
            .filter(|principal| self.access(principal, READ) == Access::Grant)
            .map(str::to_string)
            .collect()
    }

    /// Baseline policy of a freshly bootstrapped root.
    pub fn root_default() -> Self {
        Self::new().with(
            Acl::new(LOCAL_ACL)
                .with(Ace::grant(ADMINISTRATORS, EVERYTHING))
                .with(Ace::grant(ADMINISTRATOR, EVERYTHING))
                .with(Ace::grant(MEMBERS, READ)),
        )
    }

    /// Encode as the value stored under [`KEY_ACP`].
    pub fn to_value(&self) -> Value {
        let acls = self
            .acls
            .iter()
            .map(|acl| {
                State::new().with(KEY_ACL_NAME, acl.name.as_str()).with(
                    KEY_ACL,
                    acl.entries.iter().map(Ace::to_state).collect::<Vec<_>>(),
                )
            })
            .collect::<Vec<_>>();
        Value::StateList(acls)
    }

    pub fn from_value(value: &Value) -> Result<Self, TypeError> {
        let malformed = |reason: String| TypeError::Malformed {
            key: KEY_ACP.to_string(),
            reason,
        };
        let list = value
            .as_state_list()
            .ok_or_else(|| malformed(format!("expected state-list, got {}", value.kind_name())))?;
        let mut acp = Self::new();
        for acl_state in list {
            let name = acl_state.get_str(KEY_ACL_NAME).unwrap_or(LOCAL_ACL);
            let entries = match acl_state.get(KEY_ACL) {
                Some(Value::StateList(entries)) => entries
                    .iter()
                    .map(Ace::from_state)
                    .collect::<Result<Vec<_>, _>>()?,
                Some(other) => return Err(malformed(format!("acl entries of kind {}", other.kind_name()))),
                None => Vec::new(),
            };
            acp.acls.push(Acl {
                name: name.to_string(),
                entries,
            });
        }
        Ok(acp)
    }

    /// Read the policy attached to `state`, if any.
    pub fn from_state(state: &State) -> Result<Option<Self>, TypeError> {
        state.get(KEY_ACP).map(Self::from_value).transpose()
    }
}
