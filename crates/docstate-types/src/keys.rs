//! Reserved field keys.
//!
//! System fields share the `sys:` prefix so they never collide with
//! application schema fields.

/// Prefix of every system key.
pub const KEY_PREFIX: &str = "sys:";

/// Unique, immutable identifier of the state.
pub const KEY_ID: &str = "sys:id";

/// Identifier of the parent state. Absent only on the root.
pub const KEY_PARENT_ID: &str = "sys:parentId";

/// Name, unique among siblings sharing a parent.
pub const KEY_NAME: &str = "sys:name";

/// Type tag (`Root` or an application type).
pub const KEY_TYPE: &str = "sys:type";

/// Access control policy: list of ACL states.
pub const KEY_ACP: &str = "sys:acp";

/// Principals allowed to read the state, precomputed for query filtering.
pub const KEY_READ_ACL: &str = "sys:readAcl";

/// Type tag of the root state.
pub const TYPE_ROOT: &str = "Root";

// Keys inside an ACP value.
pub const KEY_ACL_NAME: &str = "name";
pub const KEY_ACL: &str = "acl";
pub const KEY_ACE_PRINCIPAL: &str = "principal";
pub const KEY_ACE_PERMISSION: &str = "permission";
pub const KEY_ACE_GRANT: &str = "grant";

// Keys inside a blob reference value.
pub const KEY_BLOB_DIGEST: &str = "digest";
pub const KEY_BLOB_LENGTH: &str = "length";
pub const KEY_BLOB_NAME: &str = "name";
pub const KEY_BLOB_MIME_TYPE: &str = "mime-type";

/// Returns `true` for keys owned by the repository rather than a schema.
pub fn is_system_key(key: &str) -> bool {
    key.starts_with(KEY_PREFIX)
}
