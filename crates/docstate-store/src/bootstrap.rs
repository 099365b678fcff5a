//! Root creation and baseline security.

use docstate_types::keys::{KEY_ACP, KEY_READ_ACL, TYPE_ROOT};
use docstate_types::{Acp, DocId, State, Value};
use tracing::info;

use crate::error::{RepositoryError, Result};
use crate::table::StateTable;

/// The root state with its default policy and derived read ACL.
pub fn root_state(root_id: &DocId) -> State {
    let acp = Acp::root_default();
    let read_acl = Value::Array(acp.read_principals().into_iter().map(Value::String).collect());
    State::document(root_id, None, "", TYPE_ROOT)
        .with(KEY_ACP, acp.to_value())
        .with(KEY_READ_ACL, read_acl)
}

/// Build the root completely, then insert it in one step.
///
/// Any failure is reported as `Construction`; the table is left untouched
/// unless the insert itself succeeded.
pub(crate) fn bootstrap(table: &StateTable, root_id: &DocId) -> Result<()> {
    let root = root_state(root_id);
    let acp = Acp::from_state(&root)
        .map_err(|e| RepositoryError::Construction(format!("root policy unreadable: {e}")))?
        .ok_or_else(|| RepositoryError::Construction("root policy missing".into()))?;
    table
        .insert_new(root_id.clone(), root)
        .map_err(|e| RepositoryError::Construction(format!("inserting root {root_id}: {e}")))?;
    info!(
        root = %root_id,
        acls = acp.acls.len(),
        "root bootstrapped"
    );
    Ok(())
}
