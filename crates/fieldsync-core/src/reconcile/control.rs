// ── Control-set convergence ──

use indexmap::IndexSet;
use tracing::debug;

use crate::error::CoreError;
use crate::model::{Control, ParentId};
use crate::repository::{CreateControlRequest, Repository};

/// Make the persisted controls of `parent` equal to the observed name set.
///
/// Controls whose name disappeared are deleted, new names are created in
/// observation order, and surviving names keep their identity. Duplicate
/// names count once.
pub(super) fn reconcile_controls<P: ParentId>(
    repo: &dyn Repository<Control<P>>,
    parent: P,
    observed: &[String],
) -> Result<(), CoreError> {
    let wanted: IndexSet<&str> = observed.iter().map(String::as_str).collect();
    let existing = repo.get_all_by_parent(parent)?;

    for control in &existing {
        if !wanted.contains(control.name.as_str()) {
            repo.delete(control)?;
            debug!(parent = %parent, kind = P::ENTITY, control = %control.name, "control deleted");
        }
    }

    for name in wanted {
        if existing.iter().any(|c| c.name == name) {
            continue;
        }
        repo.create(CreateControlRequest {
            parent,
            name: name.to_owned(),
        })?;
        debug!(parent = %parent, kind = P::ENTITY, control = name, "control created");
    }

    Ok(())
}
