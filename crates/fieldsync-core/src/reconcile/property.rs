// ── Property reconciliation ──
//
// Device and channel properties share one code path; only the parent id
// type differs.

use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{ParentId, Property, PropertyId, PropertyRecord};
use crate::repository::{CreatePropertyRequest, Repository, UpdatePropertyRequest};

/// Create or redescribe a property. Either way the validity marker ends up
/// unknown. Observations naming a `protected` identifier, or targeting a
/// property that carries one, are left unapplied.
pub(super) fn upsert_property<P: ParentId>(
    repo: &dyn Repository<Property<P>>,
    record: &PropertyRecord<P>,
    protected: &[&str],
) -> Result<(), CoreError> {
    let existing = repo.get_by_id(record.id)?;

    let touches_reserved = std::iter::once(record.descriptor.identifier.as_str())
        .chain(existing.as_deref().map(|p| p.identifier.as_str()))
        .any(|identifier| protected.contains(&identifier));
    if touches_reserved {
        warn!(
            property = %record.id,
            parent = %record.parent,
            identifier = %record.descriptor.identifier,
            "refusing to describe reserved property"
        );
        return Ok(());
    }

    if let Some(existing) = existing {
        let property = repo.update(
            &existing,
            UpdatePropertyRequest::Describe(record.descriptor.clone()),
        )?;
        debug!(
            property = %property.id,
            parent = %property.parent,
            kind = P::ENTITY,
            identifier = %property.identifier,
            "property updated"
        );
        return Ok(());
    }

    let property = repo.create(CreatePropertyRequest {
        id: record.id,
        parent: record.parent,
        descriptor: record.descriptor.clone(),
        value: None,
    })?;
    debug!(
        property = %property.id,
        parent = %property.parent,
        kind = P::ENTITY,
        identifier = %property.identifier,
        "property created"
    );
    Ok(())
}

/// Delete a property if it exists. Properties whose identifier is listed
/// in `protected` are left in place.
pub(super) fn remove_property<P: ParentId>(
    repo: &dyn Repository<Property<P>>,
    id: PropertyId,
    protected: &[&str],
) -> Result<(), CoreError> {
    let Some(property) = repo.get_by_id(id)? else {
        debug!(property = %id, kind = P::ENTITY, "property already absent");
        return Ok(());
    };

    if protected.contains(&property.identifier.as_str()) {
        warn!(
            property = %id,
            parent = %property.parent,
            identifier = %property.identifier,
            "refusing to delete reserved property"
        );
        return Ok(());
    }

    repo.delete(&property)?;
    debug!(property = %id, parent = %property.parent, kind = P::ENTITY, "property deleted");
    Ok(())
}
