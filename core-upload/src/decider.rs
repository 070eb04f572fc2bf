//! Reconciliation decision
//!
//! Pure function from (local fingerprint, same-named remote objects,
//! overwrite flag) to exactly one [`ReconciliationDecision`]. Rules are
//! evaluated in order:
//!
//! 1. Any match whose known checksum equals the local fingerprint is skipped.
//! 2. A single match with overwrite enabled is updated in place.
//! 3. Several matches with overwrite enabled are purged, then recreated.
//! 4. With overwrite disabled, the first match in provider order is kept.
//! 5. No match means a new object is created.

use bridge_traits::storage::RemoteObject;

use crate::types::ReconciliationDecision;

pub fn decide(
    local_fingerprint: Option<&str>,
    matches: &[RemoteObject],
    overwrite: bool,
) -> ReconciliationDecision {
    let local = local_fingerprint.filter(|fp| !fp.is_empty());

    if let Some(local) = local {
        let identical = matches.iter().find(|object| {
            object
                .md5_checksum
                .as_deref()
                .is_some_and(|remote| !remote.is_empty() && remote.eq_ignore_ascii_case(local))
        });
        if let Some(object) = identical {
            return ReconciliationDecision::Skip {
                existing_id: object.id.clone(),
            };
        }
    }

    match (matches, overwrite) {
        ([], _) => ReconciliationDecision::CreateNew,
        ([only], true) => ReconciliationDecision::UpdateInPlace {
            target_id: only.id.clone(),
        },
        (all, true) => ReconciliationDecision::PurgeDuplicatesAndCreate {
            ids_to_delete: all.iter().map(|object| object.id.clone()).collect(),
        },
        ([first, ..], false) => ReconciliationDecision::Skip {
            existing_id: first.id.clone(),
        },
    }
}
