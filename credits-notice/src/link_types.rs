//! MusicBrainz relationship link types for copyright statements
//!
//! Only label targets are known so far: releases take every statement type,
//! recordings only the phonographic copyright.

use crate::notice::{LicenseDirection, StatementType};

/// `release` → `label`: copyrighted by
pub const RELEASE_LABEL_COPYRIGHT: u32 = 708;
/// `release` → `label`: phonographic copyright by
pub const RELEASE_LABEL_PHONOGRAPHIC: u32 = 711;
/// `release` → `label`: licensed from
pub const RELEASE_LABEL_LICENSED_FROM: u32 = 712;
/// `release` → `label`: licensed to
pub const RELEASE_LABEL_LICENSED_TO: u32 = 833;
/// `release` → `label`: distributed by
pub const RELEASE_LABEL_DISTRIBUTED: u32 = 361;
/// `release` → `label`: marketed by
pub const RELEASE_LABEL_MARKETED: u32 = 848;
/// `recording` → `label`: phonographic copyright by
pub const RECORDING_LABEL_PHONOGRAPHIC: u32 = 867;

/// Link type id for a statement between a source and a target entity type
///
/// `None` if the combination has no known link type, including `licensed`
/// statements without a direction.
pub fn link_type_id(
    source_type: &str,
    target_type: &str,
    statement_type: &StatementType,
    direction: Option<LicenseDirection>,
) -> Option<u32> {
    match (source_type, target_type) {
        ("release", "label") => match statement_type {
            StatementType::Copyright => Some(RELEASE_LABEL_COPYRIGHT),
            StatementType::Phonographic => Some(RELEASE_LABEL_PHONOGRAPHIC),
            StatementType::Licensed => match direction? {
                LicenseDirection::From => Some(RELEASE_LABEL_LICENSED_FROM),
                LicenseDirection::To => Some(RELEASE_LABEL_LICENSED_TO),
            },
            StatementType::DistributedBy => Some(RELEASE_LABEL_DISTRIBUTED),
            StatementType::MarketedBy => Some(RELEASE_LABEL_MARKETED),
            StatementType::Other(_) => None,
        },
        ("recording", "label") => match statement_type {
            StatementType::Phonographic => Some(RECORDING_LABEL_PHONOGRAPHIC),
            _ => None,
        },
        _ => None,
    }
}

/// Whether a relationship from `source_type` to `target_type` is stored
/// with swapped entities
///
/// MusicBrainz orders the two entities of a relationship by type name.
pub fn is_backward(source_type: &str, target_type: &str) -> bool {
    source_type > target_type
}
