//! Change notifications returned by mutating operations.

use serde::Serialize;

use crate::types::{ItemId, ReviewRecord};

/// What changed as a result of a mutating call.
///
/// Mutating operations return `Option<ProgressEvent>`; `None` means nothing
/// changed, so there is nothing to save or dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgressEvent {
    Seeded { added: Vec<ItemId> },
    Reviewed(ReviewRecord),
    PinChanged { item_id: ItemId, pinned: bool },
    SessionCompleted { streak: u32 },
}
