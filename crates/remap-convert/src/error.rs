use remap_mappings::MappingsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// The requested renames chain back onto themselves; nothing was applied.
    #[error("renames form a cycle through {}", .names.join(", "))]
    RenameCycle { names: Vec<String> },
    #[error("cannot rename `{from}` to `{to}`: the target is already mapped")]
    TargetOccupied { from: String, to: String },
    #[error(transparent)]
    Mappings(#[from] MappingsError),
    #[error("invalid class matches: {0}")]
    Json(#[from] serde_json::Error),
}
