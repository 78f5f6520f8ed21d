//! Chain state snapshot file.
//!
//! File format (JSON):
//! ```json
//! { "version": 1, "state": { ... ChainState ... } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chain::ChainState;
use crate::error::{Result, SuccessionError};

use super::write_atomic;

const STATE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct StateFile {
    pub version: u32,
    pub state: ChainState,
}

/// Write `state` to `path`, replacing any previous snapshot atomically.
pub fn save_state(state: &ChainState, path: &Path) -> Result<()> {
    let file = StateFile {
        version: STATE_VERSION,
        state: state.clone(),
    };
    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| SuccessionError::SerializationError(e.to_string()))?;
    write_atomic(path, json.as_bytes())
}

/// Read a snapshot written by [`save_state`].
pub fn load_state(path: &Path) -> Result<ChainState> {
    let bytes = std::fs::read(path)?;
    let file: StateFile = serde_json::from_slice(&bytes)
        .map_err(|e| SuccessionError::InvalidFileFormat(format!("failed to parse state file: {e}")))?;
    if file.version != STATE_VERSION {
        return Err(SuccessionError::InvalidFileFormat(format!(
            "unsupported state file version={}",
            file.version
        )));
    }
    Ok(file.state)
}
