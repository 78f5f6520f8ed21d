//! Storage layer for chain state and account key files.
//!
//! # Directory layout
//!
//! By convention the default root is `~/.agentic/succession/`:
//!
//! ```text
//! ~/.agentic/succession/
//! ├── state.json
//! └── accounts/
//!     └── {name}.ask
//! ```
//!
//! # Modules
//!
//! - [`state_file`]: versioned JSON snapshot of the whole chain.
//! - [`key_file`]: `.ask` account keys sealed under a passphrase.

pub mod key_file;
pub mod state_file;

pub use key_file::{load_account, read_account_address, save_account, AskFile};
pub use state_file::{load_state, save_state, StateFile};

use std::path::Path;

use crate::error::Result;

/// Write `data` to `path` atomically using a sibling temporary file.
///
/// Creates the parent directory if it does not exist.
pub(crate) fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);
    std::fs::write(&tmp_path, data)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
