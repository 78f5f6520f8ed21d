//! Owned-token set with O(1) membership test and O(1) removal.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SuccessionError};

use super::types::TokenId;

/// The token ids one holder currently owns.
///
/// Backed by a vector plus a position index; removal swaps the last element
/// into the hole. Serialized as the plain id list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<TokenId>", into = "Vec<TokenId>")]
pub struct OwnedTokenSet {
    ids: Vec<TokenId>,
    index: HashMap<TokenId, usize>,
}

impl OwnedTokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: TokenId) -> bool {
        self.index.contains_key(&id)
    }

    /// Insert `id`. Returns false if it was already present.
    pub fn insert(&mut self, id: TokenId) -> bool {
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id, self.ids.len());
        self.ids.push(id);
        true
    }

    /// Remove `id`, failing loudly if it is not a member.
    pub fn remove(&mut self, id: TokenId) -> Result<()> {
        let pos = self
            .index
            .remove(&id)
            .ok_or(SuccessionError::TokenNotFound(id))?;
        self.ids.swap_remove(pos);
        if let Some(moved) = self.ids.get(pos) {
            self.index.insert(*moved, pos);
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = TokenId> + '_ {
        self.ids.iter().copied()
    }

    pub fn as_slice(&self) -> &[TokenId] {
        &self.ids
    }
}

impl From<Vec<TokenId>> for OwnedTokenSet {
    fn from(ids: Vec<TokenId>) -> Self {
        let mut set = Self::new();
        for id in ids {
            set.insert(id);
        }
        set
    }
}

impl From<OwnedTokenSet> for Vec<TokenId> {
    fn from(set: OwnedTokenSet) -> Self {
        set.ids
    }
}
