//! Token identifiers and protocol limits.

use serde::{Deserialize, Serialize};

/// Hard ceiling on the number of tokens any holder can receive through
/// succession transfers. Bounds the cost of a single succession execution
/// even when an adversary pre-filled the successor's holdings.
pub const MAX_INHERITED_TOKENS: usize = 8;

/// Identifier of one authority token. Ids start at 1 and are never reused.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TokenId(pub u64);

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl std::str::FromStr for TokenId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim_start_matches('#').parse().map(TokenId)
    }
}
