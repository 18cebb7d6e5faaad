//! RPL rank arithmetic.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Rank step of one perfect hop; also the rank of the DAG root.
pub const MIN_HOP_RANK_INCREASE: u16 = 256;

/// 16-bit RPL rank.  Lower is closer to the root.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rank(pub u16);

impl Rank {
    pub const ROOT: Rank = Rank(MIN_HOP_RANK_INCREASE);
    /// Advertised by motes without a route.
    pub const INFINITE: Rank = Rank(u16::MAX);

    #[inline]
    pub fn is_infinite(self) -> bool {
        self == Self::INFINITE
    }

    /// Integer part of `rank / MIN_HOP_RANK_INCREASE`.
    #[inline]
    pub fn dag_rank(self) -> u16 {
        self.0 / MIN_HOP_RANK_INCREASE
    }

    /// Join metric carried in EBs: `DAGRank(rank) - 1`, so the root sends 0.
    #[inline]
    pub fn join_metric(self) -> u16 {
        self.dag_rank().saturating_sub(1)
    }

    /// `self + increase`, saturating at [`Rank::INFINITE`].
    #[inline]
    pub fn plus(self, increase: u16) -> Rank {
        Rank(self.0.saturating_add(increase))
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            f.write_str("rank∞")
        } else {
            write!(f, "rank{}", self.0)
        }
    }
}
