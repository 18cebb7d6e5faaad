//! Application-traffic topology.
//!
//! A topology is built once at run start and answers one question: which
//! motes does mote `m` send application packets to?  It never touches the
//! connectivity matrix.
//!
//! | Strategy      | Peers of mote `i`                                     |
//! |---------------|-------------------------------------------------------|
//! | `RANDOM`      | one uniformly chosen mote `≠ i`                       |
//! | `FULL_MESH`   | every other mote                                      |
//! | `BINARY_TREE` | tree parent `(i-1)/2` and children `2i+1`, `2i+2`     |
//!
//! `LINE`, `LATTICE` and `MIN_DISTANCE` are recognised names without a
//! builder; selecting them is a configuration error.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use ts_core::{MoteId, SimRng};

use crate::{NetError, NetResult};

/// Closed set of topology strategy names.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TopologyKind {
    Random,
    FullMesh,
    BinaryTree,
    Line,
    Lattice,
    MinDistance,
}

impl TopologyKind {
    pub fn name(self) -> &'static str {
        match self {
            TopologyKind::Random => "RANDOM",
            TopologyKind::FullMesh => "FULL_MESH",
            TopologyKind::BinaryTree => "BINARY_TREE",
            TopologyKind::Line => "LINE",
            TopologyKind::Lattice => "LATTICE",
            TopologyKind::MinDistance => "MIN_DISTANCE",
        }
    }

    pub fn is_supported(self) -> bool {
        matches!(self, TopologyKind::Random | TopologyKind::FullMesh | TopologyKind::BinaryTree)
    }

    /// Parse and require a strategy that has a builder.
    pub fn parse_supported(name: &str) -> NetResult<Self> {
        let kind: TopologyKind = name.parse()?;
        if kind.is_supported() {
            Ok(kind)
        } else {
            Err(NetError::UnsupportedTopology(kind.name()))
        }
    }
}

impl FromStr for TopologyKind {
    type Err = NetError;

    fn from_str(s: &str) -> NetResult<Self> {
        Ok(match s {
            "RANDOM" => TopologyKind::Random,
            "FULL_MESH" => TopologyKind::FullMesh,
            "BINARY_TREE" => TopologyKind::BinaryTree,
            "LINE" => TopologyKind::Line,
            "LATTICE" => TopologyKind::Lattice,
            "MIN_DISTANCE" => TopologyKind::MinDistance,
            other => return Err(NetError::UnknownTopology(other.to_owned())),
        })
    }
}

impl fmt::Display for TopologyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Topology ──────────────────────────────────────────────────────────────────

/// Traffic pairing among the motes of one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Topology {
    kind:        TopologyKind,
    /// Peers of each mote, ascending.  Indexed by `MoteId`.
    peers:       Vec<Vec<MoteId>>,
    /// Tree parent edge per mote (`BINARY_TREE` only).
    tree_parent: Vec<Option<MoteId>>,
}

impl Topology {
    /// Build the pairing for `num_motes` motes.
    ///
    /// `rng` is consumed only by `RANDOM`.
    pub fn create(kind: TopologyKind, num_motes: u32, rng: &mut SimRng) -> NetResult<Topology> {
        let n = num_motes as usize;
        let mut peers: Vec<Vec<MoteId>> = vec![Vec::new(); n];
        let mut tree_parent: Vec<Option<MoteId>> = vec![None; n];

        match kind {
            TopologyKind::Random => {
                if n >= 2 {
                    for (i, list) in peers.iter_mut().enumerate() {
                        // Draw among the n-1 other motes, skipping over `i`.
                        let mut j = rng.gen_range(0..n - 1);
                        if j >= i {
                            j += 1;
                        }
                        list.push(MoteId(j as u32));
                    }
                }
            }
            TopologyKind::FullMesh => {
                for (i, list) in peers.iter_mut().enumerate() {
                    list.extend((0..num_motes).filter(|&j| j as usize != i).map(MoteId));
                }
            }
            TopologyKind::BinaryTree => {
                for i in 0..n / 2 {
                    for child in [2 * i + 1, 2 * i + 2] {
                        if child < n {
                            peers[i].push(MoteId(child as u32));
                            peers[child].push(MoteId(i as u32));
                            tree_parent[child] = Some(MoteId(i as u32));
                        }
                    }
                }
                for list in &mut peers {
                    list.sort_unstable();
                }
            }
            TopologyKind::Line | TopologyKind::Lattice | TopologyKind::MinDistance => {
                return Err(NetError::UnsupportedTopology(kind.name()));
            }
        }

        Ok(Topology { kind, peers, tree_parent })
    }

    /// A topology with no motes, left behind by run teardown.
    pub fn empty(kind: TopologyKind) -> Topology {
        Topology { kind, peers: Vec::new(), tree_parent: Vec::new() }
    }

    pub fn kind(&self) -> TopologyKind {
        self.kind
    }

    pub fn num_motes(&self) -> usize {
        self.peers.len()
    }

    /// Traffic peers of `mote` (empty for unknown motes).
    pub fn peers(&self, mote: MoteId) -> &[MoteId] {
        self.peers.get(mote.index()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All directed `(source, peer)` pairs, grouped by source.
    pub fn pairs(&self) -> impl Iterator<Item = (MoteId, MoteId)> + '_ {
        self.peers
            .iter()
            .enumerate()
            .flat_map(|(i, list)| list.iter().map(move |&p| (MoteId(i as u32), p)))
    }

    /// Tree parent assigned by `BINARY_TREE`; `None` for the root and for
    /// every other strategy.
    pub fn tree_parent(&self, mote: MoteId) -> Option<MoteId> {
        self.tree_parent.get(mote.index()).copied().flatten()
    }

    /// Tree children of `mote` under `BINARY_TREE`.
    pub fn tree_children(&self, mote: MoteId) -> Vec<MoteId> {
        self.tree_parent
            .iter()
            .enumerate()
            .filter(|&(_, p)| *p == Some(mote))
            .map(|(i, _)| MoteId(i as u32))
            .collect()
    }
}
