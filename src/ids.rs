//! Node and channel identifiers.

use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;

/// Fixed-width public-key node identifier (33-byte compressed secp256k1
/// point), following the teacher's `define_fixed_bytes!` convention
/// (`common::define_fixed_bytes`) rather than a bare `Vec<u8>`.
#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId([u8; 33]);

impl NodeId {
    pub fn from_bytes(bytes: [u8; 33]) -> NodeId {
        NodeId(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", hex_string(&self.0))
    }
}

impl<'a> TryFrom<&'a [u8]> for NodeId {
    type Error = ();

    fn try_from(src: &'a [u8]) -> Result<NodeId, ()> {
        if src.len() != 33 {
            return Err(());
        }
        let mut inner = [0u8; 33];
        inner.copy_from_slice(src);
        Ok(NodeId(inner))
    }
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// 64-bit opaque identifier of a public channel.
#[derive(Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Scid(pub u64);

impl fmt::Debug for Scid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

/// A channel direction: 0 or 1. The spec fixes this to a two-valued set
/// rather than a general boolean so invalid directions are rejected at
/// the parameter boundary (`Direction::from_u8`) instead of silently
/// wrapping.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Direction(u8);

impl Direction {
    pub const ZERO: Direction = Direction(0);
    pub const ONE: Direction = Direction(1);

    pub fn from_u8(v: u8) -> Option<Direction> {
        match v {
            0 | 1 => Some(Direction(v)),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self.0
    }

    pub fn reverse(self) -> Direction {
        Direction(1 - self.0)
    }
}

/// A directed channel: `(scid, dir)`, the atomic unit addressed by
/// constraints and reservations.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScidDir {
    pub scid: Scid,
    pub dir: Direction,
}

impl ScidDir {
    pub fn new(scid: Scid, dir: Direction) -> ScidDir {
        ScidDir { scid, dir }
    }
}
