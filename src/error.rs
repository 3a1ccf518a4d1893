//! Crate-wide error taxonomy.
//!
//! Variants map onto the parameter/domain/no-route split: malformed input
//! is rejected before any state change, reservation table overflow and
//! underflow name the offending element, and `NoRoute` is the dedicated
//! payment-layer failure the route-finder reports when it comes up empty.
//! Integrity warnings (a channel missing capacity, an unrepresentable
//! local-channel capacity) are not represented here — they are logged via
//! `log::warn!` at the call site and do not fail the command.

use derive_more::{Display, From};

use crate::ids::{Scid, ScidDir};

#[derive(Debug, Display, From)]
pub enum OracleError {
    #[display(fmt = "invalid parameter: {}", _0)]
    InvalidParams(String),

    #[display(fmt = "unknown layer: {}", _0)]
    UnknownLayer(String),

    #[display(fmt = "reservation overflow at {:?}, amount already reserved: {}", scidd, already_reserved)]
    ReservationOverflow { scidd: ScidDir, already_reserved: u64 },

    #[display(fmt = "reservation underflow at {:?}, amount reserved: {}", scidd, reserved)]
    ReservationUnderflow { scidd: ScidDir, reserved: u64 },

    #[display(fmt = "channel {:?} already exists with different values", _0)]
    LocalChannelMismatch(Scid),

    #[display(fmt = "inform-channel requires exactly one of minimum_msat or maximum_msat")]
    InformChannelAmbiguous,

    #[display(fmt = "no route found")]
    NoRoute,
}

impl std::error::Error for OracleError {}

pub type OracleResult<T> = Result<T, OracleError>;
