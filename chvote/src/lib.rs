#[macro_use]
extern crate serde;

#[macro_use]
extern crate log;

mod authority;
mod bulletin_board;
mod client;
mod confirmation;
mod decryption;
mod election;
mod error;
mod hash;
mod keygen;
mod math;
mod mix;
mod params;
mod polynomial;
mod preparation;
mod printing;
mod random;
mod serde_hex;
mod store;
mod tally;
mod util;
mod vote;

pub use authority::*;
pub use bulletin_board::*;
pub use client::*;
pub use confirmation::*;
pub use decryption::*;
pub use election::*;
pub use error::*;
pub use hash::*;
pub use keygen::*;
pub use math::*;
pub use mix::*;
pub use params::*;
pub use polynomial::*;
pub use preparation::*;
pub use printing::*;
pub use random::*;
pub use serde_hex::*;
pub use store::*;
pub use tally::*;
pub use util::*;
pub use vote::*;

pub use num_bigint::BigUint;

#[cfg(test)]
mod tests;
