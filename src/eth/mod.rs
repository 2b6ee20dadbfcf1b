//! ethers-backed escrow access, one signing client per configured chain.

use ethers::prelude::*;

pub mod client;
pub mod read;
pub mod submit;

pub use client::{ChainClients, OracleClient};

abigen!(
    ContestEscrow,
    "./abi/ContestEscrow.json"
);
