//! Domain models shared by the gate, the issuer and store implementations.

pub mod account;
pub mod claim;
pub mod principal;
