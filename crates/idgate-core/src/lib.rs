//! Identity gate core — shared models, the identity store trait and
//! error types.

pub mod error;
pub mod models;
pub mod store;

pub use error::{ErrorList, IdentityError, IdentityResult};
pub use models::{
    account::{Account, NewAccount},
    claim::{Claim, ClaimSet},
    principal::Principal,
};
pub use store::IdentityStore;
