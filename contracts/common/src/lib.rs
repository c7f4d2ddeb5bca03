//! Shared building blocks for the staking suite contracts.
//!
//! This crate provides:
//! - [`access`]: governance address and the per-principal capability map
//!   every contract checks through one authorisation function.
//! - [`errors`]: the error taxonomy and the code-range convention shared by
//!   all contract error enums.
//! - [`fixed_point`]: 1e30-scaled reward accumulator maths on `U256`.
//! - [`interfaces`]: cross-contract clients for trackers, distributors,
//!   vesters and the external collaborators.
//! - [`guard`]: explicit re-entrancy guard.
//! - [`storage`]: TTL helpers.

#![no_std]

pub mod access;
pub mod errors;
pub mod fixed_point;
pub mod guard;
pub mod interfaces;
pub mod storage;

pub use access::Capability;
pub use errors::{classify, ErrorClass};
pub use guard::ReentrancyGuard;
