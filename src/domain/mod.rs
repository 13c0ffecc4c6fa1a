//! Domain types and rules, free of I/O.
//!
//! Storage and the other collaborators are reached only through the traits in
//! [`ports`].

pub mod card;
pub mod company;
pub mod payment;
pub mod ports;
