//! Maru Core - Shared domain types.
//!
//! This crate provides the types shared by every Maru component:
//! - `commerce` - Cart, stock, order and account rules
//! - `api` - JSON surface for the storefront and admin console
//! - `cli` - Migrations, catalog seeding and admin commands
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP clients. Enable the `postgres` feature to get `sqlx`
//! encoding for ids and enums.
//!
//! # Modules
//!
//! - [`types`] - Typed ids, money, order status, stock keys, contact fields

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
