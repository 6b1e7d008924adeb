//! Maru Commerce - cart, stock and order rules.
//!
//! This crate is the part of the shop that encodes business rules rather
//! than presentation:
//!
//! - [`services::CatalogService`] - product listing and catalog seeding
//! - [`services::StockService`] - read-only stock lookups and admin restocks
//! - [`services::CartService`] - quantity changes validated against live stock
//! - [`services::totals`] - subtotal, shipping tier and grand total
//! - [`services::OrderService`] - checkout snapshots, settlement, status edits
//! - [`services::AccountService`] - sign-up and admin profile, role and credential edits
//!
//! # Storage
//!
//! Services talk to storage only through the traits in [`store`].
//! [`db::PgStore`] implements them on `PostgreSQL`; [`store::MemoryStore`]
//! implements them in process for tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use error::CommerceError;
