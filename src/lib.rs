//! Marketplace - REST API for a second-hand product marketplace
//!
//! Categories, brand models, product listings with their sale rooms, and the
//! users who own or buy them, stored in SQLite or MySQL.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;
