//! Craftline Admin library.
//!
//! This crate provides the admin backend as a library, allowing it to be
//! tested and reused. The binary in `main.rs` wires configuration, the
//! database pool, and the HTTP server around it.
//!
//! # Security
//!
//! The admin API has no authentication layer of its own; deploy it only on
//! network-restricted infrastructure (VPN/private network). It can dump and
//! restore the production database.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
