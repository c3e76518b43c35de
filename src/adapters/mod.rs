//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - JWT sessions and Argon2 password hashing
//! - `email` - Resend-compatible email API
//! - `gateway` - Flutterwave-compatible payment gateway
//! - `http` - axum routers, DTOs and auth extractors
//! - `memory` - in-process repositories for tests and local runs
//! - `postgres` - sqlx repositories

pub mod auth;
pub mod email;
pub mod gateway;
pub mod http;
pub mod memory;
pub mod postgres;
