//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Handlers take typed commands, enforce role and ownership rules, and return
//! `DomainError` on failure.

pub mod handlers;
