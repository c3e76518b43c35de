//! Guildhall - membership association backend.
//!
//! Members publish articles through a moderation queue, subscribe to paid or
//! free tiers through a hosted payment gateway, and receive in-app
//! notifications and bulk email from the association's staff. News, events
//! and a discussion forum round out the community surface.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
