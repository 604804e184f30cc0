//! Inventory - Product Inventory Service
//!
//! An HTTP backend for user accounts with JWT sessions and a bearer-protected
//! product catalog stored in MongoDB.

pub mod app;
pub mod core;
