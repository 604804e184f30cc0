//! Core domain models and business logic for the inventory service

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
#[cfg(test)]
mod tests;
