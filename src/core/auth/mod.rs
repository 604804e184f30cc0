//! Authentication module
//!
//! This module provides authentication functionality including:
//! - Password hashing and verification
//! - JWT token generation and validation
//! - The bearer-token gate for protected routes
//! - User registration and login
//! - REST API endpoints for account operations

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;

pub use api::{AuthApiState, auth_api_router};
pub use jwt::{Claims, JwtConfig, JwtError, JwtService, TokenPair, TokenType};
pub use middleware::{AuthContext, AuthGate, GateError, require_auth};
pub use password::{PasswordError, hash_password, verify_password};
pub use service::{AccountService, AuthError, LoginRequest, RegisterRequest};
