//! # account-manager-api
//!
//! Shared API types for the account-manager service.
//! This crate is designed to be WASM-compatible and can be used in both
//! backend (Rust) and frontend (WASM/TypeScript via wasm-bindgen) applications.
//!
//! ## Features
//!
//! - Request DTOs (RegisterRequest, LoginRequest, RefreshTokenRequest)
//! - Response DTOs (UserResponse, LoginResponse, TokenPairResponse)
//! - Error envelope (ErrorResponse)
//! - Success envelope (AppResponse)
//!
//! ## Example
//!
//! ```rust
//! use account_manager_api::LoginRequest;
//!
//! let request = LoginRequest {
//!     username: Some("johndoe".to_string()),
//!     email: None,
//!     password: "password123".to_string(),
//! };
//! assert!(request.identifier().is_some());
//! ```

pub mod error;
pub mod requests;
pub mod responses;
pub mod result;

// Re-exports for convenient access
pub use error::ErrorResponse;
pub use requests::*;
pub use responses::*;
pub use result::{AppResponse, StatusCode};
