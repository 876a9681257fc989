//! # API Shared
//!
//! Shared utilities and definitions for AYUNEX APIs.
//!
//! Contains:
//! - Request/response types (`dto` module) with OpenAPI schemas
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the `ayunex-run` binary.

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
