//! # g7kaih-auth
//!
//! Stateless authentication and role-based authorization for the G7KAIH
//! gateway.
//!
//! ## Modules
//!
//! - `jwt` HS256 token pair issuance, verification, and refresh rotation
//! - `rbac` role sets that routes declare and the gate enforces

pub mod jwt;
pub mod rbac;

pub use jwt::{Claims, Clock, ManualClock, SystemClock, TokenError, TokenPair, TokenService, TokenType};
pub use rbac::RoleSet;
