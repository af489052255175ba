//! Role-based access control.
//!
//! Routes declare the [`RoleSet`] allowed to reach them; the access gate
//! checks the authenticated role against it.

pub mod role_set;

pub use role_set::RoleSet;
