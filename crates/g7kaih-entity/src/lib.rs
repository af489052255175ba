//! # g7kaih-entity
//!
//! Domain value types shared between the token service and the access
//! gate. Persistent entities (activities, comments, profiles) live with the
//! business handlers and are not modelled here.

pub mod user;
