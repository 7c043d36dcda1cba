//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own filesystem layout and persistence concerns so route
//! handlers can stay focused on protocol translation and status mapping.

pub mod maps;
pub mod packs;
pub mod users;
