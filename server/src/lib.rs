//! Live-mode backend for the tile-map editor.
//!
//! Serves the pack catalog from an assets directory and stores each user's
//! maps as JSON files under a data directory. See [`routes::app`] for the
//! HTTP surface.

pub mod config;
pub mod routes;
pub mod services;
pub mod state;
