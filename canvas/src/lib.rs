//! Editor engine for the tile-map editor.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns
//! the editing lifecycle of one map: translating raw DOM input events into
//! document mutations, maintaining camera state for pan/zoom, hit-testing
//! cells, and rendering the scene. Persistence lives in the `gateway` crate,
//! which exchanges [`doc::MapDocument`] snapshots with [`model::MapModel`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EditorCore`] |
//! | [`model`] | `MapModel`: selection, dirty flag, observers, bounds policy |
//! | [`doc`] | Serialisable document, tile and object types |
//! | [`camera`] | Pan/zoom camera and screen ⇄ world ⇄ grid conversions |
//! | [`input`] | Tools, brush, input event types and the gesture state machine |
//! | [`hit`] | Which entities occupy a cell |
//! | [`render`] | `Surface` abstraction and the draw pipeline |
//! | [`ids`] | Entity id generators |
//! | [`consts`] | Shared defaults, zoom limits and stroke styles |

pub mod camera;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod hit;
pub mod ids;
pub mod input;
pub mod model;
pub mod render;
