//! Shared numeric and style constants for the canvas crate.

// ── Document defaults ───────────────────────────────────────────

/// Cell edge length used when a document does not specify one.
pub const DEFAULT_TILE_SIZE: u32 = 32;

/// Grid width (in cells) of a fresh document.
pub const DEFAULT_GRID_WIDTH: u32 = 10;

/// Grid height (in cells) of a fresh document.
pub const DEFAULT_GRID_HEIGHT: u32 = 10;

/// Placeholder name for documents that have not been named yet.
pub const DEFAULT_MAP_NAME: &str = "New map";

// ── Id prefixes ─────────────────────────────────────────────────

pub const TILE_ID_PREFIX: &str = "tile";
pub const OBJECT_ID_PREFIX: &str = "obj";
pub const MAP_ID_PREFIX: &str = "map";

/// Number of random characters appended to generated ids.
pub const ID_SUFFIX_LEN: usize = 9;

// ── Camera ──────────────────────────────────────────────────────

/// Smallest zoom factor reachable through wheel zoom.
pub const ZOOM_MIN: f64 = 0.1;

/// Largest zoom factor reachable through wheel zoom.
pub const ZOOM_MAX: f64 = 8.0;

/// Multiplicative zoom change per wheel notch.
pub const ZOOM_STEP: f64 = 1.1;

// ── Rendering ───────────────────────────────────────────────────

/// Grid line stroke: low-opacity neutral.
pub const GRID_STROKE: &str = "rgba(0, 0, 0, 0.2)";

/// Grid line width in world units.
pub const GRID_LINE_WIDTH: f64 = 1.0;

/// Outline drawn around the selected entity.
pub const SELECTION_STROKE: &str = "#1E88E5";

/// Selection outline width in world units.
pub const SELECTION_LINE_WIDTH: f64 = 2.0;
