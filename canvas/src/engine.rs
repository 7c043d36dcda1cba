use std::collections::HashMap;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::camera::{self, Camera, Cell, Point, Size, Viewport};
use crate::consts::ZOOM_STEP;
use crate::doc::{EntityRef, GameObject, LayerKind, MapDocument, PartialGameObject};
use crate::hit;
use crate::input::{Brush, Button, InputState, Key, Tool, UiState, WheelDelta};
use crate::model::{MapModel, PlacementError};
use crate::render::{self, ImageSource, Surface};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Placed(EntityRef),
    Removed(EntityRef),
    Rotated(EntityRef),
    Moved(EntityRef),
    SelectionChanged(Option<EntityRef>),
    /// A placement or move was refused by the bounds policy.
    Rejected(PlacementError),
    RenderNeeded,
}

/// Core editor state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
#[derive(Debug, Default)]
pub struct EditorCore {
    pub model: MapModel,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    /// Screen position of the surface's top-left corner.
    pub origin: Point,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl EditorCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_model(model: MapModel) -> Self {
        Self { model, ..Self::default() }
    }

    // --- Data inputs ---

    /// Replace the edited document and reset any gesture.
    pub fn load_document(&mut self, doc: MapDocument) {
        self.input = InputState::Idle;
        self.model.load_document(doc);
    }

    // --- Tool / brush ---

    /// Set the active tool. Clears the selection.
    pub fn set_tool(&mut self, tool: Tool) {
        self.ui.tool = tool;
        self.input = InputState::Idle;
        self.model.clear_selection();
    }

    pub fn set_brush(&mut self, brush: Brush) {
        self.ui.brush = brush;
    }

    // --- Viewport ---

    pub fn set_viewport(&mut self, origin: Point, width_css: f64, height_css: f64) {
        self.origin = origin;
        self.viewport_width = width_css;
        self.viewport_height = height_css;
    }

    /// The transform shared by placement and rendering.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::for_document(self.origin, self.camera, self.model.document())
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        if button != Button::Primary {
            self.input = InputState::Panning { last: screen_pt };
            return Vec::new();
        }
        let cell = camera::screen_to_grid(screen_pt, &self.viewport());
        match self.ui.tool {
            Tool::Place => self.place(cell),
            Tool::Delete => self.delete_at(cell),
            Tool::Rotate => self.rotate_at(cell),
            Tool::Move => self.grab(screen_pt, cell),
        }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        match self.input.clone() {
            InputState::Idle => Vec::new(),
            InputState::Panning { last } => {
                self.camera.pan_by(screen_pt.x - last.x, screen_pt.y - last.y);
                self.input = InputState::Panning { last: screen_pt };
                vec![Action::RenderNeeded]
            }
            InputState::Dragging { entity, anchor, origin } => {
                let snapped = camera::screen_to_grid_snapped(screen_pt, &self.viewport()).cell();
                let target = Cell::new(origin.x + snapped.x - anchor.x, origin.y + snapped.y - anchor.y);
                self.move_object(&entity, target)
            }
        }
    }

    pub fn on_pointer_up(&mut self, _screen_pt: Point, _button: Button) -> Vec<Action> {
        self.input = InputState::Idle;
        Vec::new()
    }

    /// Wheel up zooms in about the pointer, wheel down zooms out.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta) -> Vec<Action> {
        if delta.dy == 0.0 {
            return Vec::new();
        }
        let factor = if delta.dy < 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
        let anchor = Point::new(screen_pt.x - self.origin.x, screen_pt.y - self.origin.y);
        self.camera.zoom_about(anchor, factor);
        vec![Action::RenderNeeded]
    }

    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        let Some(selected) = self.model.selection().cloned() else {
            return Vec::new();
        };
        match key.0.as_str() {
            "Delete" | "Backspace" => self.remove(&selected),
            "Escape" => {
                self.model.clear_selection();
                vec![Action::SelectionChanged(None), Action::RenderNeeded]
            }
            "r" | "R" => self.rotate(&selected),
            _ => Vec::new(),
        }
    }

    // --- Render ---

    /// Draw the current state.
    ///
    /// # Errors
    ///
    /// Propagates surface errors.
    pub fn render<S, M>(&self, surface: &S, images: &M) -> Result<(), S::Error>
    where
        S: Surface,
        M: ImageSource<S::Image>,
    {
        render::draw_scene(
            surface,
            images,
            self.model.document(),
            &self.viewport(),
            Size::new(self.viewport_width, self.viewport_height),
            self.model.selection(),
        )
    }

    // --- Queries ---

    #[must_use]
    pub fn selection(&self) -> Option<&EntityRef> {
        self.model.selection()
    }

    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    // --- Tool handlers ---

    fn place(&mut self, cell: Cell) -> Vec<Action> {
        let brush = self.ui.brush.clone();
        if brush.asset.is_empty() {
            return Vec::new();
        }
        let placed = match brush.layer {
            LayerKind::Tiles => self.model.add_tile(cell.x, cell.y, brush.asset, brush.rotation).map(EntityRef::tile),
            LayerKind::Objects => {
                let mut obj = GameObject::new(cell.x, cell.y, brush.asset);
                obj.rotation = f64::from(brush.rotation.degrees());
                self.model.add_object(obj).map(EntityRef::object)
            }
        };
        match placed {
            Ok(entity) => vec![Action::Placed(entity), Action::RenderNeeded],
            Err(e) => vec![Action::Rejected(e)],
        }
    }

    fn delete_at(&mut self, cell: Cell) -> Vec<Action> {
        match hit::topmost_at(self.model.document(), cell) {
            Some(entity) => self.remove(&entity),
            None => Vec::new(),
        }
    }

    fn rotate_at(&mut self, cell: Cell) -> Vec<Action> {
        match hit::topmost_at(self.model.document(), cell) {
            Some(entity) => self.rotate(&entity),
            None => Vec::new(),
        }
    }

    fn grab(&mut self, screen_pt: Point, cell: Cell) -> Vec<Action> {
        let Some(entity) = hit::topmost_at(self.model.document(), cell) else {
            let had_selection = self.model.selection().is_some();
            self.model.clear_selection();
            self.input = InputState::Panning { last: screen_pt };
            return if had_selection { vec![Action::SelectionChanged(None), Action::RenderNeeded] } else { Vec::new() };
        };
        self.model.select_entity(&entity);
        // Tiles can be selected but are never moved.
        let origin = match entity.layer {
            LayerKind::Tiles => None,
            LayerKind::Objects => self.model.object(&entity.id).map(|o| Cell::new(o.x, o.y)),
        };
        if let Some(origin) = origin {
            let anchor = camera::screen_to_grid_snapped(screen_pt, &self.viewport()).cell();
            self.input = InputState::Dragging { entity: entity.clone(), anchor, origin };
        }
        vec![Action::SelectionChanged(Some(entity)), Action::RenderNeeded]
    }

    fn move_object(&mut self, entity: &EntityRef, target: Cell) -> Vec<Action> {
        let Some(obj) = self.model.object(&entity.id) else {
            self.input = InputState::Idle;
            return Vec::new();
        };
        if obj.x == target.x && obj.y == target.y {
            return Vec::new();
        }
        let partial = PartialGameObject { x: Some(target.x), y: Some(target.y), ..PartialGameObject::default() };
        match self.model.update_object(&entity.id, &partial) {
            Ok(true) => vec![Action::Moved(entity.clone()), Action::RenderNeeded],
            Ok(false) => Vec::new(),
            Err(e) => vec![Action::Rejected(e)],
        }
    }

    fn remove(&mut self, entity: &EntityRef) -> Vec<Action> {
        let removed = match entity.layer {
            LayerKind::Tiles => self.model.remove_tile(&entity.id),
            LayerKind::Objects => self.model.remove_object(&entity.id),
        };
        if removed { vec![Action::Removed(entity.clone()), Action::RenderNeeded] } else { Vec::new() }
    }

    fn rotate(&mut self, entity: &EntityRef) -> Vec<Action> {
        let rotated = match entity.layer {
            LayerKind::Tiles => {
                let next = self.model.tile(&entity.id).map(|t| t.rotation.clockwise());
                next.is_some_and(|r| self.model.rotate_tile(&entity.id, r))
            }
            LayerKind::Objects => {
                let next = self.model.object(&entity.id).map(|o| (o.rotation + 90.0).rem_euclid(360.0));
                let partial = PartialGameObject { rotation: next, ..PartialGameObject::default() };
                next.is_some() && self.model.update_object(&entity.id, &partial).unwrap_or(false)
            }
        };
        if rotated { vec![Action::Rotated(entity.clone()), Action::RenderNeeded] } else { Vec::new() }
    }
}

/// The browser editor: `EditorCore` plus the canvas context and loaded images.
pub struct Engine {
    ctx: CanvasRenderingContext2d,
    images: HashMap<String, HtmlImageElement>,
    pub core: EditorCore,
}

impl Engine {
    /// Create an engine drawing into `canvas`.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the canvas has no 2D context.
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(JsValue::from)?;
        Ok(Self { ctx, images: HashMap::new(), core: EditorCore::new() })
    }

    /// Register a loaded image for `asset`.
    pub fn set_image(&mut self, asset: impl Into<String>, image: HtmlImageElement) {
        self.images.insert(asset.into(), image);
    }

    /// Drop every loaded image, e.g. when switching packs.
    pub fn clear_images(&mut self) {
        self.images.clear();
    }

    // --- Delegated inputs ---

    pub fn load_document(&mut self, doc: MapDocument) {
        self.core.load_document(doc);
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.core.set_tool(tool);
    }

    pub fn set_brush(&mut self, brush: Brush) {
        self.core.set_brush(brush);
    }

    pub fn set_viewport(&mut self, origin: Point, width_css: f64, height_css: f64) {
        self.core.set_viewport(origin, width_css, height_css);
    }

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt, button)
    }

    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta) -> Vec<Action> {
        self.core.on_wheel(screen_pt, delta)
    }

    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        self.core.on_key_down(key)
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any `Canvas2D` call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        self.core.render(&self.ctx, &self.images)
    }
}
