// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas controller.
//!
//! This module holds the client-side canvas state: which tool is active,
//! the box being dragged out, the committed boxes and the current
//! selection. Pointer and key input go in; the relay messages a client
//! must send come out. Server events are applied to keep the local boxes
//! in step with other clients.

use crate::config::DrawingConfig;
use crate::models::annotation::{AnnotationId, BoxAnnotation};
use crate::models::image::{ImageDescriptor, SaveRequest};
use crate::relay::protocol::{AnnotationChange, AnnotationRemoval, ClientMessage, ServerEvent};
use crate::ui::toolbar::{ModeStack, Tool};
use crate::util::geometry::{drag_rect, uniform_scale, Point, Rect};
use std::time::{SystemTime, UNIX_EPOCH};

/// Keys the canvas reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    Delete,
    Escape,
    Char(char),
}

/// A committed box with its pending (unbaked) scale.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasBox {
    pub annotation: BoxAnnotation,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl CanvasBox {
    fn new(annotation: BoxAnnotation) -> Self {
        Self {
            annotation,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    fn is(&self, id: &AnnotationId) -> bool {
        self.annotation.has_id(id)
    }

    /// Geometry with the current scale applied.
    pub fn baked(&self) -> BoxAnnotation {
        BoxAnnotation {
            width: self.annotation.width * self.scale_x,
            height: self.annotation.height * self.scale_y,
            ..self.annotation.clone()
        }
    }
}

/// One row of the annotation list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntry {
    pub id: AnnotationId,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    Drawing { anchor: Point, preview: Rect },
    Panning { last: Point },
}

/// Millisecond timestamps, strictly increasing within a session.
#[derive(Debug, Default)]
struct IdClock {
    last: i64,
}

impl IdClock {
    fn next(&mut self) -> AnnotationId {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        self.last = now.max(self.last + 1);
        AnnotationId::Number(self.last)
    }
}

/// Client canvas state machine.
#[derive(Debug)]
pub struct CanvasController {
    drawing: DrawingConfig,
    modes: ModeStack,
    image: Option<ImageDescriptor>,
    boxes: Vec<CanvasBox>,
    selected: Vec<AnnotationId>,
    /// Draw tool is waiting for a drag.
    armed: bool,
    gesture: Gesture,
    pan_offset: (f64, f64),
    ids: IdClock,
}

impl CanvasController {
    pub fn new(drawing: DrawingConfig) -> Self {
        Self {
            drawing,
            modes: ModeStack::default(),
            image: None,
            boxes: Vec::new(),
            selected: Vec::new(),
            armed: false,
            gesture: Gesture::Idle,
            pan_offset: (0.0, 0.0),
            ids: IdClock::default(),
        }
    }

    pub fn image(&self) -> Option<&ImageDescriptor> {
        self.image.as_ref()
    }

    fn filename(&self) -> Option<&str> {
        self.image.as_ref().map(|i| i.filename.as_str())
    }

    pub fn tool(&self) -> Tool {
        self.modes.current()
    }

    pub fn cursor(&self) -> &'static str {
        match self.gesture {
            Gesture::Panning { .. } => "grabbing",
            _ => self.modes.current().cursor(),
        }
    }

    pub fn boxes(&self) -> &[CanvasBox] {
        &self.boxes
    }

    pub fn selected(&self) -> &[AnnotationId] {
        &self.selected
    }

    /// Box being dragged out in draw mode.
    pub fn preview(&self) -> Option<Rect> {
        match self.gesture {
            Gesture::Drawing { preview, .. } => Some(preview),
            _ => None,
        }
    }

    pub fn pan_offset(&self) -> (f64, f64) {
        self.pan_offset
    }

    /// Switch to another image, dropping all local state.
    ///
    /// Returns the request for its saved annotations, or `None` if the
    /// image is already loaded.
    pub fn load_image(&mut self, image: ImageDescriptor) -> Option<ClientMessage> {
        if self.filename() == Some(image.filename.as_str()) {
            return None;
        }
        let filename = image.filename.clone();
        self.image = Some(image);
        self.boxes.clear();
        self.selected.clear();
        self.pan_offset = (0.0, 0.0);
        self.set_tool(Tool::Select);
        Some(ClientMessage::RequestAnnotations(filename))
    }

    /// Choose a tool. Ignored while the pan override is held.
    pub fn set_tool(&mut self, tool: Tool) -> bool {
        if !self.modes.set_base(tool) {
            return false;
        }
        self.reset_gesture();
        if tool != Tool::Select {
            self.selected.clear();
        }
        true
    }

    fn reset_gesture(&mut self) {
        self.gesture = Gesture::Idle;
        self.armed = self.modes.current() == Tool::Draw && self.image.is_some();
    }

    pub fn key_down(&mut self, key: Key) -> Vec<ClientMessage> {
        if key == Key::Space {
            if !self.modes.is_overridden() {
                self.modes.push(Tool::Pan);
                self.gesture = Gesture::Idle;
                self.armed = false;
            }
            return Vec::new();
        }
        if self.modes.is_overridden() {
            return Vec::new();
        }

        match key {
            Key::Char(c) => {
                if let Some(tool) = Tool::from_shortcut(c) {
                    self.set_tool(tool);
                }
                Vec::new()
            }
            Key::Delete => self.delete_selected(),
            Key::Escape => {
                if self.armed {
                    self.set_tool(Tool::Select);
                }
                Vec::new()
            }
            Key::Space => Vec::new(),
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if key == Key::Space && self.modes.is_overridden() {
            self.modes.pop();
            self.reset_gesture();
        }
    }

    pub fn pointer_down(&mut self, at: Point) {
        match self.modes.current() {
            Tool::Pan => self.gesture = Gesture::Panning { last: at },
            Tool::Draw if self.armed => {
                self.gesture = Gesture::Drawing {
                    anchor: at,
                    preview: Rect {
                        left: at.x,
                        top: at.y,
                        width: 0.0,
                        height: 0.0,
                    },
                };
            }
            Tool::Draw => {}
            Tool::Select => {
                let hit = self
                    .boxes
                    .iter()
                    .rev()
                    .find(|b| b.baked().contains(at.x, at.y))
                    .and_then(|b| b.annotation.id.clone());
                self.selected = hit.into_iter().collect();
            }
        }
    }

    pub fn pointer_move(&mut self, at: Point) {
        match &mut self.gesture {
            Gesture::Panning { last } => {
                self.pan_offset.0 += at.x - last.x;
                self.pan_offset.1 += at.y - last.y;
                *last = at;
            }
            Gesture::Drawing { anchor, preview } => {
                *preview = drag_rect(*anchor, at, self.drawing.square_lock);
            }
            Gesture::Idle => {}
        }
    }

    /// Finish the current gesture. A finished draw large enough to keep
    /// yields its create message; any draw returns to the select tool.
    pub fn pointer_up(&mut self) -> Option<ClientMessage> {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Drawing { preview, .. } => {
                let min = self.drawing.min_box_size;
                let message = if preview.width > min && preview.height > min {
                    Some(self.commit_box(preview))
                } else {
                    log::debug!("Discarding {}x{} box", preview.width, preview.height);
                    None
                };
                self.set_tool(Tool::Select);
                message
            }
            _ => None,
        }
    }

    fn commit_box(&mut self, rect: Rect) -> ClientMessage {
        let annotation = BoxAnnotation {
            id: Some(self.ids.next()),
            left: rect.left,
            top: rect.top,
            width: rect.width,
            height: rect.height,
        };
        self.boxes.push(CanvasBox::new(annotation.clone()));
        ClientMessage::Create(
            AnnotationChange {
                filename: self.filename().unwrap_or_default().to_string(),
                annotation,
            }
            .into(),
        )
    }

    /// Select a box by id, as when clicking its list entry.
    pub fn select(&mut self, id: &AnnotationId) -> bool {
        if self.boxes.iter().any(|b| b.is(id)) {
            self.selected = vec![id.clone()];
            true
        } else {
            false
        }
    }

    fn find_mut(&mut self, id: &AnnotationId) -> Option<&mut CanvasBox> {
        self.boxes.iter_mut().find(|b| b.is(id))
    }

    /// Live resize from a handle drag. Square-locked boxes keep equal scales.
    pub fn scale_box(&mut self, id: &AnnotationId, scale_x: f64, scale_y: f64) -> bool {
        let (sx, sy) = if self.drawing.square_lock {
            uniform_scale(scale_x, scale_y)
        } else {
            (scale_x, scale_y)
        };
        match self.find_mut(id) {
            Some(b) => {
                b.scale_x = sx;
                b.scale_y = sy;
                true
            }
            None => false,
        }
    }

    pub fn move_box(&mut self, id: &AnnotationId, left: f64, top: f64) -> bool {
        match self.find_mut(id) {
            Some(b) => {
                b.annotation.left = left;
                b.annotation.top = top;
                true
            }
            None => false,
        }
    }

    /// Bake the pending scale into width and height and announce the edit.
    pub fn commit_transform(&mut self, id: &AnnotationId) -> Option<ClientMessage> {
        let filename = self.filename()?.to_string();
        let b = self.find_mut(id)?;
        b.annotation = b.baked();
        b.scale_x = 1.0;
        b.scale_y = 1.0;
        Some(ClientMessage::Update(
            AnnotationChange {
                filename,
                annotation: b.annotation.clone(),
            }
            .into(),
        ))
    }

    pub fn delete_selected(&mut self) -> Vec<ClientMessage> {
        let selected = std::mem::take(&mut self.selected);
        self.remove_where(|b| selected.iter().any(|id| b.is(id)))
    }

    /// Remove every box on the image.
    pub fn clear(&mut self) -> Vec<ClientMessage> {
        self.selected.clear();
        self.remove_where(|_| true)
    }

    fn remove_where(&mut self, doomed: impl Fn(&CanvasBox) -> bool) -> Vec<ClientMessage> {
        let Some(filename) = self.filename().map(str::to_string) else {
            return Vec::new();
        };
        let (removed, kept): (Vec<_>, Vec<_>) = self.boxes.drain(..).partition(|b| doomed(b));
        self.boxes = kept;
        removed
            .into_iter()
            .filter_map(|b| b.annotation.id)
            .map(|annotation_id| {
                ClientMessage::Delete(
                    AnnotationRemoval {
                        filename: filename.clone(),
                        annotation_id,
                    }
                    .into(),
                )
            })
            .collect()
    }

    fn contains_id(&self, id: &Option<AnnotationId>) -> bool {
        id.as_ref().is_some_and(|id| self.boxes.iter().any(|b| b.is(id)))
    }

    fn adopt(&mut self, mut annotation: BoxAnnotation) {
        if annotation.id.is_none() {
            annotation.id = Some(self.ids.next());
        }
        self.boxes.push(CanvasBox::new(annotation));
    }

    /// Add persisted boxes whose ids are not on the canvas yet.
    fn merge(&mut self, annotations: &[BoxAnnotation]) -> bool {
        let mut changed = false;
        for annotation in annotations {
            if !self.contains_id(&annotation.id) {
                self.adopt(annotation.clone());
                changed = true;
            }
        }
        changed
    }

    /// Apply a server event. Events for other images, and relayed edits
    /// this client cannot read, are ignored. Returns whether local state
    /// changed.
    ///
    /// A peer's save never removes boxes drawn here; unsaved local work
    /// stays until this client saves or reloads.
    pub fn apply(&mut self, event: &ServerEvent) -> bool {
        let Some(current) = self.filename() else {
            return false;
        };
        if event.filename() != Some(current) {
            return false;
        }

        match event {
            ServerEvent::Loaded(set) | ServerEvent::Saved(set) => self.merge(&set.annotations),
            ServerEvent::Created(payload) => {
                let Some(change) = payload.decode::<AnnotationChange>() else {
                    return false;
                };
                if self.contains_id(&change.annotation.id) {
                    return false;
                }
                self.adopt(change.annotation);
                true
            }
            ServerEvent::UpdatedRemote(payload) => {
                let Some(change) = payload.decode::<AnnotationChange>() else {
                    return false;
                };
                let Some(id) = change.annotation.id.clone() else {
                    return false;
                };
                match self.find_mut(&id) {
                    Some(b) => {
                        *b = CanvasBox::new(change.annotation);
                        true
                    }
                    None => false,
                }
            }
            ServerEvent::DeletedRemote(payload) => {
                let Some(removal) = payload.decode::<AnnotationRemoval>() else {
                    return false;
                };
                let before = self.boxes.len();
                self.boxes.retain(|b| !b.is(&removal.annotation_id));
                self.selected.retain(|id| *id != removal.annotation_id);
                self.boxes.len() != before
            }
        }
    }

    /// Every committed box, with pending scales applied.
    pub fn annotations(&self) -> Vec<BoxAnnotation> {
        self.boxes.iter().map(CanvasBox::baked).collect()
    }

    /// Body for saving the full local set, `None` without an image.
    pub fn save_request(&self) -> Option<SaveRequest> {
        let image = self.image.clone()?;
        Some(SaveRequest {
            annotations: Some(self.annotations()),
            image_data: Some(image),
        })
    }

    pub fn annotation_list(&self) -> Vec<ListEntry> {
        self.boxes
            .iter()
            .filter_map(|b| b.annotation.id.clone())
            .map(|id| ListEntry {
                label: format!("Box #{}", id),
                selected: self.selected.contains(&id),
                id,
            })
            .collect()
    }
}
