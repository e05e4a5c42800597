// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Tool selection.
//!
//! This module defines the canvas tools, their cursors and shortcut keys,
//! and the mode stack that lets a temporary override (holding the spacebar
//! to pan) sit on top of whichever tool was active.

/// Current canvas tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Select,
    Draw,
    Pan,
}

impl Tool {
    /// CSS cursor shown while the tool is idle.
    pub fn cursor(self) -> &'static str {
        match self {
            Tool::Select => "default",
            Tool::Draw => "crosshair",
            Tool::Pan => "grab",
        }
    }

    /// Tool bound to a shortcut key, if any.
    pub fn from_shortcut(key: char) -> Option<Tool> {
        match key.to_ascii_lowercase() {
            'v' => Some(Tool::Select),
            'b' => Some(Tool::Draw),
            'h' => Some(Tool::Pan),
            _ => None,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Tool::Select => "Click a box to select it, drag handles to resize",
            Tool::Draw => "Drag to draw a box, press Escape to cancel",
            Tool::Pan => "Drag to move the view",
        }
    }
}

/// Base tool plus temporary overrides, innermost last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeStack {
    base: Tool,
    overrides: Vec<Tool>,
}

impl Default for ModeStack {
    fn default() -> Self {
        Self::new(Tool::Select)
    }
}

impl ModeStack {
    pub fn new(base: Tool) -> Self {
        Self {
            base,
            overrides: Vec::new(),
        }
    }

    /// Tool in effect right now.
    pub fn current(&self) -> Tool {
        self.overrides.last().copied().unwrap_or(self.base)
    }

    /// Tool that will be back in effect once all overrides are popped.
    pub fn base(&self) -> Tool {
        self.base
    }

    pub fn is_overridden(&self) -> bool {
        !self.overrides.is_empty()
    }

    /// Switch the base tool. Ignored while an override is active.
    pub fn set_base(&mut self, tool: Tool) -> bool {
        if self.is_overridden() {
            return false;
        }
        self.base = tool;
        true
    }

    pub fn push(&mut self, tool: Tool) {
        self.overrides.push(tool);
    }

    /// Drop the innermost override, returning the tool now in effect.
    pub fn pop(&mut self) -> Tool {
        self.overrides.pop();
        self.current()
    }
}
