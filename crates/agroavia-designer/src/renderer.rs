//! Field layer
//!
//! Renders every field with a usable outline as a map polygon filled by
//! status, remembers which overlay belongs to which field for selection,
//! and highlights a focused field.

use agroavia_core::MIN_POLYGON_VERTICES;
use agroavia_registry::{Field, FieldStatus};
use agroavia_settings::PaletteSettings;
use std::collections::HashMap;

use crate::map::{MapWidget, Overlay, OverlayId, OverlayShape, OverlayStyle};

/// Outline color of a highlighted field
pub const HIGHLIGHT_STROKE: &str = "#FF0000";
/// Outline width of a highlighted field
pub const HIGHLIGHT_WIDTH: u32 = 5;

/// Polygons of all rendered fields
#[derive(Debug, Default)]
pub struct FieldLayer {
    palette: PaletteSettings,
    polygons: HashMap<String, OverlayId>,
    highlighted: Option<String>,
}

impl FieldLayer {
    pub fn new(palette: PaletteSettings) -> Self {
        Self {
            palette,
            polygons: HashMap::new(),
            highlighted: None,
        }
    }

    /// Fill color for a field status
    pub fn fill_for(&self, status: FieldStatus) -> &str {
        match status {
            FieldStatus::Processed => &self.palette.processed,
            FieldStatus::Pending => &self.palette.pending,
            FieldStatus::InProgress | FieldStatus::Cancelled => &self.palette.default,
        }
    }

    /// Style of a field polygon
    pub fn style_for(&self, status: FieldStatus) -> OverlayStyle {
        OverlayStyle {
            fill_color: Some(self.fill_for(status).to_string()),
            stroke_color: self.palette.stroke.clone(),
            ..OverlayStyle::default()
        }
    }

    /// Replace all rendered polygons; returns how many were drawn
    pub fn redraw(&mut self, map: &dyn MapWidget, fields: &[Field]) -> usize {
        self.clear(map);
        for field in fields
            .iter()
            .filter(|f| f.coordinates.len() >= MIN_POLYGON_VERTICES)
        {
            let overlay = Overlay::new(
                OverlayShape::Polygon(field.coordinates.clone()),
                self.style_for(field.status),
            )
            .with_hint(field.name.clone());
            match map.add_overlay(overlay) {
                Ok(id) => {
                    self.polygons.insert(field.id.clone(), id);
                }
                Err(e) => tracing::error!("Could not draw field {}: {}", field.id, e),
            }
        }
        tracing::debug!("Rendered {} field polygons", self.polygons.len());
        self.polygons.len()
    }

    /// Remove every rendered polygon
    pub fn clear(&mut self, map: &dyn MapWidget) {
        for (_, id) in self.polygons.drain() {
            map.remove_overlay(id);
        }
        self.highlighted = None;
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn overlay_of(&self, field_id: &str) -> Option<OverlayId> {
        self.polygons.get(field_id).copied()
    }

    /// Field rendered as `overlay`
    pub fn field_at(&self, overlay: OverlayId) -> Option<&str> {
        self.polygons
            .iter()
            .find(|(_, id)| **id == overlay)
            .map(|(field_id, _)| field_id.as_str())
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    /// Emphasize the outline of one field, resetting any previous highlight
    pub fn highlight(&mut self, map: &dyn MapWidget, field: &Field) -> bool {
        if self.highlighted.as_deref() != Some(field.id.as_str()) {
            self.reset_highlight(map, None);
        }
        let Some(id) = self.overlay_of(&field.id) else {
            return false;
        };
        let style = OverlayStyle {
            stroke_color: HIGHLIGHT_STROKE.to_string(),
            stroke_width: HIGHLIGHT_WIDTH,
            ..self.style_for(field.status)
        };
        match map.set_style(id, style) {
            Ok(()) => {
                self.highlighted = Some(field.id.clone());
                true
            }
            Err(e) => {
                tracing::warn!("Could not highlight field {}: {}", field.id, e);
                false
            }
        }
    }

    /// Restore the normal outline of the highlighted field.
    ///
    /// `status` is the field's current status; without it the pending
    /// style is used.
    pub fn reset_highlight(&mut self, map: &dyn MapWidget, status: Option<FieldStatus>) {
        let Some(field_id) = self.highlighted.take() else {
            return;
        };
        if let Some(id) = self.overlay_of(&field_id) {
            let style = self.style_for(status.unwrap_or_default());
            if let Err(e) = map.set_style(id, style) {
                tracing::warn!("Could not reset highlight of {}: {}", field_id, e);
            }
        }
    }
}
