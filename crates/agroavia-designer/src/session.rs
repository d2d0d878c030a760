//! Polygon drawing session
//!
//! The session is the single owner of the working vertex list. It is idle
//! or drawing; while drawing it holds a [`PointerCapture`] that keeps click
//! and double-click subscriptions on the map. Dropping the capture, on
//! finish, cancel, clear or when the session itself is dropped, releases
//! the subscriptions.
//!
//! Every change of the working list redraws the preview: a placemark per
//! vertex, connecting lines from two vertices on and a dashed outline from
//! three vertices on.

use agroavia_core::{
    polygon_area_hectares, MapError, ValidationError, Vertex, MIN_POLYGON_VERTICES,
};
use agroavia_settings::PaletteSettings;
use std::sync::Arc;

use crate::map::{
    ListenerId, MapWidget, Overlay, OverlayId, OverlayShape, OverlayStyle, PointerKind,
};

/// Drawing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Drawing,
}

/// What a cancel did with the working list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Fewer than three vertices: list and preview were cleared
    Discarded,
    /// A usable outline was kept for correction
    Preserved(usize),
}

/// Colors of the drawing preview
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewStyle {
    pub fill: String,
    pub stroke: String,
    pub marker: String,
}

impl PreviewStyle {
    pub fn from_palette(palette: &PaletteSettings) -> Self {
        Self {
            fill: palette.drawing.clone(),
            stroke: palette.stroke.clone(),
            marker: palette.pending.clone(),
        }
    }

    fn marker(&self) -> OverlayStyle {
        OverlayStyle {
            fill_color: None,
            stroke_color: self.marker.clone(),
            stroke_width: 2,
            opacity: 1.0,
            fill_opacity: 0.0,
            dashed: false,
        }
    }

    fn outline(&self) -> OverlayStyle {
        OverlayStyle {
            fill_color: Some(self.fill.clone()),
            stroke_color: self.stroke.clone(),
            stroke_width: 3,
            opacity: 0.8,
            fill_opacity: 0.3,
            dashed: true,
        }
    }

    fn edge(&self) -> OverlayStyle {
        OverlayStyle {
            fill_color: None,
            stroke_color: self.stroke.clone(),
            stroke_width: 2,
            opacity: 0.5,
            fill_opacity: 0.0,
            dashed: false,
        }
    }
}

impl Default for PreviewStyle {
    fn default() -> Self {
        Self::from_palette(&PaletteSettings::default())
    }
}

/// Click and double-click subscriptions held while drawing
pub struct PointerCapture {
    map: Arc<dyn MapWidget>,
    listeners: Vec<ListenerId>,
}

impl PointerCapture {
    fn acquire(map: Arc<dyn MapWidget>) -> Self {
        let listeners = vec![
            map.listen(PointerKind::Click),
            map.listen(PointerKind::DoubleClick),
        ];
        Self { map, listeners }
    }
}

impl Drop for PointerCapture {
    fn drop(&mut self) {
        for id in self.listeners.drain(..) {
            self.map.unlisten(id);
        }
        tracing::debug!("Pointer handlers released");
    }
}

impl std::fmt::Debug for PointerCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointerCapture")
            .field("listeners", &self.listeners)
            .finish()
    }
}

/// The in-progress field outline
pub struct DrawingSession {
    map: Option<Arc<dyn MapWidget>>,
    style: PreviewStyle,
    vertices: Vec<Vertex>,
    capture: Option<PointerCapture>,
    preview: Vec<OverlayId>,
}

impl DrawingSession {
    pub fn new(style: PreviewStyle) -> Self {
        Self {
            map: None,
            style,
            vertices: Vec::new(),
            capture: None,
            preview: Vec::new(),
        }
    }

    /// Use `map` for pointer capture and the preview
    pub fn attach_map(&mut self, map: Arc<dyn MapWidget>) {
        self.detach_map();
        self.map = Some(map);
        self.redraw_preview();
    }

    /// Stop drawing and remove the preview from the current map
    pub fn detach_map(&mut self) {
        self.capture = None;
        self.clear_preview();
        self.map = None;
    }

    pub fn state(&self) -> SessionState {
        if self.capture.is_some() {
            SessionState::Drawing
        } else {
            SessionState::Idle
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.state() == SessionState::Drawing
    }

    /// The working vertex list
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Whether the working list can become a field
    pub fn has_polygon(&self) -> bool {
        self.vertices.len() >= MIN_POLYGON_VERTICES
    }

    /// Area of the working list once it has three vertices
    pub fn live_area(&self) -> Option<f64> {
        self.has_polygon()
            .then(|| polygon_area_hectares(&self.vertices))
    }

    /// Enter drawing mode with an empty working list
    pub fn start(&mut self) -> Result<(), MapError> {
        let map = self.map.clone().ok_or(MapError::NotReady)?;
        // Release a previous capture before taking a new one
        self.capture = None;
        self.vertices.clear();
        self.clear_preview();
        self.capture = Some(PointerCapture::acquire(map));
        tracing::debug!("Drawing started");
        Ok(())
    }

    /// Append a clicked vertex; ignored unless drawing.
    ///
    /// Returns the new vertex count.
    pub fn add_vertex(&mut self, vertex: Vertex) -> Option<usize> {
        if !self.is_drawing() {
            return None;
        }
        self.vertices.push(vertex);
        self.redraw_preview();
        tracing::debug!("Vertex {} at {}", self.vertices.len(), vertex);
        Some(self.vertices.len())
    }

    /// End drawing keeping the vertices for the pending create.
    ///
    /// With fewer than three vertices drawing continues and an error is
    /// returned.
    pub fn finish(&mut self) -> Result<usize, ValidationError> {
        self.ensure_polygon()?;
        self.capture = None;
        tracing::debug!("Drawing finished with {} vertices", self.vertices.len());
        Ok(self.vertices.len())
    }

    /// Leave drawing mode.
    ///
    /// Pointer handlers are always released. A working list shorter than
    /// three vertices is discarded together with its preview; a usable one
    /// is kept.
    pub fn cancel(&mut self) -> CancelOutcome {
        self.capture = None;
        if self.has_polygon() {
            CancelOutcome::Preserved(self.vertices.len())
        } else {
            self.vertices.clear();
            self.clear_preview();
            CancelOutcome::Discarded
        }
    }

    /// Replace the working list, e.g. from manual entry; returns the area
    pub fn load_vertices(&mut self, vertices: Vec<Vertex>) -> Result<f64, ValidationError> {
        if vertices.len() < MIN_POLYGON_VERTICES {
            return Err(ValidationError::TooFewVertices {
                count: vertices.len(),
                required: MIN_POLYGON_VERTICES,
            });
        }
        self.vertices = vertices;
        self.redraw_preview();
        Ok(polygon_area_hectares(&self.vertices))
    }

    /// Drop the working list, the preview and any capture
    pub fn clear(&mut self) {
        self.capture = None;
        self.vertices.clear();
        self.clear_preview();
    }

    fn ensure_polygon(&self) -> Result<(), ValidationError> {
        if self.has_polygon() {
            Ok(())
        } else {
            Err(ValidationError::TooFewVertices {
                count: self.vertices.len(),
                required: MIN_POLYGON_VERTICES,
            })
        }
    }

    fn clear_preview(&mut self) {
        if let Some(map) = &self.map {
            for id in self.preview.drain(..) {
                map.remove_overlay(id);
            }
        }
        self.preview.clear();
    }

    fn redraw_preview(&mut self) {
        self.clear_preview();
        let Some(map) = self.map.clone() else {
            return;
        };

        let mut overlays: Vec<Overlay> = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, v)| {
                Overlay::new(OverlayShape::Placemark(*v), self.style.marker())
                    .with_hint(format!("Point {}", i + 1))
            })
            .collect();
        if self.has_polygon() {
            overlays.push(Overlay::new(
                OverlayShape::Polygon(self.vertices.clone()),
                self.style.outline(),
            ));
        }
        overlays.extend(self.vertices.windows(2).map(|pair| {
            Overlay::new(OverlayShape::Polyline(pair.to_vec()), self.style.edge())
        }));

        for overlay in overlays {
            match map.add_overlay(overlay) {
                Ok(id) => self.preview.push(id),
                Err(e) => tracing::warn!("Preview overlay dropped: {}", e),
            }
        }
    }
}

impl Default for DrawingSession {
    fn default() -> Self {
        Self::new(PreviewStyle::default())
    }
}

impl Drop for DrawingSession {
    fn drop(&mut self) {
        self.capture = None;
        self.clear_preview();
    }
}

impl std::fmt::Debug for DrawingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawingSession")
            .field("state", &self.state())
            .field("vertices", &self.vertices)
            .field("preview", &self.preview.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessMap;

    fn session() -> (DrawingSession, HeadlessMap) {
        let map = HeadlessMap::default();
        let mut session = DrawingSession::default();
        session.attach_map(Arc::new(map.clone()));
        (session, map)
    }

    fn v(lat: f64, lng: f64) -> Vertex {
        Vertex::new(lat, lng)
    }

    #[test]
    fn test_start_requires_map() {
        let mut session = DrawingSession::default();
        assert_eq!(session.start(), Err(MapError::NotReady));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_clicks_only_count_while_drawing() {
        let (mut session, map) = session();
        assert_eq!(session.add_vertex(v(55.0, 37.0)), None);

        session.start().unwrap();
        assert!(map.is_listening(PointerKind::Click));
        assert!(map.is_listening(PointerKind::DoubleClick));
        assert_eq!(session.add_vertex(v(55.0, 37.0)), Some(1));
        assert_eq!(session.live_area(), None);
    }

    #[test]
    fn test_preview_shapes() {
        let (mut session, map) = session();
        session.start().unwrap();

        session.add_vertex(v(55.0, 37.0));
        assert_eq!(map.shape_counts(), (0, 1, 0));
        session.add_vertex(v(55.0, 37.01));
        assert_eq!(map.shape_counts(), (0, 2, 1));
        session.add_vertex(v(55.01, 37.01));
        assert_eq!(map.shape_counts(), (1, 3, 2));
        assert!(session.live_area().unwrap() > 0.0);
    }

    #[test]
    fn test_finish_needs_three_vertices() {
        let (mut session, map) = session();
        session.start().unwrap();
        session.add_vertex(v(55.0, 37.0));
        session.add_vertex(v(55.0, 37.01));

        assert!(matches!(
            session.finish(),
            Err(ValidationError::TooFewVertices { count: 2, .. })
        ));
        assert!(session.is_drawing());

        session.add_vertex(v(55.01, 37.01));
        assert_eq!(session.finish(), Ok(3));
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(map.listener_count(), 0);
        assert_eq!(session.vertices().len(), 3);
    }

    #[test]
    fn test_cancel_discards_short_outline() {
        let (mut session, map) = session();
        session.start().unwrap();
        session.add_vertex(v(55.0, 37.0));
        session.add_vertex(v(55.0, 37.01));

        assert_eq!(session.cancel(), CancelOutcome::Discarded);
        assert!(session.vertices().is_empty());
        assert_eq!(map.overlay_count(), 0);
        assert_eq!(map.listener_count(), 0);
    }

    #[test]
    fn test_cancel_preserves_usable_outline() {
        let (mut session, map) = session();
        session.start().unwrap();
        for vertex in [v(55.0, 37.0), v(55.0, 37.01), v(55.01, 37.01)] {
            session.add_vertex(vertex);
        }

        assert_eq!(session.cancel(), CancelOutcome::Preserved(3));
        assert_eq!(session.vertices().len(), 3);
        assert_eq!(map.listener_count(), 0);
        assert!(map.overlay_count() > 0);
    }

    #[test]
    fn test_restart_clears_previous_outline() {
        let (mut session, map) = session();
        session.start().unwrap();
        session.add_vertex(v(55.0, 37.0));
        session.start().unwrap();

        assert!(session.vertices().is_empty());
        assert_eq!(map.overlay_count(), 0);
        assert_eq!(map.listener_count(), 2);
    }

    #[test]
    fn test_load_vertices_without_map() {
        let mut session = DrawingSession::default();
        let err = session
            .load_vertices(vec![v(55.0, 37.0), v(55.1, 37.1)])
            .unwrap_err();
        assert!(matches!(err, ValidationError::TooFewVertices { .. }));
        assert!(session.vertices().is_empty());

        let area = session
            .load_vertices(vec![v(55.1, 37.1), v(55.2, 37.2), v(55.3, 37.1)])
            .unwrap();
        assert!(area > 0.0);
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_drop_releases_everything() {
        let (mut session, map) = session();
        session.start().unwrap();
        session.add_vertex(v(55.0, 37.0));
        drop(session);

        assert_eq!(map.listener_count(), 0);
        assert_eq!(map.overlay_count(), 0);
    }
}
