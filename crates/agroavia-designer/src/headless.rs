//! In-process map widget
//!
//! [`HeadlessMap`] keeps overlays, subscriptions and the viewport in memory.
//! It backs the command-line front end and lets tests drive the workspace
//! with synthetic pointer events. Clones share the same map.

use agroavia_core::{Bounds, MapError, Vertex};
use agroavia_settings::ZOOM_LIMIT;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::loader::WidgetLoader;
use crate::map::{
    ListenerId, MapWidget, Overlay, OverlayId, OverlayShape, OverlayStyle, PointerEvent,
    PointerKind,
};

#[derive(Debug)]
struct HeadlessState {
    next_id: u64,
    overlays: BTreeMap<OverlayId, Overlay>,
    listeners: BTreeMap<ListenerId, PointerKind>,
    center: Vertex,
    zoom: u8,
    last_fit: Option<(Bounds, u32)>,
    reject_overlays: bool,
}

/// Map widget without a display
#[derive(Debug, Clone)]
pub struct HeadlessMap {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessMap {
    pub fn new(center: Vertex, zoom: u8) -> Self {
        Self {
            state: Arc::new(Mutex::new(HeadlessState {
                next_id: 1,
                overlays: BTreeMap::new(),
                listeners: BTreeMap::new(),
                center,
                zoom: zoom.min(ZOOM_LIMIT),
                last_fit: None,
                reject_overlays: false,
            })),
        }
    }

    /// All overlays currently on the map
    pub fn overlays(&self) -> Vec<(OverlayId, Overlay)> {
        self.state
            .lock()
            .overlays
            .iter()
            .map(|(id, overlay)| (*id, overlay.clone()))
            .collect()
    }

    pub fn overlay(&self, id: OverlayId) -> Option<Overlay> {
        self.state.lock().overlays.get(&id).cloned()
    }

    pub fn overlay_count(&self) -> usize {
        self.state.lock().overlays.len()
    }

    /// Number of overlays of each shape: (polygons, placemarks, polylines)
    pub fn shape_counts(&self) -> (usize, usize, usize) {
        let state = self.state.lock();
        let mut counts = (0, 0, 0);
        for overlay in state.overlays.values() {
            match overlay.shape {
                OverlayShape::Polygon(_) => counts.0 += 1,
                OverlayShape::Placemark(_) => counts.1 += 1,
                OverlayShape::Polyline(_) => counts.2 += 1,
            }
        }
        counts
    }

    pub fn listener_count(&self) -> usize {
        self.state.lock().listeners.len()
    }

    pub fn is_listening(&self, kind: PointerKind) -> bool {
        self.state.lock().listeners.values().any(|k| *k == kind)
    }

    /// Last `fit_bounds` request
    pub fn last_fit(&self) -> Option<(Bounds, u32)> {
        self.state.lock().last_fit
    }

    /// Make `add_overlay` fail, simulating a widget error
    pub fn set_reject_overlays(&self, reject: bool) {
        self.state.lock().reject_overlays = reject;
    }

    /// Synthesize a pointer gesture.
    ///
    /// Returns the event only when someone listens for its kind, the way a
    /// real widget only dispatches to registered handlers.
    pub fn pointer(&self, kind: PointerKind, position: Vertex) -> Option<PointerEvent> {
        self.is_listening(kind).then_some(PointerEvent {
            kind,
            position,
            target: None,
        })
    }

    /// Synthesize a click on an overlay; overlay clicks need no subscription
    pub fn click_overlay(&self, id: OverlayId) -> Option<PointerEvent> {
        let state = self.state.lock();
        let overlay = state.overlays.get(&id)?;
        let position = match &overlay.shape {
            OverlayShape::Polygon(vertices) | OverlayShape::Polyline(vertices) => {
                vertices.first().copied().unwrap_or(state.center)
            }
            OverlayShape::Placemark(position) => *position,
        };
        Some(PointerEvent::on_overlay(position, id))
    }
}

impl Default for HeadlessMap {
    fn default() -> Self {
        Self::new(agroavia_core::DEFAULT_CENTER, 10)
    }
}

impl MapWidget for HeadlessMap {
    fn add_overlay(&self, overlay: Overlay) -> Result<OverlayId, MapError> {
        let mut state = self.state.lock();
        if state.reject_overlays {
            return Err(MapError::OverlayRejected {
                reason: "widget refused the overlay".to_string(),
            });
        }
        let id = OverlayId(state.next_id);
        state.next_id += 1;
        state.overlays.insert(id, overlay);
        Ok(id)
    }

    fn remove_overlay(&self, id: OverlayId) {
        self.state.lock().overlays.remove(&id);
    }

    fn set_style(&self, id: OverlayId, style: OverlayStyle) -> Result<(), MapError> {
        let mut state = self.state.lock();
        let overlay = state
            .overlays
            .get_mut(&id)
            .ok_or_else(|| MapError::OverlayRejected {
                reason: format!("no overlay {}", id.0),
            })?;
        overlay.style = style;
        Ok(())
    }

    fn center(&self) -> Vertex {
        self.state.lock().center
    }

    fn zoom(&self) -> u8 {
        self.state.lock().zoom
    }

    fn set_view(&self, center: Vertex, zoom: u8) {
        let mut state = self.state.lock();
        state.center = center;
        state.zoom = zoom.min(ZOOM_LIMIT);
    }

    fn fit_bounds(&self, bounds: Bounds, margin: u32) {
        let mut state = self.state.lock();
        state.center = bounds.center();
        state.last_fit = Some((bounds, margin));
    }

    fn listen(&self, kind: PointerKind) -> ListenerId {
        let mut state = self.state.lock();
        let id = ListenerId(state.next_id);
        state.next_id += 1;
        state.listeners.insert(id, kind);
        id
    }

    fn unlisten(&self, id: ListenerId) {
        self.state.lock().listeners.remove(&id);
    }
}

/// Loader handing out a [`HeadlessMap`]
#[derive(Debug, Clone, Default)]
pub struct HeadlessLoader {
    map: HeadlessMap,
}

impl HeadlessLoader {
    pub fn new(map: HeadlessMap) -> Self {
        Self { map }
    }

    pub fn map(&self) -> &HeadlessMap {
        &self.map
    }
}

#[async_trait]
impl WidgetLoader for HeadlessLoader {
    async fn load(&self) -> Result<Arc<dyn MapWidget>, MapError> {
        Ok(Arc::new(self.map.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlays_and_listeners() {
        let map = HeadlessMap::default();
        let id = map
            .add_overlay(Overlay::new(
                OverlayShape::Placemark(Vertex::new(55.0, 37.0)),
                OverlayStyle::default(),
            ))
            .unwrap();
        assert_eq!(map.overlay_count(), 1);
        assert_eq!(map.shape_counts(), (0, 1, 0));

        let listener = map.listen(PointerKind::Click);
        assert!(map.pointer(PointerKind::Click, Vertex::new(1.0, 2.0)).is_some());
        assert!(map
            .pointer(PointerKind::DoubleClick, Vertex::new(1.0, 2.0))
            .is_none());

        map.unlisten(listener);
        map.remove_overlay(id);
        assert_eq!(map.listener_count(), 0);
        assert_eq!(map.overlay_count(), 0);
    }

    #[test]
    fn test_clones_share_state_and_zoom_is_clamped() {
        let map = HeadlessMap::default();
        let other = map.clone();
        other.set_view(Vertex::new(50.0, 30.0), 40);
        assert_eq!(map.zoom(), ZOOM_LIMIT);
        assert_eq!(map.center(), Vertex::new(50.0, 30.0));
    }

    #[test]
    fn test_rejecting_widget() {
        let map = HeadlessMap::default();
        map.set_reject_overlays(true);
        let result = map.add_overlay(Overlay::new(
            OverlayShape::Polyline(Vec::new()),
            OverlayStyle::default(),
        ));
        assert!(matches!(result, Err(MapError::OverlayRejected { .. })));
        assert!(map.set_style(OverlayId(99), OverlayStyle::default()).is_err());
    }
}
