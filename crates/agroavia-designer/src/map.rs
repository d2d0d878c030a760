//! Map widget contract
//!
//! The workspace only needs a small capability set from an interactive map:
//! polygon, placemark and polyline overlays, viewport control and pointer
//! subscriptions. Any widget offering these can be plugged in through
//! [`MapWidget`]; [`crate::headless::HeadlessMap`] is the in-process
//! implementation used without a browser.

use agroavia_core::{Bounds, MapError, Vertex};
use serde::{Deserialize, Serialize};

/// Handle of an overlay added to a map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OverlayId(pub u64);

/// Handle of a pointer subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListenerId(pub u64);

/// Pointer gestures the workspace reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerKind {
    Click,
    DoubleClick,
}

/// A pointer gesture delivered by the widget
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// Geographic position under the pointer
    pub position: Vertex,
    /// Overlay under the pointer, if any
    pub target: Option<OverlayId>,
}

impl PointerEvent {
    pub fn click(position: Vertex) -> Self {
        Self {
            kind: PointerKind::Click,
            position,
            target: None,
        }
    }

    pub fn double_click(position: Vertex) -> Self {
        Self {
            kind: PointerKind::DoubleClick,
            position,
            target: None,
        }
    }

    /// Click landing on an overlay
    pub fn on_overlay(position: Vertex, target: OverlayId) -> Self {
        Self {
            kind: PointerKind::Click,
            position,
            target: Some(target),
        }
    }
}

/// Visual options of an overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    pub fill_color: Option<String>,
    pub stroke_color: String,
    pub stroke_width: u32,
    pub opacity: f64,
    pub fill_opacity: f64,
    pub dashed: bool,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            fill_color: None,
            stroke_color: "#0000FF".to_string(),
            stroke_width: 3,
            opacity: 0.8,
            fill_opacity: 0.4,
            dashed: false,
        }
    }
}

/// Geometry of an overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OverlayShape {
    /// Filled outline; the ring is closed by the widget
    Polygon(Vec<Vertex>),
    /// Point marker
    Placemark(Vertex),
    /// Open line through the vertices
    Polyline(Vec<Vertex>),
}

/// An object drawn on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub shape: OverlayShape,
    pub style: OverlayStyle,
    /// Tooltip text
    pub hint: Option<String>,
}

impl Overlay {
    pub fn new(shape: OverlayShape, style: OverlayStyle) -> Self {
        Self {
            shape,
            style,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Capabilities required from an interactive map widget.
///
/// Methods take `&self`; implementations synchronize internally so a widget
/// can be shared between the drawing session, the field layer and the
/// pointer subscriptions that must be released on teardown.
pub trait MapWidget: Send + Sync {
    /// Add an overlay and return its handle
    fn add_overlay(&self, overlay: Overlay) -> Result<OverlayId, MapError>;

    /// Remove an overlay; unknown handles are ignored
    fn remove_overlay(&self, id: OverlayId);

    /// Replace the style of an existing overlay
    fn set_style(&self, id: OverlayId, style: OverlayStyle) -> Result<(), MapError>;

    /// Current viewport center
    fn center(&self) -> Vertex;

    /// Current zoom level
    fn zoom(&self) -> u8;

    /// Move the viewport
    fn set_view(&self, center: Vertex, zoom: u8);

    /// Fit the viewport to `bounds` leaving `margin` pixels around them
    fn fit_bounds(&self, bounds: Bounds, margin: u32);

    /// Start delivering pointer events of `kind`
    fn listen(&self, kind: PointerKind) -> ListenerId;

    /// Stop a subscription; unknown handles are ignored
    fn unlisten(&self, id: ListenerId);
}
