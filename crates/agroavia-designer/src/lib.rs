//! # AgroAviaTech Designer
//!
//! Field outline drawing and map presentation for AgroAviaTech. Users draw
//! field boundaries on a map widget or type them in, review the live area,
//! and commit the outline together with the field form as a stored field.
//!
//! ## Core Components
//!
//! - **Map widget**: [`MapWidget`] is the contract of an external map
//!   component; [`HeadlessMap`] implements it in memory
//! - **Loader**: [`MapLoader`] loads the widget once and shares the result
//! - **Drawing session**: [`DrawingSession`] collects vertices and keeps a
//!   preview overlay in sync
//! - **Field layer**: [`FieldLayer`] renders stored fields colored by status
//! - **Workspace**: [`FieldWorkspace`] ties the pieces to the registry and
//!   reports every outcome on the event bus
//!
//! ## Architecture
//!
//! ```text
//! FieldWorkspace
//!   ├── DrawingSession (vertices, preview, pointer capture)
//!   ├── FieldLayer (field polygons, highlight)
//!   ├── FieldForm (attributes being created or edited)
//!   └── Registry (fields, orders, customers)
//!
//! MapLoader ──> Arc<dyn MapWidget>
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agroavia_designer::{FieldWorkspace, HeadlessMap};
//!
//! let mut workspace = FieldWorkspace::new(registry, &config);
//! workspace.attach_map(Arc::new(HeadlessMap::default()));
//! workspace.load_coordinates("55.7558,37.6173; 55.75,37.62; 55.745,37.615")?;
//! let field = workspace.create_field()?;
//! ```

pub mod commit;
pub mod coords;
pub mod error;
pub mod headless;
pub mod loader;
pub mod map;
pub mod renderer;
pub mod session;
pub mod workspace;

pub use commit::{apply_field_edit, assemble_field};
pub use coords::{format_coordinates, parse_coordinates};
pub use error::{WorkspaceError, WorkspaceResult};
pub use headless::{HeadlessLoader, HeadlessMap};
pub use loader::{MapLoader, WidgetLoader};
pub use map::{
    ListenerId, MapWidget, Overlay, OverlayId, OverlayShape, OverlayStyle, PointerEvent,
    PointerKind,
};
pub use renderer::{FieldLayer, HIGHLIGHT_STROKE, HIGHLIGHT_WIDTH};
pub use session::{CancelOutcome, DrawingSession, PointerCapture, PreviewStyle, SessionState};
pub use workspace::{FieldWorkspace, PointerOutcome, DEMO_POLYGON};
