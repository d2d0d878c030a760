//! Field workspace
//!
//! Orchestrates one user's view: the selected customer, the drawing session,
//! the field form, the field layer on the map and the selection. Every
//! user-facing outcome is published on the event bus as a notification;
//! failed operations leave the workspace unchanged.

use agroavia_core::{
    centroid_or, generate_id, AppEvent, Bounds, DrawingEvent, EventBus, MapEvent, MapError,
    Notification, NotificationLevel, ValidationError, Vertex, MIN_POLYGON_VERTICES,
};
use agroavia_registry::{
    demo, Customer, DeletePolicy, Field, FieldForm, FieldStatus, Order, Registry, Removal,
};
use agroavia_settings::{Config, FieldDefaults, MapSettings};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use crate::commit::{apply_field_edit, assemble_field};
use crate::coords::parse_coordinates;
use crate::error::{WorkspaceError, WorkspaceResult};
use crate::loader::MapLoader;
use crate::map::{MapWidget, PointerEvent, PointerKind};
use crate::renderer::FieldLayer;
use crate::session::{CancelOutcome, DrawingSession, PreviewStyle};

/// Outline loaded by [`FieldWorkspace::load_demo_polygon`]
pub const DEMO_POLYGON: [Vertex; 3] = [
    Vertex::new(55.7558, 37.6173),
    Vertex::new(55.7500, 37.6200),
    Vertex::new(55.7450, 37.6150),
];

/// What a pointer event did
#[derive(Debug, Clone, PartialEq)]
pub enum PointerOutcome {
    /// Nothing listens for this event
    Ignored,
    /// A vertex was appended; the working list has this many
    VertexAdded(usize),
    /// Drawing finished with this many vertices
    Finished(usize),
    /// A field polygon was clicked and selected
    Selected(String),
}

/// Interactive field management for one customer at a time
pub struct FieldWorkspace {
    registry: Arc<Registry>,
    bus: Arc<EventBus>,
    map_settings: MapSettings,
    field_defaults: FieldDefaults,
    notification_ms: u64,
    map: Option<Arc<dyn MapWidget>>,
    session: DrawingSession,
    layer: FieldLayer,
    form: FieldForm,
    editing: Option<String>,
    selected_field: Option<String>,
    selected_customer: Option<String>,
}

impl FieldWorkspace {
    /// Workspace without a map; manual coordinate entry works right away
    pub fn new(registry: Arc<Registry>, config: &Config) -> Self {
        let selected_customer = if registry.customers().contains(demo::DEMO_CUSTOMER_ID) {
            Some(demo::DEMO_CUSTOMER_ID.to_string())
        } else {
            registry.customers().all().into_iter().next().map(|c| c.id)
        };

        let mut workspace = Self {
            bus: registry.bus().clone(),
            registry,
            map_settings: config.map.clone(),
            field_defaults: config.fields.clone(),
            notification_ms: config.notifications.duration_ms,
            map: None,
            session: DrawingSession::new(PreviewStyle::from_palette(&config.palette)),
            layer: FieldLayer::new(config.palette.clone()),
            form: FieldForm::default(),
            editing: None,
            selected_field: None,
            selected_customer,
        };
        workspace.form = workspace.fresh_form();
        workspace
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn session(&self) -> &DrawingSession {
        &self.session
    }

    pub fn layer(&self) -> &FieldLayer {
        &self.layer
    }

    pub fn map(&self) -> Option<&Arc<dyn MapWidget>> {
        self.map.as_ref()
    }

    pub fn form(&self) -> &FieldForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FieldForm {
        &mut self.form
    }

    /// Id of the field being edited
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    // Map lifecycle

    /// Put a ready widget under the workspace and render all fields
    pub fn attach_map(&mut self, map: Arc<dyn MapWidget>) {
        self.detach_map();
        map.set_view(self.map_settings.default_center, self.map_settings.default_zoom);
        self.session.attach_map(map.clone());
        self.map = Some(map);
        self.bus.emit(AppEvent::Map(MapEvent::Loaded));
        self.redraw();
    }

    /// Remove everything the workspace drew and release the widget
    pub fn detach_map(&mut self) {
        if let Some(map) = self.map.take() {
            self.layer.clear(map.as_ref());
        }
        self.session.detach_map();
    }

    /// Load the widget through `loader`; degrade to manual entry on failure
    pub async fn connect(&mut self, loader: &MapLoader) -> bool {
        match loader.ensure_loaded().await {
            Ok(map) => {
                self.attach_map(map);
                true
            }
            Err(e) => {
                self.map_unavailable(&e);
                false
            }
        }
    }

    /// Report that no widget could be loaded
    pub fn map_unavailable(&mut self, error: &MapError) {
        self.bus.emit(AppEvent::Map(MapEvent::Unavailable {
            reason: error.to_string(),
        }));
        self.notify(
            NotificationLevel::Warning,
            "Map is unavailable; enter field coordinates manually",
        );
    }

    /// Re-render every field polygon; returns how many are on the map
    pub fn redraw(&mut self) -> usize {
        let Some(map) = self.map.clone() else {
            return 0;
        };
        let polygons = self.layer.redraw(map.as_ref(), &self.registry.fields().all());
        self.bus.emit(AppEvent::Map(MapEvent::Redrawn { polygons }));
        polygons
    }

    // Customers

    pub fn selected_customer(&self) -> Option<&str> {
        self.selected_customer.as_deref()
    }

    pub fn select_customer(&mut self, id: &str) -> WorkspaceResult<Customer> {
        let customer = self.report(self.registry.customer(id).map_err(Into::into))?;
        self.selected_customer = Some(customer.id.clone());
        if self.editing.is_none() {
            self.form.customer_id = customer.id.clone();
        }
        Ok(customer)
    }

    /// Fields of the selected customer
    pub fn customer_fields(&self) -> Vec<Field> {
        match &self.selected_customer {
            Some(id) => self.registry.fields_of(id),
            None => Vec::new(),
        }
    }

    /// Orders of the selected customer
    pub fn customer_orders(&self) -> Vec<Order> {
        match &self.selected_customer {
            Some(id) => self.registry.orders_of(id),
            None => Vec::new(),
        }
    }

    /// Delete a customer; the first remaining customer becomes selected
    /// when the selected one is removed
    pub fn delete_customer(
        &mut self,
        id: &str,
        policy: DeletePolicy,
    ) -> WorkspaceResult<Removal<Customer>> {
        let removal = self.report(self.registry.delete_customer(id, policy).map_err(Into::into))?;

        if self.selected_customer.as_deref() == Some(id) {
            self.selected_customer = self.registry.customers().all().into_iter().next().map(|c| c.id);
            if self.editing.is_none() {
                self.form.customer_id = self.selected_customer.clone().unwrap_or_default();
            }
        }
        self.forget_missing_selection();
        self.redraw();
        self.notify(
            NotificationLevel::Success,
            format!("Customer \"{}\" deleted", removal.record.name),
        );
        Ok(removal)
    }

    // Drawing

    /// Enter drawing mode; requires a map
    pub fn start_drawing(&mut self) -> WorkspaceResult<()> {
        if let Err(e) = self.session.start() {
            self.notify(NotificationLevel::Error, "Map is not ready for drawing");
            return Err(e.into());
        }
        if self.editing.take().is_some() {
            self.form = self.fresh_form();
        }
        self.form.area = 0.0;
        self.bus.emit(AppEvent::Drawing(DrawingEvent::Started));
        self.notify(
            NotificationLevel::Info,
            "Drawing mode on: click the map to add outline points, double-click to finish",
        );
        Ok(())
    }

    /// Route a pointer event from the widget
    pub fn handle_pointer(&mut self, event: PointerEvent) -> WorkspaceResult<PointerOutcome> {
        if self.session.is_drawing() {
            return match event.kind {
                PointerKind::Click => Ok(self.add_vertex(event.position)),
                PointerKind::DoubleClick => self.finish_drawing().map(PointerOutcome::Finished),
            };
        }

        let target = event
            .target
            .and_then(|overlay| self.layer.field_at(overlay))
            .map(str::to_string);
        match (event.kind, target) {
            (PointerKind::Click, Some(field_id)) => {
                self.select_field(&field_id)?;
                Ok(PointerOutcome::Selected(field_id))
            }
            _ => Ok(PointerOutcome::Ignored),
        }
    }

    fn add_vertex(&mut self, vertex: Vertex) -> PointerOutcome {
        let Some(count) = self.session.add_vertex(vertex) else {
            return PointerOutcome::Ignored;
        };
        let area = self.session.live_area();
        if let Some(area) = area {
            self.form.area = area;
        }
        self.bus
            .emit(AppEvent::Drawing(DrawingEvent::VertexAdded { count, area }));
        PointerOutcome::VertexAdded(count)
    }

    /// Finish drawing; with fewer than three points drawing continues
    pub fn finish_drawing(&mut self) -> WorkspaceResult<usize> {
        match self.session.finish() {
            Ok(count) => {
                self.bus
                    .emit(AppEvent::Drawing(DrawingEvent::Finished { count }));
                self.notify(
                    NotificationLevel::Success,
                    format!("Drawing finished with {} points", count),
                );
                Ok(count)
            }
            Err(e) => {
                self.notify(
                    NotificationLevel::Warning,
                    format!("An outline needs at least {} points", MIN_POLYGON_VERTICES),
                );
                Err(e.into())
            }
        }
    }

    /// Leave drawing mode; short outlines are discarded, usable ones kept
    pub fn cancel_drawing(&mut self) -> CancelOutcome {
        let outcome = self.session.cancel();
        match outcome {
            CancelOutcome::Discarded => {
                self.form.area = 0.0;
                self.bus.emit(AppEvent::Drawing(DrawingEvent::Discarded));
                self.notify(
                    NotificationLevel::Info,
                    "Drawing cancelled: not enough points for an outline",
                );
            }
            CancelOutcome::Preserved(count) => {
                self.bus
                    .emit(AppEvent::Drawing(DrawingEvent::Preserved { count }));
            }
        }
        outcome
    }

    /// Replace the working outline with typed `lat,lng; ...` pairs
    pub fn load_coordinates(&mut self, input: &str) -> WorkspaceResult<f64> {
        let parsed = parse_coordinates(input);
        let vertices = match parsed {
            Ok(vertices) => vertices,
            Err(ValidationError::EmptyCoordinates) => {
                self.notify(NotificationLevel::Error, "Enter coordinates");
                return Err(ValidationError::EmptyCoordinates.into());
            }
            Err(e) => {
                self.notify(
                    NotificationLevel::Error,
                    "Malformed coordinates; use: 55.7558,37.6173; 55.7500,37.6200; 55.7450,37.6150",
                );
                return Err(e.into());
            }
        };
        let area = self.load_vertices(vertices)?;
        self.notify(
            NotificationLevel::Success,
            format!(
                "Outline entered: {} points, {:.2} ha",
                self.session.vertices().len(),
                area
            ),
        );
        Ok(area)
    }

    /// Load a small sample outline near the default map center
    pub fn load_demo_polygon(&mut self) -> WorkspaceResult<f64> {
        let area = self.load_vertices(DEMO_POLYGON.to_vec())?;
        self.notify(
            NotificationLevel::Success,
            format!("Demo outline created: {:.2} ha", area),
        );
        Ok(area)
    }

    fn load_vertices(&mut self, vertices: Vec<Vertex>) -> WorkspaceResult<f64> {
        let area = match self.session.load_vertices(vertices) {
            Ok(area) => area,
            Err(e) => {
                self.notify(
                    NotificationLevel::Error,
                    format!("An outline needs at least {} points", MIN_POLYGON_VERTICES),
                );
                return Err(e.into());
            }
        };
        self.form.area = area;
        self.bus.emit(AppEvent::Drawing(DrawingEvent::VerticesLoaded {
            count: self.session.vertices().len(),
            area,
        }));
        Ok(area)
    }

    // Fields

    /// Commit the working outline and the form as a new field
    pub fn create_field(&mut self) -> WorkspaceResult<Field> {
        if !self.session.has_polygon() {
            self.notify(
                NotificationLevel::Error,
                "Draw an outline on the map or enter coordinates first",
            );
            return Err(ValidationError::TooFewVertices {
                count: self.session.vertices().len(),
                required: MIN_POLYGON_VERTICES,
            }
            .into());
        }

        let customer = self.selected_customer.clone().unwrap_or_default();
        let assembled = assemble_field(
            generate_id(),
            self.session.vertices(),
            &self.form,
            &customer,
            Utc::now(),
        );
        let field = self.report(assembled.map_err(Into::into))?;

        self.registry.add_field(field.clone());
        self.session.clear();
        self.bus.emit(AppEvent::Drawing(DrawingEvent::Cleared));
        self.form = self.fresh_form();
        self.redraw();
        self.notify(
            NotificationLevel::Success,
            format!("Field \"{}\" created", field.name),
        );
        Ok(field)
    }

    /// Open a field in the form for editing; drawing is stopped
    pub fn edit_field(&mut self, id: &str) -> WorkspaceResult<()> {
        let field = self.report(self.registry.field(id).map_err(Into::into))?;
        if self.session.is_drawing() {
            self.cancel_drawing();
        }
        self.form = FieldForm::from_field(&field);
        if self.form.customer_id.is_empty() {
            self.form.customer_id = self.selected_customer.clone().unwrap_or_default();
        }
        self.editing = Some(field.id);
        Ok(())
    }

    /// Save the form over the field being edited
    pub fn update_field(&mut self) -> WorkspaceResult<Field> {
        let Some(id) = self.editing.clone() else {
            self.notify(NotificationLevel::Error, "No field is selected for editing");
            return Err(WorkspaceError::NotEditing);
        };
        let existing = self.report(self.registry.field(&id).map_err(Into::into))?;
        let updated = self.report(apply_field_edit(&existing, &self.form, Utc::now()).map_err(Into::into))?;
        self.report(self.registry.replace_field(updated.clone()).map_err(Into::into))?;

        self.editing = None;
        self.form = self.fresh_form();
        self.redraw();
        self.notify(
            NotificationLevel::Success,
            format!("Field \"{}\" updated", updated.name),
        );
        Ok(updated)
    }

    /// Abandon an edit and reset the form
    pub fn cancel_edit(&mut self) {
        if self.editing.take().is_some() {
            self.form = self.fresh_form();
        }
    }

    /// Delete a field, clearing it from the selection and the form
    pub fn delete_field(&mut self, id: &str, policy: DeletePolicy) -> WorkspaceResult<Removal<Field>> {
        let removal = self.report(self.registry.delete_field(id, policy).map_err(Into::into))?;
        if self.selected_field.as_deref() == Some(id) {
            self.selected_field = None;
        }
        if self.editing.as_deref() == Some(id) {
            self.cancel_edit();
        }
        self.redraw();
        self.notify(NotificationLevel::Success, "Field deleted");
        Ok(removal)
    }

    /// Make a field the detail-view selection
    pub fn select_field(&mut self, id: &str) -> WorkspaceResult<Field> {
        let field = self.report(self.registry.field(id).map_err(Into::into))?;
        self.selected_field = Some(field.id.clone());
        Ok(field)
    }

    /// The selected field as currently stored
    pub fn selected_field(&self) -> Option<Field> {
        self.selected_field
            .as_deref()
            .and_then(|id| self.registry.fields().get(id))
    }

    pub fn clear_selection(&mut self) {
        self.selected_field = None;
    }

    /// Place an order for a field on behalf of the selected customer
    pub fn create_order(&mut self, field_id: &str) -> WorkspaceResult<Order> {
        let order = self.report(
            self.registry
                .create_order(field_id, self.selected_customer.as_deref())
                .map_err(Into::into),
        )?;
        self.notify(
            NotificationLevel::Success,
            format!("Order created for field \"{}\"", order.field_name),
        );
        Ok(order)
    }

    // Viewport

    /// Center on a field, zoom in and highlight it.
    ///
    /// Returns how long the highlight should stay before
    /// [`FieldWorkspace::reset_highlight`] is called.
    pub fn show_on_map(&mut self, id: &str) -> WorkspaceResult<Duration> {
        let map = self.require_map()?;
        let field = self.report(self.registry.field(id).map_err(Into::into))?;

        let center = centroid_or(&field.coordinates, self.map_settings.default_center);
        let zoom = map
            .zoom()
            .saturating_add(self.map_settings.focus_zoom_step)
            .min(self.map_settings.max_zoom);
        map.set_view(center, zoom);
        self.layer.highlight(map.as_ref(), &field);

        self.bus.emit(AppEvent::Map(MapEvent::Focused {
            field_id: field.id.clone(),
        }));
        self.notify(
            NotificationLevel::Info,
            format!("Map centered on field \"{}\"", field.name),
        );
        Ok(Duration::from_millis(self.map_settings.highlight_duration_ms))
    }

    /// Restore the outline of the highlighted field
    pub fn reset_highlight(&mut self) {
        let Some(map) = self.map.clone() else {
            return;
        };
        let status: Option<FieldStatus> = self
            .layer
            .highlighted()
            .and_then(|id| self.registry.fields().get(id))
            .map(|f| f.status);
        self.layer.reset_highlight(map.as_ref(), status);
    }

    /// Fit the viewport to all outlines of the selected customer
    pub fn show_all_fields(&mut self) -> WorkspaceResult<usize> {
        let map = self.require_map()?;
        let fields = self.customer_fields();
        if fields.is_empty() {
            self.notify(NotificationLevel::Warning, "No fields to show");
            return Err(WorkspaceError::NothingToShow);
        }
        let Some(bounds) = Bounds::from_vertices(fields.iter().flat_map(|f| f.coordinates.iter()))
        else {
            self.notify(NotificationLevel::Warning, "The fields have no coordinates to show");
            return Err(WorkspaceError::NothingToShow);
        };

        map.fit_bounds(bounds, self.map_settings.bounds_margin);
        self.notify(
            NotificationLevel::Success,
            format!("Showing all customer fields ({})", fields.len()),
        );
        Ok(fields.len())
    }

    // Helpers

    fn require_map(&mut self) -> WorkspaceResult<Arc<dyn MapWidget>> {
        match self.map.clone() {
            Some(map) => Ok(map),
            None => {
                self.notify(NotificationLevel::Error, "Map is not ready");
                Err(MapError::NotReady.into())
            }
        }
    }

    fn fresh_form(&self) -> FieldForm {
        let status = self
            .field_defaults
            .status
            .parse::<FieldStatus>()
            .unwrap_or_default();
        FieldForm {
            name: format!("Поле №{}", self.registry.fields().len() + 1),
            crop: self.field_defaults.crop.clone(),
            area: 0.0,
            price: self.field_defaults.price,
            region: self.field_defaults.region.clone(),
            owner: String::new(),
            customer_id: self.selected_customer.clone().unwrap_or_default(),
            processing_date: Some(Utc::now().date_naive()),
            status,
        }
    }

    fn forget_missing_selection(&mut self) {
        if let Some(id) = &self.selected_field {
            if !self.registry.fields().contains(id) {
                self.selected_field = None;
            }
        }
        if let Some(id) = &self.editing {
            if !self.registry.fields().contains(id) {
                self.cancel_edit();
            }
        }
    }

    /// Publish a failure as an error notification and pass it on
    fn report<T>(&self, result: WorkspaceResult<T>) -> WorkspaceResult<T> {
        if let Err(e) = &result {
            self.notify(NotificationLevel::Error, e.to_string());
        }
        result
    }

    fn notify(&self, level: NotificationLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            NotificationLevel::Error => tracing::error!("{}", message),
            NotificationLevel::Warning => tracing::warn!("{}", message),
            NotificationLevel::Info | NotificationLevel::Success => tracing::info!("{}", message),
        }
        self.bus.emit(AppEvent::Notification(
            Notification::new(level, message).with_duration(self.notification_ms),
        ));
    }
}

impl Drop for FieldWorkspace {
    fn drop(&mut self) {
        self.detach_map();
    }
}

impl std::fmt::Debug for FieldWorkspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldWorkspace")
            .field("session", &self.session)
            .field("map", &self.map.is_some())
            .field("editing", &self.editing)
            .field("selected_field", &self.selected_field)
            .field("selected_customer", &self.selected_customer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessMap;
    use agroavia_core::{EventCategory, EventFilter};
    use parking_lot::Mutex;

    fn workspace() -> (FieldWorkspace, HeadlessMap) {
        let registry = Arc::new(Registry::in_memory(Arc::new(EventBus::new())));
        registry.seed_demo();
        let mut ws = FieldWorkspace::new(registry, &Config::default());
        let map = HeadlessMap::default();
        ws.attach_map(Arc::new(map.clone()));
        (ws, map)
    }

    fn notifications(ws: &FieldWorkspace) -> Arc<Mutex<Vec<Notification>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        ws.registry().bus().subscribe(
            EventFilter::Categories(vec![EventCategory::Notification]),
            move |event| {
                if let AppEvent::Notification(n) = event {
                    sink.lock().push(n);
                }
            },
        );
        seen
    }

    #[test]
    fn test_defaults() {
        let (ws, map) = workspace();
        assert_eq!(ws.selected_customer(), Some("customer_1"));
        assert_eq!(ws.form().name, "Поле №2");
        assert_eq!(ws.form().customer_id, "customer_1");
        assert_eq!(ws.layer().len(), 1);
        assert_eq!(map.zoom(), 10);
    }

    #[test]
    fn test_start_without_map_fails() {
        let registry = Arc::new(Registry::in_memory(Arc::new(EventBus::new())));
        let mut ws = FieldWorkspace::new(registry, &Config::default());
        let seen = notifications(&ws);

        let err = ws.start_drawing().unwrap_err();
        assert!(err.is_map_error());
        assert_eq!(seen.lock()[0].level, NotificationLevel::Error);
    }

    #[test]
    fn test_live_area_follows_clicks() {
        let (mut ws, _map) = workspace();
        ws.start_drawing().unwrap();
        for v in [
            Vertex::new(55.0, 37.0),
            Vertex::new(55.0, 37.01),
        ] {
            ws.handle_pointer(PointerEvent::click(v)).unwrap();
        }
        assert_eq!(ws.form().area, 0.0);

        let outcome = ws
            .handle_pointer(PointerEvent::click(Vertex::new(55.01, 37.01)))
            .unwrap();
        assert_eq!(outcome, PointerOutcome::VertexAdded(3));
        assert!(ws.form().area > 0.0);
    }

    #[test]
    fn test_double_click_with_two_points_keeps_drawing() {
        let (mut ws, _map) = workspace();
        let seen = notifications(&ws);
        ws.start_drawing().unwrap();
        ws.handle_pointer(PointerEvent::click(Vertex::new(55.0, 37.0)))
            .unwrap();
        ws.handle_pointer(PointerEvent::click(Vertex::new(55.0, 37.01)))
            .unwrap();

        assert!(ws
            .handle_pointer(PointerEvent::double_click(Vertex::new(55.0, 37.01)))
            .is_err());
        assert!(ws.session().is_drawing());
        assert_eq!(
            seen.lock().last().map(|n| n.level),
            Some(NotificationLevel::Warning)
        );
    }

    #[test]
    fn test_bad_coordinates_change_nothing() {
        let (mut ws, map) = workspace();
        ws.load_demo_polygon().unwrap();
        let before = ws.session().vertices().to_vec();
        let overlays = map.overlay_count();

        assert!(ws.load_coordinates("55.1,37.1; bad; 55.3,37.3").is_err());
        assert!(ws.load_coordinates("55.1,37.1; 55.3,37.3").is_err());
        assert!(ws.load_coordinates("").is_err());
        assert_eq!(ws.session().vertices(), before.as_slice());
        assert_eq!(map.overlay_count(), overlays);
    }

    #[test]
    fn test_edit_and_update_field() {
        let (mut ws, _map) = workspace();
        ws.edit_field("field_1").unwrap();
        assert_eq!(ws.editing(), Some("field_1"));
        assert_eq!(ws.form().name, "Поле №1");

        ws.form_mut().name = "Поле у реки".to_string();
        ws.form_mut().status = FieldStatus::Processed;
        let updated = ws.update_field().unwrap();
        assert_eq!(updated.name, "Поле у реки");
        assert_eq!(updated.coordinates.len(), 4);
        assert_eq!(ws.editing(), None);
        assert!(matches!(ws.update_field(), Err(WorkspaceError::NotEditing)));
    }

    #[test]
    fn test_polygon_click_selects_field() {
        let (mut ws, map) = workspace();
        let overlay = ws.layer().overlay_of("field_1").unwrap();
        let event = map.click_overlay(overlay).unwrap();

        let outcome = ws.handle_pointer(event).unwrap();
        assert_eq!(outcome, PointerOutcome::Selected("field_1".to_string()));
        assert_eq!(ws.selected_field().map(|f| f.id), Some("field_1".to_string()));
    }

    #[test]
    fn test_show_on_map_zooms_and_highlights() {
        let (mut ws, map) = workspace();
        let duration = ws.show_on_map("field_1").unwrap();
        assert_eq!(duration, Duration::from_millis(3000));
        assert_eq!(map.zoom(), 12);
        assert_eq!(ws.layer().highlighted(), Some("field_1"));

        ws.reset_highlight();
        assert_eq!(ws.layer().highlighted(), None);
    }

    #[test]
    fn test_show_on_map_respects_configured_max_zoom() {
        let registry = Arc::new(Registry::in_memory(Arc::new(EventBus::new())));
        registry.seed_demo();
        let mut config = Config::default();
        config.map.max_zoom = 11;
        let mut ws = FieldWorkspace::new(registry, &config);
        let map = HeadlessMap::default();
        ws.attach_map(Arc::new(map.clone()));

        ws.show_on_map("field_1").unwrap();
        assert_eq!(map.zoom(), 11);
        ws.show_on_map("field_1").unwrap();
        assert_eq!(map.zoom(), 11);
    }

    #[test]
    fn test_notifications_carry_configured_duration() {
        let registry = Arc::new(Registry::in_memory(Arc::new(EventBus::new())));
        registry.seed_demo();
        let mut config = Config::default();
        config.notifications.duration_ms = 1200;
        let mut ws = FieldWorkspace::new(registry, &config);
        let seen = notifications(&ws);

        assert!(ws.start_drawing().is_err());
        let seen = seen.lock();
        assert_eq!(seen[0].level, NotificationLevel::Error);
        assert!(seen.iter().all(|n| n.duration_ms == 1200));
    }

    #[test]
    fn test_show_all_fields() {
        let (mut ws, map) = workspace();
        assert_eq!(ws.show_all_fields().unwrap(), 1);
        let (bounds, margin) = map.last_fit().unwrap();
        assert_eq!(margin, 50);
        assert_eq!(bounds.max.lat, 55.7558);
        assert_eq!(bounds.min.lng, 37.615);

        ws.select_customer("customer_2").unwrap();
        assert!(matches!(
            ws.show_all_fields(),
            Err(WorkspaceError::NothingToShow)
        ));
    }

    #[test]
    fn test_delete_selected_customer_selects_next() {
        let (mut ws, _map) = workspace();
        ws.select_field("field_1").unwrap();
        ws.delete_customer("customer_1", DeletePolicy::Cascade)
            .unwrap();

        assert_eq!(ws.selected_customer(), Some("customer_2"));
        assert_eq!(ws.form().customer_id, "customer_2");
        assert!(ws.selected_field().is_none());
        assert!(ws.layer().is_empty());
    }

    #[test]
    fn test_create_order_uses_selected_customer() {
        let (mut ws, _map) = workspace();
        ws.select_customer("customer_2").unwrap();
        let order = ws.create_order("field_1").unwrap();
        assert_eq!(order.customer_id, "customer_2");
    }
}
