//! Turning an outline and a form into a field record

use agroavia_core::{
    centroid_or, close_polygon, polygon_area_hectares, ValidationError, Vertex, DEFAULT_CENTER,
    MIN_POLYGON_VERTICES,
};
use agroavia_registry::{Field, FieldForm};
use chrono::{DateTime, Utc};

/// Build a new field from a working outline.
///
/// The outline is closed if its first and last vertex differ, then area and
/// center are computed from the closed ring. The area typed in the form is
/// ignored. An empty form customer falls back to `customer_id`.
pub fn assemble_field(
    id: String,
    vertices: &[Vertex],
    form: &FieldForm,
    customer_id: &str,
    now: DateTime<Utc>,
) -> Result<Field, ValidationError> {
    if vertices.len() < MIN_POLYGON_VERTICES {
        return Err(ValidationError::TooFewVertices {
            count: vertices.len(),
            required: MIN_POLYGON_VERTICES,
        });
    }
    form.validate()?;

    let coordinates = close_polygon(vertices.to_vec());
    let area = polygon_area_hectares(&coordinates);
    let center = centroid_or(&coordinates, DEFAULT_CENTER);

    Ok(Field {
        id,
        name: form.name.trim().to_string(),
        crop: form.crop.clone(),
        area,
        price: form.price,
        region: form.region.clone(),
        owner: form.owner.clone(),
        customer_id: non_empty_or(&form.customer_id, customer_id),
        processing_date: form.processing_date,
        status: form.status,
        coordinates,
        center,
        created_at: now,
        updated_at: now,
    })
}

/// Apply an edit form to an existing field.
///
/// Id, outline, center and creation time are kept; every form attribute,
/// including the area, overwrites the stored value.
pub fn apply_field_edit(
    existing: &Field,
    form: &FieldForm,
    now: DateTime<Utc>,
) -> Result<Field, ValidationError> {
    form.validate()?;
    Ok(Field {
        id: existing.id.clone(),
        name: form.name.trim().to_string(),
        crop: form.crop.clone(),
        area: form.area,
        price: form.price,
        region: form.region.clone(),
        owner: form.owner.clone(),
        customer_id: non_empty_or(&form.customer_id, &existing.customer_id),
        processing_date: form.processing_date,
        status: form.status,
        coordinates: existing.coordinates.clone(),
        center: existing.center,
        created_at: existing.created_at,
        updated_at: now,
    })
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agroavia_registry::FieldStatus;
    use chrono::Duration;

    fn form(name: &str) -> FieldForm {
        FieldForm {
            name: name.to_string(),
            ..FieldForm::default()
        }
    }

    fn square() -> Vec<Vertex> {
        vec![
            Vertex::new(55.0, 37.0),
            Vertex::new(55.0, 37.01),
            Vertex::new(55.01, 37.01),
            Vertex::new(55.01, 37.0),
        ]
    }

    #[test]
    fn test_assemble_closes_and_measures() {
        let now = Utc::now();
        let field = assemble_field("f1".into(), &square(), &form("Поле №2"), "c1", now).unwrap();

        assert_eq!(field.coordinates.len(), 5);
        assert_eq!(field.coordinates.first(), field.coordinates.last());
        assert_eq!(field.area, polygon_area_hectares(&square()));
        assert!(field.area > 0.0);
        assert_eq!(field.customer_id, "c1");
        assert_eq!(field.created_at, now);
        assert_eq!(field.updated_at, now);
    }

    #[test]
    fn test_assemble_keeps_closed_outline() {
        let mut closed = square();
        closed.push(closed[0]);
        let field =
            assemble_field("f1".into(), &closed, &form("Поле"), "c1", Utc::now()).unwrap();
        assert_eq!(field.coordinates.len(), 5);
    }

    #[test]
    fn test_assemble_rejects_bad_input() {
        let err = assemble_field("f1".into(), &square()[..2], &form("Поле"), "c1", Utc::now())
            .unwrap_err();
        assert!(matches!(err, ValidationError::TooFewVertices { count: 2, .. }));

        let err =
            assemble_field("f1".into(), &square(), &form("  "), "c1", Utc::now()).unwrap_err();
        assert_eq!(err, ValidationError::missing("name"));
    }

    #[test]
    fn test_form_customer_wins() {
        let mut form = form("Поле");
        form.customer_id = "c2".to_string();
        let field = assemble_field("f1".into(), &square(), &form, "c1", Utc::now()).unwrap();
        assert_eq!(field.customer_id, "c2");
    }

    #[test]
    fn test_edit_preserves_geometry_and_identity() {
        let created = Utc::now();
        let original = assemble_field("f1".into(), &square(), &form("Поле"), "c1", created).unwrap();

        let mut edit = FieldForm::from_field(&original);
        edit.name = "Южное".to_string();
        edit.area = 12.0;
        edit.status = FieldStatus::Processed;
        edit.customer_id.clear();

        let later = created + Duration::minutes(5);
        let updated = apply_field_edit(&original, &edit, later).unwrap();
        assert_eq!(updated.id, "f1");
        assert_eq!(updated.coordinates, original.coordinates);
        assert_eq!(updated.center, original.center);
        assert_eq!(updated.created_at, created);
        assert_eq!(updated.updated_at, later);
        assert_eq!(updated.area, 12.0);
        assert_eq!(updated.status, FieldStatus::Processed);
        assert_eq!(updated.customer_id, "c1");
    }
}
