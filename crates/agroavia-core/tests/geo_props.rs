use agroavia_core::geo::{
    centroid, centroid_or, close_polygon, is_closed, polygon_area_hectares, Vertex, DEFAULT_CENTER,
};
use proptest::prelude::*;

fn vertex() -> impl Strategy<Value = Vertex> {
    (-80.0f64..80.0, -179.0f64..179.0).prop_map(|(lat, lng)| Vertex::new(lat, lng))
}

/// Small outlines inside a narrow latitude band, like real fields
fn field_outline() -> impl Strategy<Value = Vec<Vertex>> {
    prop::collection::vec((55.0f64..55.05, 37.0f64..37.05), 3..12)
        .prop_map(|pairs| pairs.into_iter().map(Vertex::from).collect())
}

proptest! {
    #[test]
    fn area_is_never_negative(vertices in prop::collection::vec(vertex(), 0..16)) {
        let area = polygon_area_hectares(&vertices);
        prop_assert!(area >= 0.0);
        if vertices.len() < 3 {
            prop_assert_eq!(area, 0.0);
        }
    }

    #[test]
    fn area_survives_rotation(vertices in field_outline(), shift in 0usize..12) {
        let mut rotated = vertices.clone();
        let len = rotated.len();
        rotated.rotate_left(shift % len);

        let a = polygon_area_hectares(&vertices);
        let b = polygon_area_hectares(&rotated);
        // Only the latitude scale anchor moves, and it moves within the band
        prop_assert!((a - b).abs() <= a * 2e-3 + 0.02, "{} vs {}", a, b);
    }

    #[test]
    fn closing_is_idempotent(vertices in prop::collection::vec(vertex(), 1..16)) {
        let once = close_polygon(vertices.clone());
        prop_assert!(is_closed(&once) || once.len() == 1);
        prop_assert_eq!(close_polygon(once.clone()), once.clone());
        prop_assert!(once.len() == vertices.len() || once.len() == vertices.len() + 1);
        prop_assert_eq!(polygon_area_hectares(&once), polygon_area_hectares(&vertices));
    }

    #[test]
    fn centroid_is_coordinate_mean(vertices in prop::collection::vec(vertex(), 1..16)) {
        let c = centroid(&vertices).expect("non-empty");
        let n = vertices.len() as f64;
        let lat = vertices.iter().map(|v| v.lat).sum::<f64>() / n;
        let lng = vertices.iter().map(|v| v.lng).sum::<f64>() / n;
        prop_assert!((c.lat - lat).abs() < 1e-9);
        prop_assert!((c.lng - lng).abs() < 1e-9);
    }
}

#[test]
fn empty_centroid_falls_back_to_default_center() {
    assert_eq!(centroid_or(&[], DEFAULT_CENTER), DEFAULT_CENTER);
}
