//! Geo-polygon calculations
//!
//! Flat-Earth approximations used for field outlines:
//! - Polygon area in hectares (shoelace formula scaled at the latitude of
//!   the first vertex)
//! - Vertex centroid (arithmetic mean, not area-weighted)
//! - Polygon closing and bounding boxes
//!
//! Accuracy degrades for outlines spanning a large latitude range or
//! crossing the antimeridian. Out-of-range coordinates are not rejected;
//! they flow into the results as-is.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kilometres per degree of latitude (and of longitude at the equator)
pub const KM_PER_DEGREE: f64 = 111.0;

/// Hectares in one square kilometre
pub const HECTARES_PER_KM2: f64 = 100.0;

/// Minimum number of vertices of a field outline
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Fallback centroid when there is nothing to average (central Moscow)
pub const DEFAULT_CENTER: Vertex = Vertex::new(55.7558, 37.6173);

/// A point on the map in signed decimal degrees.
///
/// Serialized as a `[lat, lng]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Vertex {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
}

impl Vertex {
    /// Create a new vertex
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both coordinates are finite numbers
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl From<[f64; 2]> for Vertex {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Vertex> for [f64; 2] {
    fn from(v: Vertex) -> Self {
        [v.lat, v.lng]
    }
}

impl From<(f64, f64)> for Vertex {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Polygon area in hectares, rounded to two decimals.
///
/// The vertex list is treated as cyclic, so an explicit closing vertex is
/// optional. Fewer than three vertices yield exactly `0.0`.
pub fn polygon_area_hectares(vertices: &[Vertex]) -> f64 {
    let n = vertices.len();
    if n < MIN_POLYGON_VERTICES {
        return 0.0;
    }

    let mut twice_area = 0.0;
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        twice_area += a.lng * b.lat - b.lng * a.lat;
    }
    let square_degrees = twice_area.abs() / 2.0;

    let lat0 = vertices[0].lat.to_radians();
    let km2_per_square_degree = KM_PER_DEGREE * KM_PER_DEGREE * lat0.cos();

    round2(square_degrees * km2_per_square_degree * HECTARES_PER_KM2)
}

/// Arithmetic mean of the vertices, `None` for an empty slice
pub fn centroid(vertices: &[Vertex]) -> Option<Vertex> {
    if vertices.is_empty() {
        return None;
    }

    let (sum_lat, sum_lng) = vertices
        .iter()
        .fold((0.0, 0.0), |(lat, lng), v| (lat + v.lat, lng + v.lng));
    let n = vertices.len() as f64;

    Some(Vertex::new(sum_lat / n, sum_lng / n))
}

/// Arithmetic mean of the vertices, or `fallback` for an empty slice
pub fn centroid_or(vertices: &[Vertex], fallback: Vertex) -> Vertex {
    centroid(vertices).unwrap_or(fallback)
}

/// First and last vertex are coordinate-equal
pub fn is_closed(vertices: &[Vertex]) -> bool {
    match (vertices.first(), vertices.last()) {
        (Some(first), Some(last)) => vertices.len() > 1 && first == last,
        _ => false,
    }
}

/// Append a copy of the first vertex unless the outline is already closed.
///
/// Equality is exact, not tolerance based. Closing twice is a no-op.
pub fn close_polygon(mut vertices: Vec<Vertex>) -> Vec<Vertex> {
    if let Some(&first) = vertices.first() {
        if vertices.last() != Some(&first) {
            vertices.push(first);
        }
    }
    vertices
}

/// Axis-aligned bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// South-west corner
    pub min: Vertex,
    /// North-east corner
    pub max: Vertex,
}

impl Bounds {
    /// Bounding box of all vertices, `None` when there are none
    pub fn from_vertices<'a, I>(vertices: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Vertex>,
    {
        let mut iter = vertices.into_iter();
        let first = *iter.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for v in iter {
            bounds.min.lat = bounds.min.lat.min(v.lat);
            bounds.min.lng = bounds.min.lng.min(v.lng);
            bounds.max.lat = bounds.max.lat.max(v.lat);
            bounds.max.lng = bounds.max.lng.max(v.lng);
        }
        Some(bounds)
    }

    /// Midpoint of the box
    pub fn center(&self) -> Vertex {
        Vertex::new(
            (self.min.lat + self.max.lat) / 2.0,
            (self.min.lng + self.max.lng) / 2.0,
        )
    }
}
