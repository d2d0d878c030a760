//! Manual coordinate entry
//!
//! Outlines can be typed as `lat,lng; lat,lng; ...`. Whitespace around the
//! separators is ignored and a single trailing `;` is tolerated. Any pair
//! that does not hold exactly two finite numbers rejects the whole input.

use agroavia_core::{ValidationError, Vertex};

/// Parse a `lat,lng; lat,lng; ...` list.
///
/// The vertex count is not checked here; a field outline additionally needs
/// at least three vertices.
pub fn parse_coordinates(input: &str) -> Result<Vec<Vertex>, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ValidationError::EmptyCoordinates);
    }
    let input = input.strip_suffix(';').unwrap_or(input);

    input.split(';').map(parse_pair).collect()
}

fn parse_pair(pair: &str) -> Result<Vertex, ValidationError> {
    let pair = pair.trim();
    let malformed = || ValidationError::MalformedCoordinates {
        pair: pair.to_string(),
    };

    let mut parts = pair.split(',').map(str::trim);
    let (Some(lat), Some(lng), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed());
    };
    let lat: f64 = lat.parse().map_err(|_| malformed())?;
    let lng: f64 = lng.parse().map_err(|_| malformed())?;
    let vertex = Vertex::new(lat, lng);
    if !vertex.is_finite() {
        return Err(malformed());
    }
    Ok(vertex)
}

/// Render vertices in the manual entry format
pub fn format_coordinates(vertices: &[Vertex]) -> String {
    vertices
        .iter()
        .map(|v| format!("{},{}", v.lat, v.lng))
        .collect::<Vec<_>>()
        .join("; ")
}
