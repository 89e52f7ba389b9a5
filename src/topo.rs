use crate::types::County;
use anyhow::{anyhow, Result};
use geo::{LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use std::collections::HashMap;

/// A topology document. Counties share their boundary arcs: each geometry is
/// a list of arc indices, and the arcs are runs of coordinates, delta-encoded
/// when the document carries a quantization transform.
#[derive(Debug, Deserialize)]
pub struct Topology {
    pub transform: Option<Transform>,
    pub objects: HashMap<String, GeometryCollection>,
    pub arcs: Vec<Vec<Vec<f64>>>,
}

#[derive(Debug, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
pub struct GeometryCollection {
    #[serde(default)]
    pub geometries: Vec<TopoGeometry>,
}

/// One entry of a geometry collection. `arcs` stays raw JSON because its
/// nesting depth depends on the geometry kind.
#[derive(Debug, Deserialize)]
pub struct TopoGeometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub arcs: serde_json::Value,
}

impl Topology {
    /// Decode the named object collection into counties, preserving the
    /// collection's order.
    pub fn counties(&self, object_key: &str) -> Result<Vec<County>> {
        let collection = self.objects.get(object_key).ok_or_else(|| {
            anyhow!("Topology has no object collection named '{}'", object_key)
        })?;

        let arcs = self.decode_arcs();
        let mut counties = Vec::with_capacity(collection.geometries.len());

        for geometry in &collection.geometries {
            let fips = match geometry.id.as_ref().and_then(|id| id.as_u64()) {
                Some(id) => id as u32,
                None => continue, // Skip entries without a numeric id
            };

            let multi = match geometry.kind.as_str() {
                "Polygon" => {
                    let rings: Vec<Vec<i64>> = serde_json::from_value(geometry.arcs.clone())
                        .map_err(|e| anyhow!("Malformed Polygon arcs for id {}: {}", fips, e))?;
                    MultiPolygon::new(vec![assemble_polygon(&arcs, &rings)?])
                }
                "MultiPolygon" => {
                    let polygons: Vec<Vec<Vec<i64>>> =
                        serde_json::from_value(geometry.arcs.clone()).map_err(|e| {
                            anyhow!("Malformed MultiPolygon arcs for id {}: {}", fips, e)
                        })?;
                    let mut parts = Vec::with_capacity(polygons.len());
                    for rings in &polygons {
                        parts.push(assemble_polygon(&arcs, rings)?);
                    }
                    MultiPolygon::new(parts)
                }
                _ => continue, // Skip non-polygon geometries
            };

            counties.push(County {
                fips,
                geometry: multi,
                education: None,
            });
        }

        Ok(counties)
    }

    /// Expand every arc to absolute coordinates. Quantized arcs accumulate
    /// deltas and then map through the transform; unquantized arcs are
    /// already absolute.
    fn decode_arcs(&self) -> Vec<Vec<(f64, f64)>> {
        self.arcs
            .iter()
            .map(|arc| {
                let mut points = Vec::with_capacity(arc.len());
                match &self.transform {
                    Some(t) => {
                        let (mut x, mut y) = (0.0, 0.0);
                        for position in arc {
                            x += position[0];
                            y += position[1];
                            points.push((
                                x * t.scale[0] + t.translate[0],
                                y * t.scale[1] + t.translate[1],
                            ));
                        }
                    }
                    None => {
                        for position in arc {
                            points.push((position[0], position[1]));
                        }
                    }
                }
                points
            })
            .collect()
    }
}

fn assemble_polygon(arcs: &[Vec<(f64, f64)>], rings: &[Vec<i64>]) -> Result<Polygon<f64>> {
    let mut lines = Vec::with_capacity(rings.len());
    for ring in rings {
        lines.push(LineString::from(stitch_ring(arcs, ring)?));
    }
    // First ring is the exterior, the rest are holes
    if lines.is_empty() {
        return Ok(Polygon::new(LineString::new(vec![]), vec![]));
    }
    let exterior = lines.remove(0);
    Ok(Polygon::new(exterior, lines))
}

/// Stitch one ring from arc indices. Index `~i` selects arc `i` reversed,
/// and consecutive arcs share their junction point, which must not repeat.
fn stitch_ring(arcs: &[Vec<(f64, f64)>], indices: &[i64]) -> Result<Vec<(f64, f64)>> {
    let mut ring: Vec<(f64, f64)> = Vec::new();

    for &index in indices {
        let arc_index = if index < 0 { !index } else { index };
        let arc = arcs.get(arc_index as usize).ok_or_else(|| {
            anyhow!("Arc index {} out of bounds ({} arcs)", arc_index, arcs.len())
        })?;

        let skip = usize::from(!ring.is_empty());
        if index < 0 {
            ring.extend(arc.iter().rev().skip(skip).copied());
        } else {
            ring.extend(arc.iter().skip(skip).copied());
        }
    }

    Ok(ring)
}
