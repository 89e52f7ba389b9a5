use crate::config::AppConfig;
use crate::scale::QuantizeScale;
use crate::tooltip::{Overlay, Tooltip};
use crate::types::County;
use anyhow::Result;
use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::contains::Contains;
use geo::{Point, Rect};
use rstar::{RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

// Wrapper for RTree indexing
struct CountyIndex {
    index: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for CountyIndex {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

pub struct AppState {
    pub counties: Vec<County>,
    pub tree: RTree<CountyIndex>,
    pub scale: QuantizeScale,
    pub config: AppConfig,
}

#[derive(Deserialize)]
pub struct QueryParams {
    x: f64,
    y: f64,
}

#[derive(Serialize)]
pub struct HoverResponse {
    #[serde(flatten)]
    overlay: Overlay,
    fill: String,
}

pub async fn start_server(config: AppConfig, counties: Vec<County>) -> Result<()> {
    println!("Building spatial index for {} counties...", counties.len());
    let tree = build_index(&counties);
    println!("Spatial index built.");

    let scale = QuantizeScale::from_counties(&counties);

    let state = Arc::new(AppState {
        counties,
        tree,
        scale,
        config: config.clone(),
    });

    let port = config.server.port;
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    println!("Starting server on http://{}", addr);

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Index the counties by bounding box in source coordinates; hover queries
/// arrive in screen coordinates and are un-scaled before the lookup.
fn build_index(counties: &[County]) -> RTree<CountyIndex> {
    let items: Vec<CountyIndex> = counties
        .iter()
        .enumerate()
        .map(|(index, county)| {
            let rect = county.geometry.bounding_rect().unwrap_or(Rect::new(
                geo::Coord { x: 0.0, y: 0.0 },
                geo::Coord { x: 0.0, y: 0.0 },
            ));
            CountyIndex {
                index,
                aabb: AABB::from_corners(
                    [rect.min().x, rect.min().y],
                    [rect.max().x, rect.max().y],
                ),
            }
        })
        .collect();

    RTree::bulk_load(items)
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let site_service = ServeDir::new(&state.config.output.site_dir);

    Router::new()
        .route("/api/query", get(query_handler))
        .fallback_service(site_service)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn query_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> Json<Option<HoverResponse>> {
    // The rendered paths were scaled on the way out, so divide the pointer
    // position back into source coordinates for the containment test.
    let render = &state.config.render;
    let point = Point::new(params.x / render.scale_x, params.y / render.scale_y);
    let envelope = AABB::from_point([point.x(), point.y()]);

    let candidates = state.tree.locate_in_envelope_intersecting(&envelope);

    for candidate in candidates {
        if let Some(county) = state.counties.get(candidate.index) {
            if county.geometry.contains(&point) {
                let mut tooltip = Tooltip::new();
                tooltip.pointer_enter(county, params.x, params.y);

                let overlay = match tooltip.overlay() {
                    Some(overlay) => overlay.clone(),
                    None => continue,
                };
                let fill = state
                    .scale
                    .color(county.education.as_ref().map(|e| e.bachelors_or_higher))
                    .to_string();

                return Json(Some(HoverResponse { overlay, fill }));
            }
        }
    }

    Json(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InputConfig, OutputConfig, RenderConfig, ServerConfig};
    use crate::types::AttainmentRecord;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use geo::{LineString, MultiPolygon, Polygon};
    use tower::util::ServiceExt;

    fn square_county(fips: u32, size: f64, education: Option<f64>) -> County {
        County {
            fips,
            geometry: MultiPolygon::new(vec![Polygon::new(
                LineString::from(vec![(0.0, 0.0), (size, 0.0), (size, size), (0.0, size)]),
                vec![],
            )]),
            education: education.map(|value| AttainmentRecord {
                fips,
                state: "Alabama".to_string(),
                area_name: "Autauga County".to_string(),
                bachelors_or_higher: value,
            }),
        }
    }

    fn test_state(counties: Vec<County>) -> Arc<AppState> {
        let config = AppConfig {
            input: InputConfig {
                education_url: "http://localhost/education.json".to_string(),
                counties_url: "http://localhost/counties.json".to_string(),
                counties_object: "counties".to_string(),
            },
            render: RenderConfig {
                width: 800.0,
                height: 400.0,
                margin: 20.0,
                scale_x: 0.82,
                scale_y: 0.62,
            },
            output: OutputConfig {
                site_dir: std::env::temp_dir(),
            },
            server: ServerConfig { port: 0 },
        };

        let tree = build_index(&counties);
        let scale = QuantizeScale::from_counties(&counties);

        Arc::new(AppState {
            counties,
            tree,
            scale,
            config,
        })
    }

    async fn query(app: Router, x: f64, y: f64) -> serde_json::Value {
        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/query?x={}&y={}", x, y))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn hover_inside_a_county_answers_its_overlay() {
        let state = test_state(vec![square_county(1001, 10.0, Some(20.9))]);
        let app = build_router(state);

        // Screen (4.1, 3.1) un-scales to source (5.0, 5.0), inside the square
        let value = query(app, 4.1, 3.1).await;

        assert_eq!(value["fips"], 1001);
        assert_eq!(value["opacity"], 1.0);
        assert_eq!(value["left"], 9.1);
        assert_eq!(value["area"], "Autauga County, Alabama");
        assert_eq!(value["education"], 20.9);
        assert_eq!(value["fill"], "#00441B");
    }

    #[tokio::test]
    async fn hover_outside_every_county_answers_null() {
        let state = test_state(vec![square_county(1001, 10.0, Some(20.9))]);
        let app = build_router(state);

        let value = query(app, 500.0, 300.0).await;
        assert!(value.is_null());
    }

    #[tokio::test]
    async fn hover_over_an_unmatched_county_reports_no_data() {
        let state = test_state(vec![square_county(2013, 10.0, None)]);
        let app = build_router(state);

        let value = query(app, 4.1, 3.1).await;

        assert_eq!(value["fips"], 2013);
        assert_eq!(value["education"], serde_json::Value::Null);
        assert_eq!(value["education_text"], "no data");
        assert_eq!(value["fill"], crate::scale::NO_DATA_COLOR);
    }
}
