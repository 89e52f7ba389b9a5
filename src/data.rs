use crate::config::AppConfig;
use crate::join;
use crate::topo::Topology;
use crate::types::{AttainmentRecord, County};
use anyhow::{anyhow, Context, Result};
use geo::MultiPolygon;
use geojson::GeoJson;

pub async fn load_data(config: &AppConfig) -> Result<Vec<County>> {
    println!("Loading data...");

    let client = reqwest::Client::new();

    // The statistics and the geometry are independent documents; fetch both
    // concurrently and join once the two are in.
    let (records, geometry_doc) = tokio::try_join!(
        fetch_education(&client, &config.input.education_url),
        fetch_body(&client, &config.input.counties_url),
    )?;
    println!("Loaded education data for {} counties", records.len());

    let mut counties = parse_geometry(&geometry_doc, &config.input.counties_object)?;
    println!("Loaded geometry for {} counties", counties.len());

    let matched = join::merge_education(&mut counties, records);
    println!("Joined education data onto {} counties", matched);

    Ok(counties)
}

async fn fetch_education(client: &reqwest::Client, url: &str) -> Result<Vec<AttainmentRecord>> {
    let records = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch education data from {}", url))?
        .error_for_status()
        .context("Education endpoint answered with an error status")?
        .json::<Vec<AttainmentRecord>>()
        .await
        .context("Failed to decode education JSON")?;
    Ok(records)
}

async fn fetch_body(client: &reqwest::Client, url: &str) -> Result<String> {
    let body = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch county geometry from {}", url))?
        .error_for_status()
        .context("Geometry endpoint answered with an error status")?
        .text()
        .await
        .context("Failed to read geometry response body")?;
    Ok(body)
}

/// Parse the counties document, dispatching on its `type` field: a topology
/// document or a plain GeoJSON FeatureCollection.
pub fn parse_geometry(body: &str, object_key: &str) -> Result<Vec<County>> {
    let value: serde_json::Value =
        serde_json::from_str(body).context("Counties document is not valid JSON")?;
    let kind = value.get("type").and_then(|t| t.as_str()).unwrap_or("");

    match kind {
        "Topology" => {
            let topology: Topology =
                serde_json::from_value(value).context("Failed to parse topology document")?;
            topology.counties(object_key)
        }
        "FeatureCollection" => parse_feature_collection(value),
        other => Err(anyhow!("Unsupported counties format: {:?}", other)),
    }
}

fn parse_feature_collection(value: serde_json::Value) -> Result<Vec<County>> {
    let geojson = GeoJson::from_json_value(value).context("Failed to parse GeoJSON")?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("GeoJSON must be a FeatureCollection")),
    };

    let mut counties = Vec::new();

    for feature in collection.features {
        let fips = match feature_fips(&feature) {
            Some(fips) => fips,
            None => continue, // Skip features without a numeric id
        };

        let geometry = match feature.geometry {
            Some(geometry) => {
                let converted: geo::Geometry<f64> = geometry
                    .value
                    .try_into()
                    .map_err(|e| anyhow!("Failed to convert geojson geometry: {:?}", e))?;

                match converted {
                    geo::Geometry::MultiPolygon(mp) => mp,
                    geo::Geometry::Polygon(p) => MultiPolygon::new(vec![p]),
                    _ => continue, // Skip points/lines
                }
            }
            None => continue,
        };

        counties.push(County {
            fips,
            geometry,
            education: None,
        });
    }

    Ok(counties)
}

/// County ids sit in the feature id for the usual counties documents, with
/// an `id` property as the fallback.
fn feature_fips(feature: &geojson::Feature) -> Option<u32> {
    match &feature.id {
        Some(geojson::feature::Id::Number(n)) => n.as_u64().map(|v| v as u32),
        Some(geojson::feature::Id::String(s)) => s.parse().ok(),
        None => feature
            .properties
            .as_ref()
            .and_then(|props| props.get("id"))
            .and_then(|v| v.as_u64())
            .map(|v| v as u32),
    }
}
