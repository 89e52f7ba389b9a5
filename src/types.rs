use geo::MultiPolygon;
use serde::Deserialize;

/// One row of the remote education dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct AttainmentRecord {
    pub fips: u32,
    pub state: String,
    pub area_name: String,
    #[serde(rename = "bachelorsOrHigher")]
    pub bachelors_or_higher: f64,
}

/// A county geometry, with the education record merged in once the join has
/// run. `education` stays `None` for counties the dataset says nothing about.
#[derive(Debug, Clone)]
pub struct County {
    pub fips: u32,
    pub geometry: MultiPolygon<f64>,
    pub education: Option<AttainmentRecord>,
}
