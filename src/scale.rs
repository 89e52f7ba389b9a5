use crate::types::County;

/// Legend palette, light to dark.
pub const PALETTE: [&str; 8] = [
    "#E5F5E0", "#C7E9C0", "#A1D99B", "#74C476", "#41AB5D", "#238B45", "#006D2C", "#00441B",
];

/// Fill for counties the education dataset says nothing about.
pub const NO_DATA_COLOR: &str = "#d9d9d9";

/// Percentage labels under the legend swatches.
pub const LEGEND_LABELS: [u32; 8] = [3, 12, 21, 30, 39, 48, 57, 66];

/// Quantize scale over `[0, max]`: eight equal-width buckets, one per
/// palette color. Lower bounds are inclusive and upper bounds exclusive,
/// except the top bucket which is closed at `max`. Out-of-domain values
/// clamp into the end buckets.
#[derive(Debug, Clone, Copy)]
pub struct QuantizeScale {
    max: f64,
}

impl QuantizeScale {
    pub fn from_counties(counties: &[County]) -> Self {
        let max = counties
            .iter()
            .filter_map(|c| c.education.as_ref().map(|e| e.bachelors_or_higher))
            .fold(0.0_f64, f64::max);
        Self { max }
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Bucket index in `0..8`.
    pub fn bucket(&self, value: f64) -> usize {
        if self.max <= 0.0 {
            return 0;
        }
        let raw = (value / self.max * PALETTE.len() as f64).floor();
        raw.clamp(0.0, (PALETTE.len() - 1) as f64) as usize
    }

    pub fn color(&self, value: Option<f64>) -> &'static str {
        match value {
            Some(v) => PALETTE[self.bucket(v)],
            None => NO_DATA_COLOR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttainmentRecord;
    use geo::MultiPolygon;

    fn scale(max: f64) -> QuantizeScale {
        QuantizeScale { max }
    }

    fn county_with(value: Option<f64>) -> County {
        County {
            fips: 1001,
            geometry: MultiPolygon::new(vec![]),
            education: value.map(|v| AttainmentRecord {
                fips: 1001,
                state: "Alabama".to_string(),
                area_name: "Autauga County".to_string(),
                bachelors_or_higher: v,
            }),
        }
    }

    #[test]
    fn max_comes_from_joined_counties_only() {
        let counties = vec![
            county_with(Some(20.9)),
            county_with(None),
            county_with(Some(75.1)),
        ];
        assert_eq!(QuantizeScale::from_counties(&counties).max(), 75.1);
    }

    #[test]
    fn buckets_are_inclusive_lower_exclusive_upper() {
        let scale = scale(80.0);
        // Bucket width is 10
        assert_eq!(scale.bucket(0.0), 0);
        assert_eq!(scale.bucket(9.999), 0);
        assert_eq!(scale.bucket(10.0), 1);
        assert_eq!(scale.bucket(79.999), 7);
    }

    #[test]
    fn top_bucket_is_closed_at_max() {
        let scale = scale(80.0);
        assert_eq!(scale.bucket(80.0), 7);
    }

    #[test]
    fn out_of_domain_values_clamp() {
        let scale = scale(80.0);
        assert_eq!(scale.bucket(-5.0), 0);
        assert_eq!(scale.bucket(200.0), 7);
    }

    #[test]
    fn bucket_assignment_is_monotonic() {
        let scale = scale(66.0);
        let mut previous = 0;
        for step in 0..=660 {
            let bucket = scale.bucket(step as f64 / 10.0);
            assert!(bucket >= previous, "bucket dropped at {}", step);
            previous = bucket;
        }
    }

    #[test]
    fn empty_domain_collapses_to_the_first_bucket() {
        let scale = QuantizeScale::from_counties(&[county_with(None)]);
        assert_eq!(scale.max(), 0.0);
        assert_eq!(scale.bucket(42.0), 0);
    }

    #[test]
    fn missing_values_take_the_no_data_color() {
        let scale = scale(66.0);
        assert_eq!(scale.color(None), NO_DATA_COLOR);
        assert_eq!(scale.color(Some(66.0)), PALETTE[7]);
    }
}
