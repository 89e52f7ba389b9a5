use crate::types::County;
use serde::Serialize;

/// Offset between the pointer and the overlay box, matching the page script.
const POINTER_OFFSET: f64 = 5.0;

/// What the visible overlay shows; also the hover API payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub fips: u32,
    pub opacity: f64,
    pub left: f64,
    pub top: f64,
    pub area: String,
    pub education_text: String,
    pub education: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TooltipState {
    Hidden,
    Visible(Overlay),
}

/// Hover overlay controller. Hidden initially, visible while a pointer rests
/// on a county, hidden again on pointer-out. Transitions are synchronous and
/// the last one wins.
#[derive(Debug, Clone)]
pub struct Tooltip {
    state: TooltipState,
}

impl Tooltip {
    pub fn new() -> Self {
        Self {
            state: TooltipState::Hidden,
        }
    }

    pub fn pointer_enter(&mut self, county: &County, x: f64, y: f64) {
        let (area, education_text, education) = match &county.education {
            Some(record) => (
                format!("{}, {}", record.area_name, record.state),
                format!("{}%", record.bachelors_or_higher),
                Some(record.bachelors_or_higher),
            ),
            None => (
                format!("County {}", county.fips),
                "no data".to_string(),
                None,
            ),
        };

        self.state = TooltipState::Visible(Overlay {
            fips: county.fips,
            opacity: 1.0,
            left: x + POINTER_OFFSET,
            top: y + POINTER_OFFSET,
            area,
            education_text,
            education,
        });
    }

    pub fn pointer_out(&mut self) {
        self.state = TooltipState::Hidden;
    }

    pub fn opacity(&self) -> f64 {
        match &self.state {
            TooltipState::Hidden => 0.0,
            TooltipState::Visible(overlay) => overlay.opacity,
        }
    }

    pub fn state(&self) -> &TooltipState {
        &self.state
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        match &self.state {
            TooltipState::Hidden => None,
            TooltipState::Visible(overlay) => Some(overlay),
        }
    }
}

impl Default for Tooltip {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttainmentRecord;
    use geo::MultiPolygon;

    fn autauga() -> County {
        County {
            fips: 1001,
            geometry: MultiPolygon::new(vec![]),
            education: Some(AttainmentRecord {
                fips: 1001,
                state: "Alabama".to_string(),
                area_name: "Autauga County".to_string(),
                bachelors_or_higher: 20.9,
            }),
        }
    }

    fn unmatched() -> County {
        County {
            fips: 2013,
            geometry: MultiPolygon::new(vec![]),
            education: None,
        }
    }

    #[test]
    fn starts_hidden() {
        let tooltip = Tooltip::new();
        assert_eq!(tooltip.opacity(), 0.0);
        assert!(tooltip.overlay().is_none());
    }

    #[test]
    fn pointer_enter_shows_county_details_near_the_pointer() {
        let mut tooltip = Tooltip::new();
        tooltip.pointer_enter(&autauga(), 120.0, 48.0);

        assert_eq!(tooltip.opacity(), 1.0);
        let overlay = tooltip.overlay().unwrap();
        assert_eq!(overlay.fips, 1001);
        assert_eq!(overlay.left, 125.0);
        assert_eq!(overlay.top, 53.0);
        assert_eq!(overlay.area, "Autauga County, Alabama");
        assert_eq!(overlay.education_text, "20.9%");
        assert_eq!(overlay.education, Some(20.9));
    }

    #[test]
    fn pointer_out_hides_again() {
        let mut tooltip = Tooltip::new();
        tooltip.pointer_enter(&autauga(), 120.0, 48.0);
        tooltip.pointer_out();

        assert_eq!(tooltip.opacity(), 0.0);
        assert_eq!(*tooltip.state(), TooltipState::Hidden);
    }

    #[test]
    fn counties_without_a_record_show_no_data() {
        let mut tooltip = Tooltip::new();
        tooltip.pointer_enter(&unmatched(), 0.0, 0.0);

        let overlay = tooltip.overlay().unwrap();
        assert_eq!(overlay.area, "County 2013");
        assert_eq!(overlay.education_text, "no data");
        assert_eq!(overlay.education, None);
    }

    #[test]
    fn last_transition_wins() {
        let mut tooltip = Tooltip::new();
        tooltip.pointer_enter(&autauga(), 10.0, 10.0);
        tooltip.pointer_enter(&unmatched(), 30.0, 40.0);

        let overlay = tooltip.overlay().unwrap();
        assert_eq!(overlay.fips, 2013);
        assert_eq!(overlay.left, 35.0);
    }
}
