//! View models handed to the render surface

use claims_core::{ClaimRegistry, Coordinate};
use serde::Serialize;

use crate::config::{MapConfig, MetricsConfig, WeatherEvent};

pub const SEARCH_LABEL: &str = "Search the property address/postal code/claim code";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub claim_id: u32,
    pub location: Coordinate,
    pub popup_html: String,
    pub anchor: String,
    pub color: &'static str,
    pub icon: &'static str,
}

/// Everything the map tile layer needs besides the tiles themselves
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
    pub tile_url: String,
    pub attribution: String,
    pub width: u32,
    pub height: u32,
    pub markers: Vec<Marker>,
}

impl MapView {
    pub fn build(center: Coordinate, config: &MapConfig, registry: &ClaimRegistry) -> Self {
        let markers = registry
            .claims()
            .iter()
            .map(|claim| {
                let anchor = claim.anchor();
                Marker {
                    claim_id: claim.id,
                    location: claim.location,
                    popup_html: format!(
                        "<b>Pending Claim #{}</b><br><a href=\"#{}\">Generate Report</a>",
                        claim.id, anchor
                    ),
                    anchor,
                    color: "red",
                    icon: "info-sign",
                }
            })
            .collect();

        Self {
            center,
            zoom: config.zoom,
            tile_url: config.tile_url.clone(),
            attribution: config.attribution.clone(),
            width: config.width,
            height: config.height,
            markers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricCard {
    pub title: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

impl MetricCard {
    fn new(title: &str, value: String, subtitle: Option<String>) -> Self {
        Self {
            title: title.to_string(),
            value,
            subtitle,
        }
    }

    fn event(title: &str, event: Option<&WeatherEvent>) -> Self {
        match event {
            Some(e) => Self::new(title, e.kind.clone(), Some(format_date(e))),
            None => Self::new(title, "None".to_string(), None),
        }
    }
}

fn format_date(event: &WeatherEvent) -> String {
    // Day/month/year without padding, e.g. 8/10/2024
    event.date.format("%-d/%-m/%Y").to_string()
}

/// Insured properties, pending claims, last and upcoming events
pub fn metric_cards(config: &MetricsConfig, registry: &ClaimRegistry) -> Vec<MetricCard> {
    vec![
        MetricCard::new(
            "Insured property",
            config.insured_properties.to_string(),
            None,
        ),
        MetricCard::new("Pending claims", registry.pending_count().to_string(), None),
        MetricCard::event("Last event", config.last_event.as_ref()),
        MetricCard::event("Upcoming", config.upcoming_event.as_ref()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims_core::ClaimScatter;
    use pretty_assertions::assert_eq;

    fn registry(count: i64) -> ClaimRegistry {
        let scatter = ClaimScatter {
            count,
            ..ClaimScatter::default()
        };
        ClaimRegistry::build(&scatter.generate().unwrap())
    }

    #[test]
    fn test_marker_popup_links_to_anchor() {
        let view = MapView::build(
            Coordinate::new(45.4642, 9.19),
            &MapConfig::default(),
            &registry(3),
        );
        assert_eq!(view.markers.len(), 3);
        assert_eq!(
            view.markers[2].popup_html,
            "<b>Pending Claim #3</b><br><a href=\"#claim-3\">Generate Report</a>"
        );
        assert_eq!(view.markers[2].anchor, "claim-3");
        assert_eq!(view.zoom, 13);
        assert_eq!(view.attribution, "Esri");
    }

    #[test]
    fn test_default_metrics() {
        let cards = metric_cards(&MetricsConfig::default(), &registry(45));
        assert_eq!(
            cards,
            vec![
                MetricCard::new("Insured property", "775".to_string(), None),
                MetricCard::new("Pending claims", "45".to_string(), None),
                MetricCard::new("Last event", "Rainfall".to_string(), Some("8/10/2024".to_string())),
                MetricCard::new("Upcoming", "Hail".to_string(), Some("18/10/2024".to_string())),
            ]
        );
    }

    #[test]
    fn test_pending_count_follows_registry() {
        let cards = metric_cards(&MetricsConfig::default(), &registry(7));
        assert_eq!(cards[1].value, "7");
    }

    #[test]
    fn test_missing_event_shows_none() {
        let config = MetricsConfig {
            upcoming_event: None,
            ..MetricsConfig::default()
        };
        let cards = metric_cards(&config, &registry(1));
        assert_eq!(cards[3].value, "None");
        assert_eq!(cards[3].subtitle, None);
    }
}
