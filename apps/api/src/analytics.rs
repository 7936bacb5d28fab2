//! Read-side aggregation over recorded view events: totals, unique clients,
//! and counts grouped by country and network. Pure computation — the event
//! list comes from whichever store adapter is active.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::models::view::ViewEvent;

/// Placeholder recorded by old clients when no IP could be determined;
/// excluded from the unique-client count.
const UNKNOWN_MARKERS: [&str; 3] = ["", "unknown", "N/A"];

#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewStats {
    pub total_views: usize,
    pub unique_ips: usize,
    pub countries: BTreeMap<String, usize>,
    pub networks: BTreeMap<String, usize>,
}

pub fn compute_view_stats(views: &[ViewEvent]) -> ViewStats {
    let mut unique_ips = HashSet::new();
    let mut countries: BTreeMap<String, usize> = BTreeMap::new();
    let mut networks: BTreeMap<String, usize> = BTreeMap::new();

    for view in views {
        if !UNKNOWN_MARKERS.contains(&view.ip.as_str()) {
            unique_ips.insert(view.ip.as_str());
        }
        if let Some(country) = known(&view.country) {
            *countries.entry(country.to_string()).or_default() += 1;
        }
        if let Some(network) = known(&view.network) {
            *networks.entry(network.to_string()).or_default() += 1;
        }
    }

    ViewStats {
        total_views: views.len(),
        unique_ips: unique_ips.len(),
        countries,
        networks,
    }
}

fn known(field: &Option<String>) -> Option<&str> {
    field
        .as_deref()
        .filter(|value| !value.is_empty() && *value != "Unknown")
}

/// Returns the events sorted newest-first, the order the analytics view
/// presents them in. Storage order is not guaranteed chronological.
pub fn sorted_by_time_desc(views: &[ViewEvent]) -> Vec<ViewEvent> {
    let mut sorted = views.to_vec();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted
}

/// Renders the event list as CSV, one row per view, missing metadata as
/// `Unknown`. Matches the analytics page's export format.
pub fn export_csv(views: &[ViewEvent]) -> String {
    let mut csv = String::from("IP Address,Country,Network,Timestamp\n");
    for view in views {
        csv.push_str(&format!(
            "{},{},{},{}\n",
            csv_field(&view.ip),
            csv_field(view.country.as_deref().unwrap_or("Unknown")),
            csv_field(view.network.as_deref().unwrap_or("Unknown")),
            csv_field(&view.timestamp.to_rfc3339()),
        ));
    }
    csv
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
