//! A display-ready summary of a single sample, as shown in the sample list
use crate::sample::{Sample, SampleType};
use serde::Serialize;
use time::macros::format_description;

/// Descriptions longer than this are cut short on a card
pub const DESCRIPTION_PREVIEW_CHARS: usize = 140;

/// Everything needed to draw one sample in the list. Optional lines are `None` when they should
/// not be shown at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleCard {
    pub id: String,
    pub identifier: String,
    pub name: String,
    pub sample_type: SampleType,
    pub badge_class: &'static str,
    pub collection_date: Option<String>,
    pub location: Option<String>,
    pub coordinates: Option<String>,
    pub collector: String,
    pub storage: Option<String>,
    pub description: Option<String>,
}

/// The stylesheet class that colors the badge of each sample type
pub fn badge_class(sample_type: SampleType) -> &'static str {
    match sample_type {
        SampleType::Rock => "badge-rock",
        SampleType::Mineral => "badge-mineral",
        SampleType::Soil => "badge-soil",
        SampleType::Fossil => "badge-fossil",
        SampleType::Sediment => "badge-sediment",
        SampleType::Other => "badge-other",
    }
}

/// Formats a collection date like "Mar 15, 2024". Values that aren't a recognizable date are
/// shown as they are.
pub fn format_collection_date(sample: &Sample) -> Option<String> {
    if sample.collection_date.is_empty() {
        return None;
    }
    let formatted = sample.collection_date_parsed().and_then(|d| {
        d.format(format_description!(
            "[month repr:short] [day padding:none], [year]"
        ))
        .ok()
    });
    Some(formatted.unwrap_or_else(|| sample.collection_date.clone()))
}

/// Both coordinates to four decimal places, but only if both are set and non-zero
pub fn format_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Option<String> {
    match (latitude, longitude) {
        (Some(lat), Some(long)) if lat != 0.0 && long != 0.0 => Some(format!("{lat:.4}, {long:.4}")),
        _ => None,
    }
}

/// Shortens `text` to at most `max` characters, marking the cut with an ellipsis
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", text[..idx].trim_end()),
        None => text.to_string(),
    }
}

fn non_empty(val: &Option<String>) -> Option<String> {
    val.as_ref().filter(|s| !s.is_empty()).cloned()
}

impl From<&Sample> for SampleCard {
    fn from(sample: &Sample) -> Self {
        Self {
            id: sample.id.clone(),
            identifier: sample.sample_identifier.clone(),
            name: sample.sample_name.clone(),
            sample_type: sample.sample_type,
            badge_class: badge_class(sample.sample_type),
            collection_date: format_collection_date(sample),
            location: non_empty(&sample.location_name),
            coordinates: format_coordinates(sample.latitude, sample.longitude),
            collector: sample.collector_name.clone(),
            storage: non_empty(&sample.storage_location),
            description: non_empty(&sample.description)
                .map(|d| truncate(&d, DESCRIPTION_PREVIEW_CHARS)),
        }
    }
}
