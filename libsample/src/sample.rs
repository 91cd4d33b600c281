//! Objects to represent geological samples as they are exchanged with the sample service
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use time::{Date, macros::format_description};

/// The kind of material a sample consists of
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Deserialize,
    Serialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum SampleType {
    #[default]
    Rock,
    Mineral,
    Soil,
    Fossil,
    Sediment,
    Other,
}

/// A geological sample record. All fields are owned by the server; the client only ever
/// displays them or copies them into a form.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub id: String,
    pub sample_identifier: String,
    pub sample_name: String,
    pub sample_type: SampleType,
    /// Either a plain `YYYY-MM-DD` date or a full timestamp, depending on the server
    pub collection_date: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub location_name: Option<String>,
    pub collector_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub storage_location: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Sample {
    /// The calendar-date portion of the collection date, discarding any time of day
    pub fn collection_day(&self) -> &str {
        date_portion(&self.collection_date)
    }

    /// The collection date parsed into a [Date], if the server sent something sensible
    pub fn collection_date_parsed(&self) -> Option<Date> {
        parse_date(self.collection_day())
    }
}

/// Returns the `YYYY-MM-DD` part of a date or timestamp string
pub fn date_portion(value: &str) -> &str {
    value.split('T').next().unwrap_or_default()
}

/// Parses a `YYYY-MM-DD` string
pub fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value, format_description!("[year]-[month]-[day]")).ok()
}

/// The mutable subset of [Sample] that is submitted when creating or updating a sample. The id
/// and timestamps are always assigned by the server.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleRequest {
    pub sample_identifier: String,
    pub sample_name: String,
    pub sample_type: SampleType,
    pub collection_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    pub collector_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_location: Option<String>,
}

/// One page of results as returned by the server, along with pagination metadata
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    /// zero-based page number
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub first: bool,
    #[serde(default)]
    pub last: bool,
    #[serde(default)]
    pub number_of_elements: u32,
    #[serde(default)]
    pub empty: bool,
}

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_SORT: &str = "id";

/// Parameters for requesting a page of samples
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ListParams {
    pub page: u32,
    pub size: u32,
    pub sort: String,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: DEFAULT_SORT.to_string(),
        }
    }
}
