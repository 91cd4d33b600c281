//! The state behind the form for creating or editing a sample
//!
//! A [SampleForm] holds the raw text of every input, the validation error of each field, and
//! whether a submission is currently in flight. It knows nothing about whether a submission will
//! turn into a create or an update call; that is up to whoever handles the submitted
//! [SampleRequest].
use crate::sample::{Sample, SampleRequest, SampleType, date_portion, parse_date};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, future::Future, str::FromStr};
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{debug, trace};

/// The inputs of the sample form
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Deserialize,
    Serialize,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Field {
    SampleIdentifier,
    SampleName,
    SampleType,
    CollectionDate,
    Latitude,
    Longitude,
    LocationName,
    CollectorName,
    Description,
    StorageLocation,
}

impl Field {
    /// The message shown when a required field is left empty
    fn required_message(&self) -> Option<&'static str> {
        match self {
            Field::SampleIdentifier => Some("Sample identifier is required"),
            Field::SampleName => Some("Sample name is required"),
            Field::CollectionDate => Some("Collection date is required"),
            Field::CollectorName => Some("Collector name is required"),
            _ => None,
        }
    }

    pub fn is_required(&self) -> bool {
        self.required_message().is_some()
    }
}

/// The raw contents of every input of the form
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormValues {
    pub sample_identifier: String,
    pub sample_name: String,
    pub sample_type: SampleType,
    pub collection_date: String,
    pub latitude: String,
    pub longitude: String,
    pub location_name: String,
    pub collector_name: String,
    pub description: String,
    pub storage_location: String,
}

impl FormValues {
    /// Copies an existing sample into form inputs. The collection date is cut down to its
    /// calendar date so it fits a date-only input.
    pub fn from_sample(sample: &Sample) -> Self {
        fn coordinate(val: Option<f64>) -> String {
            val.filter(|v| *v != 0.0)
                .map(|v| v.to_string())
                .unwrap_or_default()
        }

        Self {
            sample_identifier: sample.sample_identifier.clone(),
            sample_name: sample.sample_name.clone(),
            sample_type: sample.sample_type,
            collection_date: date_portion(&sample.collection_date).to_string(),
            latitude: coordinate(sample.latitude),
            longitude: coordinate(sample.longitude),
            location_name: sample.location_name.clone().unwrap_or_default(),
            collector_name: sample.collector_name.clone(),
            description: sample.description.clone().unwrap_or_default(),
            storage_location: sample.storage_location.clone().unwrap_or_default(),
        }
    }

    /// The current text of a single input
    pub fn get(&self, field: Field) -> String {
        match field {
            Field::SampleIdentifier => self.sample_identifier.clone(),
            Field::SampleName => self.sample_name.clone(),
            Field::SampleType => self.sample_type.to_string(),
            Field::CollectionDate => self.collection_date.clone(),
            Field::Latitude => self.latitude.clone(),
            Field::Longitude => self.longitude.clone(),
            Field::LocationName => self.location_name.clone(),
            Field::CollectorName => self.collector_name.clone(),
            Field::Description => self.description.clone(),
            Field::StorageLocation => self.storage_location.clone(),
        }
    }

    fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::SampleIdentifier => Some(&mut self.sample_identifier),
            Field::SampleName => Some(&mut self.sample_name),
            Field::SampleType => None,
            Field::CollectionDate => Some(&mut self.collection_date),
            Field::Latitude => Some(&mut self.latitude),
            Field::Longitude => Some(&mut self.longitude),
            Field::LocationName => Some(&mut self.location_name),
            Field::CollectorName => Some(&mut self.collector_name),
            Field::Description => Some(&mut self.description),
            Field::StorageLocation => Some(&mut self.storage_location),
        }
    }
}

/// Parses an optional coordinate input. Empty input and zero both mean "not given".
fn parse_coordinate(value: &str) -> Result<Option<f64>, ()> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    match f64::from_str(value) {
        Ok(v) if v.is_nan() || v == 0.0 => Ok(None),
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(()),
    }
}

fn non_empty(value: &str) -> Option<String> {
    match value.is_empty() {
        true => None,
        false => Some(value.to_string()),
    }
}

/// State of the create/edit form
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SampleForm {
    values: FormValues,
    errors: BTreeMap<Field, String>,
    editing: bool,
    submitting: bool,
}

impl SampleForm {
    /// An empty form for creating a new sample
    pub fn new() -> Self {
        Self::default()
    }

    /// A form for editing, pre-populated from an existing sample
    pub fn for_sample(sample: &Sample) -> Self {
        Self {
            values: FormValues::from_sample(sample),
            editing: true,
            ..Default::default()
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn errors(&self) -> &BTreeMap<Field, String> {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Whether a submission is in flight. All inputs are disabled while this is true.
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    pub fn title(&self) -> &'static str {
        match self.editing {
            true => "Edit Sample",
            false => "Create New Sample",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match (self.submitting, self.editing) {
            (true, _) => "Saving...",
            (false, true) => "Update Sample",
            (false, false) => "Create Sample",
        }
    }

    /// Changes a single input and clears any validation error on that input.
    ///
    /// Returns false if the change was ignored, which happens while a submission is in flight or
    /// when the value is not a valid choice for the field.
    pub fn set(&mut self, field: Field, value: &str) -> bool {
        if self.submitting {
            debug!(%field, "Ignoring edit while submitting");
            return false;
        }
        match self.values.text_mut(field) {
            Some(text) => value.clone_into(text),
            None => match SampleType::from_str(value) {
                Ok(t) => self.values.sample_type = t,
                Err(_) => return false,
            },
        }
        if self.errors.remove(&field).is_some() {
            trace!(%field, "Cleared validation error");
        }
        true
    }

    /// Applies a whole set of inputs at once, as submitted by a browser form. Only the inputs
    /// that actually differ count as edits, so errors on untouched fields survive.
    pub fn apply(&mut self, values: &FormValues) {
        use strum::IntoEnumIterator;
        for field in Field::iter() {
            let new = values.get(field);
            if self.values.get(field) != new {
                self.set(field, &new);
            }
        }
    }

    /// Checks every input and replaces the set of errors with the result. Returns true if the
    /// form is valid.
    pub fn validate(&mut self) -> bool {
        let mut errors = BTreeMap::new();
        let required = [
            (Field::SampleIdentifier, &self.values.sample_identifier),
            (Field::SampleName, &self.values.sample_name),
            (Field::CollectionDate, &self.values.collection_date),
            (Field::CollectorName, &self.values.collector_name),
        ];
        for (field, value) in required {
            if value.trim().is_empty()
                && let Some(msg) = field.required_message()
            {
                errors.insert(field, msg.to_string());
            }
        }
        if !errors.contains_key(&Field::CollectionDate)
            && parse_date(self.values.collection_date.trim()).is_none()
        {
            errors.insert(
                Field::CollectionDate,
                "Collection date must be a valid date".to_string(),
            );
        }
        if parse_coordinate(&self.values.latitude).is_err() {
            errors.insert(Field::Latitude, "Latitude must be a number".to_string());
        }
        if parse_coordinate(&self.values.longitude).is_err() {
            errors.insert(Field::Longitude, "Longitude must be a number".to_string());
        }
        debug!(nerrors = errors.len(), "Validated sample form");
        self.errors = errors;
        self.errors.is_empty()
    }

    /// Validates the form and builds the payload to submit. Empty optional inputs are left out
    /// of the payload entirely. Returns `None` if the form is invalid.
    pub fn submit(&mut self) -> Option<SampleRequest> {
        if !self.validate() {
            return None;
        }
        let v = &self.values;
        Some(SampleRequest {
            sample_identifier: v.sample_identifier.clone(),
            sample_name: v.sample_name.clone(),
            sample_type: v.sample_type,
            collection_date: v.collection_date.trim().to_string(),
            latitude: parse_coordinate(&v.latitude).ok().flatten(),
            longitude: parse_coordinate(&v.longitude).ok().flatten(),
            location_name: non_empty(&v.location_name),
            collector_name: v.collector_name.clone(),
            description: non_empty(&v.description),
            storage_location: non_empty(&v.storage_location),
        })
    }

    /// Validates the form and, if it is valid, hands the payload to `handler` and awaits it.
    /// The form counts as submitting until the handler finishes. Returns `None` without calling
    /// the handler if the form is invalid.
    pub async fn submit_with<F, Fut, T>(&mut self, handler: F) -> Option<T>
    where
        F: FnOnce(SampleRequest) -> Fut,
        Fut: Future<Output = T>,
    {
        let request = self.submit()?;
        self.submitting = true;
        let result = handler(request).await;
        self.submitting = false;
        Some(result)
    }
}
