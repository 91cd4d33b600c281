//! This is a library that provides the objects and the user-interface state needed to manage a
//! catalog of geological samples that is stored by a remote sample service.
//!
//! Nothing in here renders anything. The [shell::AppShell] holds the state of the whole
//! application and the [api::SampleApi] trait is the only way it talks to the outside world, so
//! a frontend only has to route user input to the shell and draw whatever state it ends up in.

use serde::{Deserialize, Deserializer};
use std::str::FromStr;

pub mod api;
pub mod card;
pub mod dialog;
pub mod error;
pub mod form;
pub mod list;
pub mod sample;
pub mod shell;

pub use error::Error;
pub use error::Result;

pub fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => FromStr::from_str(s)
            .map_err(serde::de::Error::custom)
            .map(Some),
    }
}

/// Sample data and an in-memory sample service for tests, here and in dependent crates
#[cfg(any(test, feature = "test-util"))]
pub mod test_helpers {
    use crate::{
        api::SampleApi,
        error::{Error, Result},
        sample::{ListParams, Page, Sample, SampleRequest, SampleType},
    };
    use async_trait::async_trait;
    use std::{
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    pub fn sample(id: &str, identifier: &str) -> Sample {
        Sample {
            id: id.to_string(),
            sample_identifier: identifier.to_string(),
            sample_name: format!("Sample {identifier}"),
            sample_type: SampleType::Mineral,
            collection_date: "2024-03-15T00:00:00Z".to_string(),
            latitude: Some(46.8523),
            longitude: Some(-121.7603),
            location_name: Some("Mount Rainier".to_string()),
            collector_name: "R. Feldspar".to_string(),
            description: Some("Andesite with plagioclase phenocrysts".to_string()),
            storage_location: Some("Shelf B4".to_string()),
            created_at: Some("2024-03-16T09:12:44".to_string()),
            updated_at: Some("2024-03-16T09:12:44".to_string()),
        }
    }

    pub fn request(identifier: &str) -> SampleRequest {
        SampleRequest {
            sample_identifier: identifier.to_string(),
            sample_name: "Granite".to_string(),
            sample_type: SampleType::Rock,
            collection_date: "2024-05-01".to_string(),
            collector_name: "M. Mohs".to_string(),
            ..Default::default()
        }
    }

    /// An in-memory stand-in for the sample service that can be told to fail
    #[derive(Default)]
    pub struct FakeApi {
        pub samples: Mutex<Vec<Sample>>,
        pub fail_with: Mutex<Option<String>>,
        pub list_calls: AtomicUsize,
        pub next_id: AtomicUsize,
        /// create, update and delete calls, whether or not they succeeded
        pub mutations: AtomicUsize,
        /// how long every call takes to answer
        pub delay: Duration,
    }

    impl FakeApi {
        pub fn with_samples(samples: Vec<Sample>) -> Self {
            Self {
                samples: Mutex::new(samples),
                ..Default::default()
            }
        }

        pub fn slow(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn fail(&self, message: &str) {
            *self.fail_with.lock().unwrap() = Some(message.to_string());
        }

        pub fn recover(&self) {
            *self.fail_with.lock().unwrap() = None;
        }

        pub fn list_calls(&self) -> usize {
            self.list_calls.load(Ordering::SeqCst)
        }

        pub fn mutations(&self) -> usize {
            self.mutations.load(Ordering::SeqCst)
        }

        async fn answer(&self) {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        async fn mutate(&self) {
            self.mutations.fetch_add(1, Ordering::SeqCst);
            self.answer().await;
        }

        fn check(&self) -> Result<()> {
            match self.fail_with.lock().unwrap().as_ref() {
                Some(msg) => Err(Error::from_response_body(
                    500,
                    &format!(r#"{{"message": "{msg}"}}"#),
                )),
                None => Ok(()),
            }
        }

        fn from_request(id: String, request: &SampleRequest) -> Sample {
            Sample {
                id,
                sample_identifier: request.sample_identifier.clone(),
                sample_name: request.sample_name.clone(),
                sample_type: request.sample_type,
                collection_date: request.collection_date.clone(),
                latitude: request.latitude,
                longitude: request.longitude,
                location_name: request.location_name.clone(),
                collector_name: request.collector_name.clone(),
                description: request.description.clone(),
                storage_location: request.storage_location.clone(),
                created_at: None,
                updated_at: None,
            }
        }
    }

    #[async_trait]
    impl SampleApi for FakeApi {
        async fn list(&self, params: &ListParams) -> Result<Page<Sample>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            self.answer().await;
            self.check()?;
            let samples = self.samples.lock().unwrap();
            let size = params.size.max(1) as usize;
            let start = params.page as usize * size;
            let content: Vec<Sample> = samples.iter().skip(start).take(size).cloned().collect();
            let total_pages = samples.len().div_ceil(size) as u32;
            Ok(Page {
                number_of_elements: content.len() as u32,
                empty: content.is_empty(),
                content,
                number: params.page,
                size: params.size,
                total_elements: samples.len() as u64,
                total_pages,
                first: params.page == 0,
                last: params.page + 1 >= total_pages,
            })
        }

        async fn get(&self, id: &str) -> Result<Sample> {
            self.answer().await;
            self.check()?;
            self.samples
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.id == id)
                .cloned()
                .ok_or_else(|| {
                    Error::from_response_body(404, r#"{"message": "Sample not found"}"#)
                })
        }

        async fn create(&self, request: &SampleRequest) -> Result<Sample> {
            self.mutate().await;
            self.check()?;
            let id = format!("id-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
            let sample = Self::from_request(id, request);
            self.samples.lock().unwrap().push(sample.clone());
            Ok(sample)
        }

        async fn update(&self, id: &str, request: &SampleRequest) -> Result<Sample> {
            self.mutate().await;
            self.check()?;
            let mut samples = self.samples.lock().unwrap();
            let existing = samples.iter_mut().find(|s| s.id == id).ok_or_else(|| {
                Error::from_response_body(404, r#"{"message": "Sample not found"}"#)
            })?;
            *existing = Self::from_request(id.to_string(), request);
            Ok(existing.clone())
        }

        async fn delete(&self, id: &str) -> Result<()> {
            self.mutate().await;
            self.check()?;
            let mut samples = self.samples.lock().unwrap();
            let before = samples.len();
            samples.retain(|s| s.id != id);
            match samples.len() == before {
                true => Err(Error::from_response_body(
                    404,
                    r#"{"message": "Sample not found"}"#,
                )),
                false => Ok(()),
            }
        }
    }
}
