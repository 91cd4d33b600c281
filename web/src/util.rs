use crate::APP_PREFIX;
use axum::http::Uri;
use libsample::sample::ListParams;
use minijinja::ErrorKind;
use std::collections::BTreeMap;

pub(crate) fn app_url(value: &str) -> String {
    [APP_PREFIX, value.trim_start_matches('/')].join("")
}

/// The url of the list view showing the page described by `params`
pub(crate) fn list_url(params: &ListParams) -> String {
    let query = serde_urlencoded::to_string([
        ("page", params.page.to_string()),
        ("size", params.size.to_string()),
        ("sort", params.sort.clone()),
    ])
    .unwrap_or_default();
    format!("{}?{query}", app_url("/"))
}

#[test]
fn test_list_url() {
    assert_eq!(app_url("/"), "/app/");
    assert_eq!(app_url("dialog/confirm"), "/app/dialog/confirm");
    let params = ListParams {
        page: 2,
        size: 10,
        sort: "sampleName,desc".into(),
    };
    assert_eq!(list_url(&params), "/app/?page=2&size=10&sort=sampleName%2Cdesc");
}

/// A minijinja template filter for appending (or replacing) a given query param
/// to a url.
pub(crate) fn append_query_param(
    uristr: &str,
    key: &str,
    value: &str,
) -> Result<String, minijinja::Error> {
    let uri = uristr.parse::<Uri>().map_err(|e| {
        minijinja::Error::new(ErrorKind::InvalidOperation, "Unable to parse uri string")
            .with_source(e)
    })?;
    let mut query: BTreeMap<_, _> = match uri.query() {
        Some(q) => serde_urlencoded::from_str(q).map_err(|e| {
            minijinja::Error::new(ErrorKind::InvalidOperation, "Unable to decode query params")
                .with_source(e)
        })?,
        None => BTreeMap::new(),
    };
    query.insert(key, value);
    let querystring = serde_urlencoded::to_string(query).map_err(|e| {
        minijinja::Error::new(ErrorKind::InvalidOperation, "Unable to encode query params")
            .with_source(e)
    })?;

    Ok(format!("{path}?{querystring}", path = uri.path()))
}

#[test]
fn test_append_query_param() {
    let uri = "http://foo.bar/app/";
    let expected = "/app/?page=1";
    assert_eq!(
        append_query_param(uri, "page", "1").expect("Failed to append"),
        expected
    );
    let uri = "/app/?page=1";
    let expected = "/app/?page=2";
    assert_eq!(
        append_query_param(uri, "page", "2").expect("Failed to append"),
        expected
    );
    let uri = "/app/?size=20";
    let expected = "/app/?page=3&size=20";
    assert_eq!(
        append_query_param(uri, "page", "3").expect("Failed to append"),
        expected
    );
    let uri = "/app/?page=1&sort=id";
    let expected = "/app/?page=1&sort=sampleName";
    assert_eq!(
        append_query_param(uri, "sort", "sampleName").expect("Failed to append"),
        expected
    );
}

/// A minijinja template filter that turns a sample type such as `SEDIMENT` into `Sediment`
pub(crate) fn title_case(value: &str) -> String {
    let lower = value.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[test]
fn test_title_case() {
    assert_eq!(title_case("SEDIMENT"), "Sediment");
    assert_eq!(title_case("rock"), "Rock");
    assert_eq!(title_case(""), "");
}
