use super::*;
use crate::util::app_url;
use axum::{Json, routing::get};
use std::time::Duration;
use test_log::test;

fn samples(n: usize) -> Vec<Sample> {
    (1..=n)
        .map(|i| sample(&i.to_string(), &format!("GEO-{i:03}")))
        .collect()
}

fn valid_form(identifier: &'static str) -> Vec<(&'static str, &'static str)> {
    vec![
        ("sampleIdentifier", identifier),
        ("sampleName", "Olivine basalt"),
        ("sampleType", "MINERAL"),
        ("collectionDate", "2024-06-01"),
        ("latitude", ""),
        ("longitude", ""),
        ("locationName", "Kilauea"),
        ("collectorName", "K. Lava"),
        ("description", ""),
        ("storageLocation", ""),
    ]
}

#[test(tokio::test)]
async fn test_root_redirects() {
    let mut browser = Browser::new(test_app(Arc::new(FakeApi::default())));
    let request = Request::builder()
        .uri("/")
        .body(Body::empty())
        .expect("Failed to build request");
    let response = browser.send(request).await;
    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/app/");
}

#[test(tokio::test)]
async fn test_healthcheck() {
    let mut browser = Browser::new(test_app(Arc::new(FakeApi::default())));
    let (status, body) = browser.get("/healthcheck").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).expect("not json");
    assert_eq!(json["status"], "UP");
    assert_eq!(json["service"], "sampleweb");
    assert!(json["timestamp"].as_str().is_some_and(|t| !t.is_empty()));
}

#[test(tokio::test)]
async fn test_list_samples() {
    let mut browser = Browser::new(test_app(Arc::new(FakeApi::with_samples(samples(2)))));
    let (status, body) = browser.get(&app_url("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("GEO-001"));
    assert!(body.contains("GEO-002"));
    assert!(body.contains("Mar 15, 2024"));
    assert!(body.contains("46.8523, -121.7603"));
    assert!(body.contains("badge-mineral"));
    assert!(!body.contains("delete-dialog"));
}

#[test(tokio::test)]
async fn test_empty_list() {
    let mut browser = Browser::new(test_app(Arc::new(FakeApi::default())));
    let (status, body) = browser.get(&app_url("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("No samples found"));
}

#[test(tokio::test)]
async fn test_list_failure() {
    let api = Arc::new(FakeApi::with_samples(samples(2)));
    api.fail("Database unavailable");
    let mut browser = Browser::new(test_app(api));
    let (status, body) = browser.get(&app_url("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Database unavailable"));
    assert!(!body.contains("GEO-001"));
}

#[test(tokio::test)]
async fn test_pagination() {
    let mut browser = Browser::new(test_app(Arc::new(FakeApi::with_samples(samples(25)))));
    let (_, body) = browser.get(&app_url("/?size=10")).await;
    assert!(body.contains("Page 1 of 3"));
    assert!(body.contains("GEO-010"));
    assert!(!body.contains("GEO-011"));
    assert!(body.contains("page=1&amp;size=10&amp;sort=id"));

    let (_, body) = browser.get(&app_url("/?page=2")).await;
    assert!(body.contains("Page 3 of 3"));
    assert!(body.contains("GEO-025"));

    // the position is kept in the session
    let (_, body) = browser.get(&app_url("/")).await;
    assert!(body.contains("Page 3 of 3"));
}

#[test(tokio::test)]
async fn test_create_sample() {
    let api = Arc::new(FakeApi::default());
    let mut browser = Browser::new(test_app(api.clone()));

    let body = browser.act(&app_url("/new"), &[]).await;
    assert!(body.contains("Create New Sample"));
    assert!(body.contains("Create Sample"));

    let body = browser.act(&app_url("/form"), &valid_form("GEO-100")).await;
    assert!(body.contains("Sample created successfully"));
    assert!(body.contains("GEO-100"));
    assert!(!body.contains("sample-form"));

    let stored = api.samples.lock().unwrap()[0].clone();
    assert_eq!(stored.sample_type, SampleType::Mineral);
    assert_eq!(stored.latitude, None);
    assert_eq!(stored.description, None);
    assert_eq!(stored.location_name.as_deref(), Some("Kilauea"));
}

#[test(tokio::test)]
async fn test_validation_errors() {
    let api = Arc::new(FakeApi::default());
    let mut browser = Browser::new(test_app(api.clone()));
    browser.act(&app_url("/new"), &[]).await;

    let body = browser
        .act(
            &app_url("/form"),
            &[("sampleName", "Unnamed"), ("latitude", "far north")],
        )
        .await;
    assert!(body.contains("Sample identifier is required"));
    assert!(body.contains("Collection date is required"));
    assert!(body.contains("Collector name is required"));
    assert!(body.contains("Latitude must be a number"));
    assert!(!body.contains("Sample name is required"));
    // what was typed is kept
    assert!(body.contains("value=\"Unnamed\""));
    assert_eq!(api.mutations(), 0);
}

#[test(tokio::test)]
async fn test_edit_sample() {
    let api = Arc::new(FakeApi::with_samples(samples(1)));
    let mut browser = Browser::new(test_app(api.clone()));

    let body = browser.act(&app_url("/1/edit"), &[]).await;
    assert!(body.contains("Edit Sample"));
    assert!(body.contains("Update Sample"));
    assert!(body.contains("value=\"2024-03-15\""));
    assert!(body.contains("value=\"GEO-001\""));

    let body = browser.act(&app_url("/form"), &valid_form("GEO-001")).await;
    assert!(body.contains("Sample updated successfully"));
    assert_eq!(api.samples.lock().unwrap()[0].sample_name, "Olivine basalt");
    assert_eq!(api.samples.lock().unwrap().len(), 1);
}

#[test(tokio::test)]
async fn test_edit_missing_sample() {
    let mut browser = Browser::new(test_app(Arc::new(FakeApi::default())));
    let body = browser.act(&app_url("/nope/edit"), &[]).await;
    assert!(body.contains("Sample not found"));
    assert!(body.contains("notification-error"));
    assert!(!body.contains("sample-form"));
}

#[test(tokio::test)]
async fn test_save_failure_keeps_form() {
    let api = Arc::new(FakeApi::default());
    let mut browser = Browser::new(test_app(api.clone()));
    browser.act(&app_url("/new"), &[]).await;
    api.fail("Duplicate identifier");

    let body = browser.act(&app_url("/form"), &valid_form("GEO-7")).await;
    assert!(body.contains("Duplicate identifier"));
    assert!(body.contains("sample-form"));
    assert!(body.contains("value=\"GEO-7\""));
    // the form is usable again
    assert!(body.contains("Create Sample"));
    assert!(!body.contains("Saving..."));
}

#[test(tokio::test)]
async fn test_cancel_form() {
    let api = Arc::new(FakeApi::with_samples(samples(1)));
    let mut browser = Browser::new(test_app(api.clone()));
    browser.act(&app_url("/1/edit"), &[]).await;
    let body = browser.act(&app_url("/form/cancel"), &[]).await;
    assert!(!body.contains("sample-form"));
    assert!(body.contains("GEO-001"));
    assert_eq!(api.mutations(), 0);
}

#[test(tokio::test)]
async fn test_delete_sample() {
    let api = Arc::new(FakeApi::with_samples(samples(2)));
    let mut browser = Browser::new(test_app(api.clone()));
    browser.get(&app_url("/")).await;

    let body = browser.act(&app_url("/2/delete"), &[]).await;
    assert!(body.contains(
        "Are you sure you want to delete the sample GEO-002? This action cannot be undone."
    ));
    assert_eq!(api.mutations(), 0);

    let body = browser.act(&app_url("/dialog/confirm"), &[]).await;
    assert!(body.contains("Sample deleted successfully"));
    assert!(!body.contains("delete-dialog"));
    assert!(!body.contains("GEO-002"));
    assert!(body.contains("GEO-001"));

    // confirming again without an open dialog does nothing
    browser.act(&app_url("/dialog/confirm"), &[]).await;
    assert_eq!(api.mutations(), 1);
}

#[test(tokio::test)]
async fn test_cancel_delete() {
    let api = Arc::new(FakeApi::with_samples(samples(1)));
    let mut browser = Browser::new(test_app(api.clone()));
    browser.act(&app_url("/1/delete"), &[]).await;
    let body = browser.act(&app_url("/dialog/cancel"), &[]).await;
    assert!(!body.contains("delete-dialog"));
    assert!(body.contains("GEO-001"));
    assert_eq!(api.mutations(), 0);
}

#[test(tokio::test)]
async fn test_delete_failure_keeps_dialog() {
    let api = Arc::new(FakeApi::with_samples(samples(1)));
    let mut browser = Browser::new(test_app(api.clone()));
    browser.act(&app_url("/1/delete"), &[]).await;
    api.fail("Sample is on loan");

    let body = browser.act(&app_url("/dialog/confirm"), &[]).await;
    assert!(body.contains("Sample is on loan"));
    assert!(body.contains("delete-dialog"));
    assert!(body.contains(">Delete<"));
}

#[test(tokio::test)]
async fn test_dismiss_notification() {
    let mut browser = Browser::new(test_app(Arc::new(FakeApi::default())));
    let body = browser.act(&app_url("/nope/edit"), &[]).await;
    assert!(body.contains("Sample not found"));
    let body = browser.act(&app_url("/notification/dismiss"), &[]).await;
    assert!(!body.contains("Sample not found"));
}

#[test(tokio::test)]
async fn test_sessions_are_separate() {
    let app = test_app(Arc::new(FakeApi::with_samples(samples(1))));
    let mut first = Browser::new(app.clone());
    let mut second = Browser::new(app);
    first.act(&app_url("/new"), &[]).await;
    let (_, body) = second.get(&app_url("/")).await;
    assert!(!body.contains("sample-form"));
    assert!(body.contains("GEO-001"));
}

#[test(tokio::test)]
async fn test_dev_proxy() {
    let backend = Router::new().route(
        "/api/v1/samples",
        get(|| async {
            Json(serde_json::json!({"content": [], "totalElements": 0, "totalPages": 0}))
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind");
    let addr = listener.local_addr().expect("no local address");
    tokio::spawn(async move { axum::serve(listener, backend).await });

    let app = test_app_with_base_url(Arc::new(FakeApi::default()), &format!("http://{addr}"));
    let mut browser = Browser::new(app);
    let (status, body) = browser.get("/api/v1/samples?page=0&size=20").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).expect("not json");
    assert_eq!(json["totalElements"], 0);

    let (status, _) = browser.get("/api/v1/nothing-here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[test(tokio::test)]
async fn test_unknown_route() {
    let mut browser = Browser::new(test_app(Arc::new(FakeApi::default())));
    let (status, body) = browser.get("/nowhere/at/all").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("/nowhere/at/all"));
}

#[test(tokio::test)]
async fn test_notification_hides_itself() {
    let api = Arc::new(FakeApi::default());
    let mut browser = Browser::new(test_app(api));
    browser.act(&app_url("/new"), &[]).await;
    let body = browser.act(&app_url("/form"), &valid_form("GEO-5")).await;
    assert!(body.contains("Sample created successfully"));
    assert!(body.contains("animation-delay: 5s"));
}

#[test(tokio::test)]
async fn test_reload_while_deleting() {
    let api = Arc::new(FakeApi::with_samples(samples(2)).slow(Duration::from_millis(100)));
    let mut first_tab = Browser::new(test_app(api.clone()));
    first_tab.get(&app_url("/")).await;
    first_tab.act(&app_url("/1/delete"), &[]).await;
    let mut second_tab = first_tab.same_session();

    let confirm_url = app_url("/dialog/confirm");
    let (confirm, (status, reloaded)) = tokio::join!(
        first_tab.post(&confirm_url, &[]),
        async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            second_tab.get(&app_url("/")).await
        }
    );
    assert_eq!(confirm.status(), StatusCode::SEE_OTHER);
    assert_eq!(status, StatusCode::OK);
    assert!(!reloaded.contains("delete-dialog"));
    assert!(reloaded.contains("Sample deleted successfully"));
    assert_eq!(api.samples.lock().unwrap().len(), 1);

    // both tabs are left usable
    let (_, body) = first_tab.get(&app_url("/")).await;
    assert!(!body.contains("delete-dialog"));
    let body = second_tab.act(&app_url("/2/delete"), &[]).await;
    assert!(body.contains("delete-dialog"));
    let body = second_tab.act(&app_url("/dialog/cancel"), &[]).await;
    assert!(!body.contains("delete-dialog"));
}

#[test(tokio::test)]
async fn test_second_confirm_while_deleting() {
    let api = Arc::new(FakeApi::with_samples(samples(2)).slow(Duration::from_millis(100)));
    let mut first_tab = Browser::new(test_app(api.clone()));
    first_tab.act(&app_url("/2/delete"), &[]).await;
    let mut second_tab = first_tab.same_session();

    let confirm_url = app_url("/dialog/confirm");
    let (first, second) = tokio::join!(
        first_tab.post(&confirm_url, &[]),
        async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            second_tab.post(&app_url("/dialog/confirm"), &[]).await
        }
    );
    assert_eq!(first.status(), StatusCode::SEE_OTHER);
    assert_eq!(second.status(), StatusCode::SEE_OTHER);
    assert_eq!(api.mutations(), 1);
    let (_, body) = first_tab.get(&app_url("/")).await;
    assert!(!body.contains("delete-dialog"));
    assert!(!body.contains("GEO-002"));
}

#[test(tokio::test)]
async fn test_second_submit_while_saving() {
    let api = Arc::new(FakeApi::default().slow(Duration::from_millis(100)));
    let mut first_tab = Browser::new(test_app(api.clone()));
    first_tab.act(&app_url("/new"), &[]).await;
    let mut second_tab = first_tab.same_session();

    let form = valid_form("GEO-9");
    let form_url = app_url("/form");
    let (first, second) = tokio::join!(first_tab.post(&form_url, &form), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        second_tab.post(&app_url("/form"), &form).await
    });
    assert_eq!(first.status(), StatusCode::SEE_OTHER);
    assert_eq!(second.status(), StatusCode::SEE_OTHER);
    assert_eq!(api.mutations(), 1);
    assert_eq!(api.samples.lock().unwrap().len(), 1);

    let (_, body) = first_tab.get(&app_url("/")).await;
    assert!(!body.contains("sample-form"));
    assert!(body.contains("GEO-9"));
}
