//! Router-level tests for the contact and newsletter endpoints.

use axum::http::{header, Method, StatusCode};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::time::Duration;

use susi_forms::forms::Submission;

mod common;
use common::{contact_body, post_json, send, spawn_app, test_config};

const CONTACT: &str = "/api/contact";
const NEWSLETTER: &str = "/api/newsletter";
const WINDOW: Duration = Duration::from_secs(15 * 60);

#[tokio::test]
async fn test_non_post_is_405_regardless_of_body() {
    let app = spawn_app(test_config());
    let contact = contact_body().to_string();

    for uri in [CONTACT, NEWSLETTER] {
        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
            for body in ["", "{}", "not json", contact.as_str()] {
                let res = send(&app.router, method.clone(), uri, Some("1.1.1.1"), body).await;
                assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
                assert_eq!(res.headers[header::ALLOW], "POST");
                assert_eq!(res.json["success"], false);
                assert_eq!(res.json["error"], "method_not_allowed");
            }
        }
    }
    assert_eq!(app.limiter_calls(), 0);
}

#[tokio::test]
async fn test_contact_missing_fields_skip_limiter() {
    let app = spawn_app(test_config());

    for field in ["name", "email", "company", "industry", "message"] {
        let mut body = contact_body();
        body.as_object_mut().unwrap().remove(field);

        let res = post_json(&app.router, CONTACT, "2.2.2.2", body).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "without {field}");
        assert_eq!(res.json["error"], "missing_fields");
        assert!(res.json["message"].as_str().unwrap().contains(field));
    }

    let res = post_json(&app.router, CONTACT, "2.2.2.2", json!({ "name": "" })).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.json["message"],
        "Pflichtfelder fehlen: name, company, email, industry, message"
    );

    assert_eq!(app.limiter_calls(), 0);
    assert_eq!(app.sink.count(), 0);
}

#[tokio::test]
async fn test_contact_rejects_malformed_email_and_phone() {
    let app = spawn_app(test_config());

    let mut body = contact_body();
    body["email"] = json!("anna at muster.ch");
    let res = post_json(&app.router, CONTACT, "3.3.3.3", body).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json["error"], "invalid_email");

    let mut body = contact_body();
    body["phone"] = json!("12-34");
    body["locale"] = json!("en");
    let res = post_json(&app.router, CONTACT, "3.3.3.3", body).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json["error"], "invalid_phone");
    assert_eq!(res.json["message"], "Please enter a valid phone number.");

    assert_eq!(app.limiter_calls(), 0);
}

#[tokio::test]
async fn test_contact_success_delivers_sanitized_submission() {
    let app = spawn_app(test_config());

    let mut body = contact_body();
    body["message"] = json!("  <b>Hallo</b> Team  ");
    body.as_object_mut().unwrap().remove("phone");

    let res = post_json(&app.router, CONTACT, "4.4.4.4", body).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json["success"], true);
    assert_eq!(
        res.json["message"],
        "Vielen Dank für Ihre Anfrage! Wir melden uns innerhalb von 24 Stunden bei Ihnen."
    );
    assert!(res.json.get("error").is_none());

    let delivered = app.sink.delivered.lock().unwrap();
    match &delivered[..] {
        [Submission::Contact(c)] => {
            assert_eq!(c.message, "bHallo/b Team");
            assert_eq!(c.client, "4.4.4.4");
            assert_eq!(c.phone, None);
        }
        other => panic!("unexpected deliveries {other:?}"),
    }
}

#[tokio::test]
async fn test_contact_without_interest_is_accepted() {
    let app = spawn_app(test_config());

    let mut body = contact_body();
    body.as_object_mut().unwrap().remove("interest");

    let res = post_json(&app.router, CONTACT, "4.4.4.5", body).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json["success"], true);

    let delivered = app.sink.delivered.lock().unwrap();
    match &delivered[..] {
        [Submission::Contact(c)] => assert_eq!(c.interest, ""),
        other => panic!("unexpected deliveries {other:?}"),
    }
}

#[tokio::test]
async fn test_newsletter_end_to_end_german() {
    let app = spawn_app(test_config());

    let res = post_json(
        &app.router,
        NEWSLETTER,
        "5.5.5.5",
        json!({ "email": "user@example.com", "locale": "de" }),
    )
    .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(
        res.json,
        json!({
            "success": true,
            "message": "Erfolgreich angemeldet! Willkommen bei Projekt Susi."
        })
    );
    assert_eq!(app.sink.count(), 1);
}

#[tokio::test]
async fn test_newsletter_english_and_default_locale() {
    let mut config = test_config();
    config.forms.default_locale = "en".into();
    let app = spawn_app(config);

    let res = post_json(
        &app.router,
        NEWSLETTER,
        "5.5.5.6",
        json!({ "email": "user@example.com" }),
    )
    .await;
    assert_eq!(res.json["message"], "Successfully subscribed! Welcome to Projekt Susi.");

    let res = post_json(
        &app.router,
        NEWSLETTER,
        "5.5.5.7",
        json!({ "email": "user@example.com", "locale": "de-CH" }),
    )
    .await;
    assert_eq!(
        res.json["message"],
        "Erfolgreich angemeldet! Willkommen bei Projekt Susi."
    );
}

#[tokio::test]
async fn test_newsletter_missing_and_invalid_email() {
    let app = spawn_app(test_config());

    let res = post_json(&app.router, NEWSLETTER, "6.6.6.6", json!({ "locale": "de" })).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json["error"], "missing_fields");

    let res = post_json(&app.router, NEWSLETTER, "6.6.6.6", json!({ "email": "nope@" })).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json["error"], "invalid_email");

    assert_eq!(app.limiter_calls(), 0);
}

#[tokio::test]
async fn test_sixth_request_limited_until_window_elapses() {
    let app = spawn_app(test_config());
    let body = json!({ "email": "user@example.com", "locale": "en" });

    for _ in 0..5 {
        let res = post_json(&app.router, NEWSLETTER, "7.7.7.7", body.clone()).await;
        assert_eq!(res.status, StatusCode::OK);
    }

    let res = post_json(&app.router, NEWSLETTER, "7.7.7.7", body.clone()).await;
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(res.json["error"], "rate_limited");
    assert_eq!(res.json["message"], "Too many requests. Please try again later.");
    assert_eq!(res.headers[header::RETRY_AFTER], "900");

    app.clock.advance(WINDOW);

    // Fresh window: the counter restarts at 1.
    for _ in 0..5 {
        let res = post_json(&app.router, NEWSLETTER, "7.7.7.7", body.clone()).await;
        assert_eq!(res.status, StatusCode::OK);
    }
    let res = post_json(&app.router, NEWSLETTER, "7.7.7.7", body).await;
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);

    assert_eq!(app.sink.count(), 10);
}

#[tokio::test]
async fn test_contact_is_rate_limited_separately() {
    let app = spawn_app(test_config());
    let newsletter = json!({ "email": "user@example.com" });

    for _ in 0..6 {
        post_json(&app.router, NEWSLETTER, "8.8.8.8", newsletter.clone()).await;
    }

    for _ in 0..5 {
        let res = post_json(&app.router, CONTACT, "8.8.8.8", contact_body()).await;
        assert_eq!(res.status, StatusCode::OK);
    }
    let res = post_json(&app.router, CONTACT, "8.8.8.8", contact_body()).await;
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);
    assert!(res.headers.contains_key(header::RETRY_AFTER));
}

#[tokio::test]
async fn test_forwarded_for_first_hop_is_the_key() {
    let app = spawn_app(test_config());
    let body = json!({ "email": "user@example.com" });

    for hop in ["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.4", "10.0.0.5"] {
        let client = format!("9.9.9.9, {hop}");
        let res = post_json(&app.router, NEWSLETTER, &client, body.clone()).await;
        assert_eq!(res.status, StatusCode::OK);
    }

    let res = post_json(&app.router, NEWSLETTER, "9.9.9.9", body.clone()).await;
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);

    let res = post_json(&app.router, NEWSLETTER, "9.9.9.10", body).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_client_shares_one_bucket() {
    let app = spawn_app(test_config());
    let body = json!({ "email": "user@example.com" }).to_string();

    for _ in 0..5 {
        let res = send(&app.router, Method::POST, NEWSLETTER, None, &body).await;
        assert_eq!(res.status, StatusCode::OK);
    }
    let res = send(&app.router, Method::POST, NEWSLETTER, None, &body).await;
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_disposable_domains_rejected() {
    let app = spawn_app(test_config());

    for (i, email) in ["test@mailinator.com", "Someone@YOPMAIL.com"].iter().enumerate() {
        let client = format!("11.0.0.{i}");
        let res = post_json(&app.router, NEWSLETTER, &client, json!({ "email": email })).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{email}");
        assert_eq!(res.json["error"], "disposable_email");
        assert_eq!(res.json["message"], "Wegwerf-E-Mail-Adressen sind nicht erlaubt.");
    }
    assert_eq!(app.sink.count(), 0);
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let app = spawn_app(test_config());

    for body in ["", "{not json", r#"{"email": 5}"#, "null"] {
        let res = send(&app.router, Method::POST, NEWSLETTER, Some("12.0.0.1"), body).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{body:?}");
        assert_eq!(res.json["error"], "invalid_body");
    }
}

#[tokio::test]
async fn test_oversized_body_is_400() {
    let mut config = test_config();
    config.security.max_body_size = 64;
    let app = spawn_app(config);

    let mut body = contact_body();
    body["message"] = json!("x".repeat(500));
    let res = post_json(&app.router, CONTACT, "12.0.0.2", body).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json["error"], "invalid_body");
}

#[tokio::test]
async fn test_sink_failure_is_generic_500() {
    let app = spawn_app(test_config());
    app.sink.fail.store(true, Ordering::SeqCst);

    let res = post_json(&app.router, CONTACT, "13.0.0.1", contact_body()).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json["success"], false);
    assert_eq!(res.json["error"], "internal_error");
    assert!(!res.json["message"].as_str().unwrap().contains("relay"));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = spawn_app(test_config());

    let res = post_json(&app.router, NEWSLETTER, "14.0.0.1", json!({ "email": "a@b.co" })).await;
    let id = res.headers["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
}

#[tokio::test]
async fn test_reloaded_policy_applies_to_next_request() {
    let app = spawn_app(test_config());
    let body = json!({ "email": "user@example.com" });

    let res = post_json(&app.router, NEWSLETTER, "15.0.0.1", body.clone()).await;
    assert_eq!(res.status, StatusCode::OK);

    let mut updated = test_config();
    updated.rate_limit.max_requests = 1;
    app.state.apply_config(updated);

    let res = post_json(&app.router, NEWSLETTER, "15.0.0.1", body.clone()).await;
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);

    let mut disabled = test_config();
    disabled.rate_limit.enabled = false;
    app.state.apply_config(disabled);

    let res = post_json(&app.router, NEWSLETTER, "15.0.0.1", body).await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_raised_limit_admits_within_open_window() {
    let app = spawn_app(test_config());
    let body = json!({ "email": "user@example.com" });

    let mut statuses = Vec::new();
    for _ in 0..8 {
        statuses.push(post_json(&app.router, NEWSLETTER, "16.0.0.1", body.clone()).await.status);
    }
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 5);
    assert_eq!(statuses[5..], [StatusCode::TOO_MANY_REQUESTS; 3]);

    let mut raised = test_config();
    raised.rate_limit.max_requests = 7;
    app.state.apply_config(raised);

    for _ in 0..2 {
        let res = post_json(&app.router, NEWSLETTER, "16.0.0.1", body.clone()).await;
        assert_eq!(res.status, StatusCode::OK);
    }
    let res = post_json(&app.router, NEWSLETTER, "16.0.0.1", body).await;
    assert_eq!(res.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(app.sink.count(), 7);
}
