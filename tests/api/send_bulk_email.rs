//! tests/api/send_bulk_email.rs

use crate::helpers::{bulk_email_form, csv_part, setup, setup_with, FakeRelay};
use reqwest::multipart::{Form, Part};
use serde_json::Value;

#[tokio::test]
async fn every_unique_valid_address_receives_the_email() {
    // Arrange
    let test = setup().await;
    let csv = "email\nA@x.com\n a@x.com \nbad\nb@x.com\n";

    // Act
    let response = test
        .post_bulk_email(bulk_email_form(csv, "Hello", "<p>Hello</p>"))
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Bulk email sending completed");
    assert_eq!(body["results"]["total"], 2);
    assert_eq!(body["results"]["sent"], 2);
    assert_eq!(body["results"]["failed"], 0);
    assert_eq!(body["results"]["errors"], serde_json::json!([]));
    assert_eq!(test.relay.recipients(), vec!["a@x.com", "b@x.com"]);
}

#[tokio::test]
async fn an_unrecognised_header_falls_back_to_the_first_column() {
    let test = setup().await;
    let csv = "contact,name\nged@roke.org,Ged\ntenar@atuan.org,Tenar\n";

    let response = test
        .post_bulk_email(bulk_email_form(csv, "Hello", "<p>Hello</p>"))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(test.relay.recipients(), vec!["ged@roke.org", "tenar@atuan.org"]);
}

#[tokio::test]
async fn failed_recipients_are_reported_without_stopping_the_run() {
    let test = setup_with(|_| {}, FakeRelay::rejecting(&["b@x.com"])).await;
    let csv = "email\na@x.com\nb@x.com\nc@x.com\n";

    let response = test
        .post_bulk_email(bulk_email_form(csv, "Hello", "<p>Hello</p>"))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["results"]["sent"], 2);
    assert_eq!(body["results"]["failed"], 1);
    assert_eq!(body["results"]["errors"][0]["email"], "b@x.com");
    assert_eq!(
        body["results"]["errors"][0]["error"],
        "550 b@x.com mailbox unavailable"
    );
    assert_eq!(test.relay.recipients().len(), 3);
}

#[tokio::test]
async fn only_the_first_ten_failures_are_listed() {
    let addresses: Vec<String> = (0..12).map(|i| format!("user{}@x.com", i)).collect();
    let rejected: Vec<&str> = addresses.iter().map(String::as_str).collect();
    let test = setup_with(|_| {}, FakeRelay::rejecting(&rejected)).await;
    let csv = format!("email\n{}\n", addresses.join("\n"));

    let response = test
        .post_bulk_email(bulk_email_form(&csv, "Hello", "<p>Hello</p>"))
        .await;

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["results"]["failed"], 12);
    assert_eq!(body["results"]["errors"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn the_daily_cap_limits_who_is_attempted() {
    let test = setup_with(
        |config| {
            config.dispatch.daily_cap = Some("3".to_string());
            config.dispatch.batch_size = Some("2".to_string());
        },
        FakeRelay::default(),
    )
    .await;
    let csv = "email\n1@x.com\n2@x.com\n3@x.com\n4@x.com\n5@x.com\n";

    let response = test
        .post_bulk_email(bulk_email_form(csv, "Hello", "<p>Hello</p>"))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["results"]["total"], 3);
    assert_eq!(body["results"]["candidates"], 5);
    assert_eq!(body["results"]["skipped"], 2);
    assert_eq!(test.relay.recipients(), vec!["1@x.com", "2@x.com", "3@x.com"]);
}

#[tokio::test]
async fn invalid_limits_fall_back_to_defaults() {
    let test = setup_with(
        |config| {
            config.dispatch.daily_cap = Some("-1".to_string());
            config.dispatch.batch_size = Some("plenty".to_string());
        },
        FakeRelay::default(),
    )
    .await;
    let csv = "email\n1@x.com\n2@x.com\n";

    let response = test
        .post_bulk_email(bulk_email_form(csv, "Hello", "<p>Hello</p>"))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(test.relay.recipients().len(), 2);
}

#[tokio::test]
async fn send_bulk_email_returns_400_for_invalid_data() {
    // Arrange
    let test = setup().await;
    let csv = "email\na@x.com\n";

    let test_cases = vec![
        (
            Form::new().text("subject", "Hello").text("body", "<p>Hello</p>"),
            "CSV file is required",
        ),
        (
            bulk_email_form(csv, "", "<p>Hello</p>"),
            "Subject is required",
        ),
        (
            bulk_email_form(csv, "   ", "<p>Hello</p>"),
            "Subject is required",
        ),
        (
            bulk_email_form(csv, "Hello", "  \n"),
            "Email body is required",
        ),
        (
            Form::new()
                .part("csvFile", csv_part(csv, "recipients.txt", "text/plain"))
                .text("subject", "Hello")
                .text("body", "<p>Hello</p>"),
            "Only CSV files are allowed",
        ),
        (
            bulk_email_form("email\nnobody\n@x.com\n", "Hello", "<p>Hello</p>"),
            "No valid email addresses found in CSV",
        ),
        (
            // Would be rejected for its addresses if it were ever parsed.
            bulk_email_form("email\nnobody\n", "", "<p>Hello</p>"),
            "Subject is required",
        ),
        (
            Form::new()
                .part(
                    "csvFile",
                    Part::bytes(b"\x00\xff\"\n\"\r\xfe".to_vec())
                        .file_name("recipients.csv")
                        .mime_str("text/csv")
                        .unwrap(),
                )
                .text("subject", "   ")
                .text("body", "<p>Hello</p>"),
            "Subject is required",
        ),
    ];

    for (form, error_message) in test_cases {
        // Act
        let response = test.post_bulk_email(form).await;

        // Assert
        assert_eq!(
            response.status().as_u16(),
            400,
            "The API did not fail with 400 Bad Request when expecting `{}`.",
            error_message
        );
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], error_message);
    }

    // Nothing was sent for any of the rejected requests.
    assert!(test.relay.recipients().is_empty());
}

#[tokio::test]
async fn a_csv_named_file_is_accepted_whatever_its_content_type() {
    let test = setup().await;
    let form = Form::new()
        .part(
            "csvFile",
            csv_part("email\na@x.com\n", "recipients.csv", "application/octet-stream"),
        )
        .text("subject", "Hello")
        .text("body", "<p>Hello</p>");

    let response = test.post_bulk_email(form).await;

    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn uploads_over_the_limit_are_rejected() {
    let test = setup_with(
        |config| config.application.upload_limit_bytes = 64,
        FakeRelay::default(),
    )
    .await;
    let csv = format!("email\n{}", "a@x.com\n".repeat(20));

    let response = test
        .post_bulk_email(bulk_email_form(&csv, "Hello", "<p>Hello</p>"))
        .await;

    assert_eq!(response.status().as_u16(), 400);
    assert!(test.relay.recipients().is_empty());
}

#[tokio::test]
async fn non_utf8_bytes_in_other_columns_do_not_lose_recipients() {
    let test = setup().await;
    let form = Form::new()
        .part(
            "csvFile",
            Part::bytes(b"name,email\nJos\xe9,jose@x.com\nAnn,ann@x.com\n".to_vec())
                .file_name("recipients.csv")
                .mime_str("text/csv")
                .unwrap(),
        )
        .text("subject", "Hello")
        .text("body", "<p>Hello</p>");

    let response = test.post_bulk_email(form).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["results"]["sent"], 2);
    assert_eq!(test.relay.recipients(), vec!["jose@x.com", "ann@x.com"]);
}
