//! tests/api/home.rs

use crate::helpers::{setup_with, FakeRelay};

#[tokio::test]
async fn home_serves_the_upload_form() {
    let test = setup_with(
        |config| {
            config.sender.name = "Earthsea News".to_string();
            config.dispatch.batch_size = Some("25".to_string());
        },
        FakeRelay::default(),
    )
    .await;

    let response = test.get("/").await;

    assert_eq!(response.status().as_u16(), 200);
    let html = response.text().await.unwrap();
    assert!(html.contains(r#"action="/send-bulk-email""#));
    assert!(html.contains(r#"name="csvFile""#));
    assert!(html.contains("Earthsea News &lt;"));
    assert!(html.contains("25 emails per batch"));
}
