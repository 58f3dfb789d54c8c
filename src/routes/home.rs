//! src/routes/home.rs
use crate::dispatch::DispatchConfig;
use actix_web::{http::header::ContentType, web, HttpResponse};

pub async fn home(dispatch_config: web::Data<DispatchConfig>) -> HttpResponse {
    let sender = htmlescape::encode_minimal(&format!(
        "{} <{}>",
        dispatch_config.sender.name().as_ref(),
        dispatch_config.sender.address()
    ));
    let batch_size = dispatch_config.limits.batch_size();
    let daily_cap = dispatch_config.limits.daily_cap();

    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta http-equiv="content-type" content="text/html; charset=utf-8">
    <title>Bulk Email Sender</title>
</head>
<body>
    <h1>Bulk Email Sender</h1>
    <p>Sending as <b>{sender}</b>, {batch_size} emails per batch, at most {daily_cap} per run.</p>
    <form action="/send-bulk-email" method="post" enctype="multipart/form-data">
        <label>Recipients (CSV with an email column)
            <input type="file" name="csvFile" accept=".csv,text/csv" required>
        </label>
        <label>Subject
            <input type="text" placeholder="Enter the subject" name="subject" required>
        </label>
        <label>Body (HTML allowed)
            <textarea name="body" rows="12" placeholder="Enter the email body" required></textarea>
        </label>
        <button type="submit">Send</button>
    </form>
</body>
</html>"#,
        ))
}
