use axum::response::Html;
use chrono::{Datelike, Utc};

/// Публичная заглушка сайта.
pub async fn landing() -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Coming Soon</title>
</head>
<body>
  <main>
    <h1>Coming Soon</h1>
    <p>Live results, schedules and entries for track, field and cross country events.</p>
  </main>
  <footer>&copy; {} All rights reserved.</footer>
</body>
</html>
"#,
        Utc::now().year()
    ))
}

pub async fn health() -> &'static str {
    "OK"
}
