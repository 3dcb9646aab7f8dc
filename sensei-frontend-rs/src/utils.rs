pub fn set_panic_hook() {
    // When the `console_error_panic_hook` feature is enabled, panics are
    // reported through `console.error` instead of vanishing into an
    // opaque "unreachable executed".
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// POST a JSON body to the generation backend. Every call carries an
/// Authorization header; "anonymous" stands in when no credential is
/// configured so the backend can rate-limit uniformly.
pub(crate) async fn hit_ai_server(
    path: &str,
    request: impl serde::Serialize,
    access_token: Option<&String>,
) -> Result<fetch_happen::Response, fetch_happen::Error> {
    let client = fetch_happen::Client;
    let url = if cfg!(feature = "local-backend") {
        "http://localhost:8080"
    } else {
        "https://sensei-ai-backend.fly.dev"
    };
    let token = access_token.map(|t| t.as_str()).unwrap_or("anonymous");
    let response = client
        .post(format!("{url}{path}"))
        .json(&request)?
        .header("Authorization", format!("Bearer {token}"))
        .send()
        .await?;
    Ok(response)
}
