use reqwest::{Client, StatusCode};

/// Fetches the raw price history payload from the API endpoint.
///
/// Transport failures and non-200 responses degrade to an empty string so the
/// caller always gets text back; the problem itself is reported on stderr.
pub async fn fetch(endpoint: &str) -> String {
    let client = Client::new();
    let resp = client.get(endpoint).send().await;

    match resp {
        Ok(response) => {
            let status = response.status();

            if status != StatusCode::OK {
                eprintln!(
                    "Could not fetch price info from {} (status {})",
                    endpoint, status
                );
                return String::new();
            }

            match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    eprintln!("Failed to read response body from {}: {}", endpoint, e);
                    String::new()
                }
            }
        }
        Err(e) => {
            eprintln!("{}", e);
            String::new()
        }
    }
}
