//! Shared HTTP client and request helper for network plugins.

use dayboard_core::plugin::{FetchContext, PluginError};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

pub const USER_AGENT: &str = concat!("dayboard/", env!("CARGO_PKG_VERSION"));

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the client every network plugin holds.
///
/// No overall request timeout is set here; the fetch context's deadline
/// bounds each call.
pub fn client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .unwrap_or_else(|e| {
            warn!("Failed to build HTTP client, using defaults: {}", e);
            Client::new()
        })
}

/// Send `request` and decode a JSON body, racing the context.
///
/// `source` names the API in error messages. A non-2xx status is a fetch
/// error carrying the status code.
pub async fn get_json<T>(
    ctx: &FetchContext,
    request: RequestBuilder,
    source: &str,
) -> Result<T, PluginError>
where
    T: DeserializeOwned,
{
    ctx.run(async {
        let response = request
            .send()
            .await
            .map_err(|e| PluginError::fetch_with(format!("{source} request failed"), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PluginError::fetch(format!(
                "{source} returned status {}",
                status.as_u16()
            )));
        }
        debug!(source, status = status.as_u16(), "response received");

        response
            .json::<T>()
            .await
            .map_err(|e| PluginError::fetch_with(format!("failed to decode {source} response"), e))
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Ping {
        ok: bool,
    }

    fn ctx() -> FetchContext {
        FetchContext::with_timeout(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_get_json_decodes_body_and_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let request = client().get(format!("{}/ping", server.uri()));
        let ping: Ping = get_json(&ctx(), request, "ping").await.unwrap();
        assert!(ping.ok);
    }

    #[tokio::test]
    async fn test_get_json_maps_status_to_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let request = client().get(server.uri());
        let err = get_json::<Ping>(&ctx(), request, "ping").await.unwrap_err();
        assert!(matches!(err, PluginError::Fetch { .. }));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_get_json_bad_body_is_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let request = client().get(server.uri());
        let err = get_json::<Ping>(&ctx(), request, "ping").await.unwrap_err();
        assert!(err.to_string().contains("decode"));
    }

    #[tokio::test]
    async fn test_get_json_observes_cancellation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"ok": true}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let ctx = ctx();
        ctx.cancel();
        let request = client().get(server.uri());
        let err = get_json::<Ping>(&ctx, request, "ping").await.unwrap_err();
        assert!(matches!(err, PluginError::Cancelled));
    }
}
