//! Integration tests for the Serper and DuckDuckGo providers
//!
//! These tests use wiremock to stand in for both remote APIs.

use serde_json::json;
use std::sync::Arc;
use websearch_rs::config::{BackendMode, FallbackSettings, PrimarySettings};
use websearch_rs::engines::{DuckDuckGo, FallbackClient, SearchProvider, Serper};
use websearch_rs::network::{HttpClient, SharedRng, UserAgentRotator};
use websearch_rs::{ProviderOutcome, SearchError, SearchQuery, SearchResult};
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RESULTS_PAGE: &str = r#"
<html><body>
  <div class="result results_links">
    <a class="result__a" href="//duckduckgo.com/l/?uddg=http%3A%2F%2Fa&amp;rut=1">A</a>
    <a class="result__snippet" href="//duckduckgo.com/l/?uddg=http%3A%2F%2Fa">s</a>
  </div>
  <div class="result results_links">
    <a class="result__a" href="http://b">B</a>
  </div>
</body></html>
"#;

const TOKEN_PAGE: &str = r#"<html><script>DDG.ready(function(){vqd="4-1234567890";});</script></html>"#;

const WEB_RESULTS: &str = r#"DDG.pageLayout.load('d',[{"a":"The <b>official</b> site","t":"Rust","u":"https://www.rust-lang.org/"},{"n":"/d.js?q=rust&s=1"}]);DDG.duckbar.load('images');"#;

fn serper(server: &MockServer, api_key: Option<&str>) -> Serper {
    let settings = PrimarySettings {
        api_key: api_key.map(String::from),
        endpoint: format!("{}/search", server.uri()),
        disabled: false,
    };
    Serper::new(HttpClient::new().unwrap(), &settings)
}

fn fallback_settings(server: &MockServer) -> FallbackSettings {
    FallbackSettings {
        vqd_url: format!("{}/", server.uri()),
        api_url: format!("{}/d.js", server.uri()),
        html_url: format!("{}/html/", server.uri()),
        initial_delay: 0.0,
        max_jitter: 0.0,
        mode_switch_delay: 0.0,
        ..FallbackSettings::default()
    }
}

fn fallback(settings: &FallbackSettings) -> FallbackClient {
    let client = HttpClient::new().unwrap();
    let backend = Arc::new(DuckDuckGo::new(client, settings));
    FallbackClient::with_rng(backend, settings, SharedRng::seeded(17))
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_string_contains("q=rust"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TOKEN_PAGE))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_serper_returns_organic_results_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("X-API-KEY", "test-key"))
        .and(body_json(json!({"q": "rust", "num": 10})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "organic": [
                {"link": "http://1", "title": "One", "snippet": "first"},
                {"link": "http://2", "title": "Two", "snippet": "second"},
                {"link": "http://3", "title": "Three"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = SearchQuery::new("rust").unwrap();
    let outcome = serper(&server, Some("test-key")).search(&query).await;

    let results = match outcome {
        ProviderOutcome::Success(results) => results,
        other => panic!("expected success, got {:?}", other),
    };
    assert_eq!(results.len(), 3);
    assert_eq!(results[0], SearchResult::new("http://1", "One", "first"));
    assert_eq!(results[1].url.as_deref(), Some("http://2"));
    assert_eq!(results[2].snippet, None);
}

#[tokio::test]
async fn test_serper_http_error_is_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let query = SearchQuery::new("rust").unwrap();
    assert_eq!(
        serper(&server, Some("bad-key")).search(&query).await,
        ProviderOutcome::Failure(SearchError::HttpStatus(403))
    );
}

#[tokio::test]
async fn test_serper_empty_organic_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"organic": []})))
        .mount(&server)
        .await;

    let query = SearchQuery::new("rust").unwrap();
    assert_eq!(
        serper(&server, Some("key")).search(&query).await,
        ProviderOutcome::Empty
    );
}

#[tokio::test]
async fn test_serper_malformed_body_is_protocol_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let query = SearchQuery::new("rust").unwrap();
    let outcome = serper(&server, Some("key")).search(&query).await;
    assert!(matches!(
        outcome,
        ProviderOutcome::Failure(SearchError::Protocol(_))
    ));
}

#[tokio::test]
async fn test_serper_without_key_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let query = SearchQuery::new("rust").unwrap();
    let outcome = serper(&server, None).search(&query).await;
    assert!(matches!(
        outcome,
        ProviderOutcome::Failure(SearchError::Configuration(_))
    ));
}

#[tokio::test]
async fn test_duckduckgo_api_mode_success_skips_html() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/d.js"))
        .and(query_param("q", "rust"))
        .and(query_param("vqd", "4-1234567890"))
        .respond_with(ResponseTemplate::new(200).set_body_string(WEB_RESULTS))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let query = SearchQuery::new("rust").unwrap();
    let outcome = fallback(&fallback_settings(&server)).search(&query).await;

    assert_eq!(
        outcome,
        ProviderOutcome::Success(vec![SearchResult::new(
            "https://www.rust-lang.org/",
            "Rust",
            "The official site"
        )])
    );
}

#[tokio::test]
async fn test_duckduckgo_api_failure_switches_to_html() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let query = SearchQuery::new("rust").unwrap();
    let outcome = fallback(&fallback_settings(&server)).search(&query).await;

    assert_eq!(
        outcome,
        ProviderOutcome::Success(vec![
            SearchResult::new("http://a", "A", "s"),
            SearchResult::from_parts(Some("http://b".to_string()), Some("B".to_string()), None),
        ])
    );
}

#[tokio::test]
async fn test_duckduckgo_unrecognised_api_payload_switches_to_html() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    // An Instant Answer style body carries no web results
    Mock::given(method("GET"))
        .and(path("/d.js"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"RelatedTopics": []})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let query = SearchQuery::new("rust").unwrap();
    let outcome = fallback(&fallback_settings(&server)).search(&query).await;

    match outcome {
        ProviderOutcome::Success(results) => assert_eq!(results.len(), 2),
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_duckduckgo_missing_token_switches_to_html() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/d.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string(WEB_RESULTS))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let query = SearchQuery::new("rust").unwrap();
    assert!(fallback(&fallback_settings(&server))
        .search(&query)
        .await
        .is_success());
}

#[tokio::test]
async fn test_duckduckgo_api_with_no_web_results_is_empty() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/d.js"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("DDG.pageLayout.load('d',[]);DDG.duckbar.load('images');"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
        .expect(0)
        .mount(&server)
        .await;

    let query = SearchQuery::new("rust").unwrap();
    assert_eq!(
        fallback(&fallback_settings(&server)).search(&query).await,
        ProviderOutcome::Empty
    );
}

#[tokio::test]
async fn test_duckduckgo_captcha_topic_is_not_blocked() {
    let server = MockServer::start().await;

    let page = r#"
<html><body>
  <form id="search_form" action="/html/"><input name="q" value="recaptcha"></form>
  <div class="result results_links">
    <a class="result__a" href="https://www.google.com/recaptcha/about/">reCAPTCHA</a>
    <a class="result__snippet">Stops unusual traffic with an invisible CAPTCHA.</a>
  </div>
</body></html>
"#;

    Mock::given(method("POST"))
        .and(path("/html/"))
        .and(body_string_contains("q=recaptcha"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .expect(1)
        .mount(&server)
        .await;

    let settings = FallbackSettings {
        modes: vec![BackendMode::Html],
        ..fallback_settings(&server)
    };
    let query = SearchQuery::new("recaptcha").unwrap();

    assert_eq!(
        fallback(&settings).search(&query).await,
        ProviderOutcome::Success(vec![SearchResult::new(
            "https://www.google.com/recaptcha/about/",
            "reCAPTCHA",
            "Stops unusual traffic with an invisible CAPTCHA."
        )])
    );
}

#[tokio::test]
async fn test_duckduckgo_challenge_page_is_blocked() {
    let server = MockServer::start().await;

    let page = r#"<html><body>
  <div class="anomaly-modal"><form id="challenge-form" action="/anomaly.js"></form></div>
</body></html>"#;

    Mock::given(method("POST"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page))
        .expect(1)
        .mount(&server)
        .await;

    let settings = FallbackSettings {
        modes: vec![BackendMode::Html],
        ..fallback_settings(&server)
    };
    let query = SearchQuery::new("rust").unwrap().with_max_retries(1);

    match fallback(&settings).search(&query).await {
        ProviderOutcome::Failure(SearchError::ExhaustedRetries { attempts, last }) => {
            assert_eq!(attempts, 1);
            assert!(matches!(*last, SearchError::Blocked(_)));
        }
        other => panic!("expected blocked failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_duckduckgo_exhausts_retry_budget() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(429))
        .expect(2)
        .mount(&server)
        .await;

    let query = SearchQuery::new("rust").unwrap().with_max_retries(2);
    let outcome = fallback(&fallback_settings(&server)).search(&query).await;

    match outcome {
        ProviderOutcome::Failure(SearchError::ExhaustedRetries { attempts, last }) => {
            assert_eq!(attempts, 2);
            assert!(matches!(*last, SearchError::Blocked(_)));
        }
        other => panic!("expected exhausted retries, got {:?}", other),
    }
}

#[tokio::test]
async fn test_duckduckgo_sends_rotated_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let settings = FallbackSettings {
        modes: vec![BackendMode::Html],
        ..fallback_settings(&server)
    };
    let query = SearchQuery::new("rust").unwrap();
    assert!(fallback(&settings).search(&query).await.is_success());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    // wiremock splits header values on commas; join them back together
    let sent = requests[0]
        .headers
        .iter()
        .find(|(name, _)| name.as_str().eq_ignore_ascii_case("user-agent"))
        .map(|(_, values)| {
            values
                .iter()
                .map(|value| value.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .expect("user agent header");

    // Same seed as the client under test, so the first draw matches
    let expected = UserAgentRotator::seeded(17).next();
    assert_eq!(sent, expected);
    assert!(UserAgentRotator::pool().contains(&sent.as_str()));
}
