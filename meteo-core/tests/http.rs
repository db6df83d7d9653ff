//! `ReqwestFetcher` and the full client against wiremock servers.

mod common;

use meteo_core::{
    ClientSettings, ErrorKind, JsonFetcher, ReqwestFetcher, SystemClock, WeatherClient,
    geolocation::ConfiguredPosition,
};
use std::{sync::Arc, time::Duration};
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> ReqwestFetcher {
    ReqwestFetcher::new().expect("client construction should not fail")
}

fn endpoint(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{route}", server.uri())).unwrap()
}

#[tokio::test]
async fn decodes_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::places_json("Oslo")))
        .mount(&server)
        .await;

    let value = fetcher()
        .get_json(&endpoint(&server, "/v1/search"), Duration::from_secs(5))
        .await
        .expect("should decode body");

    assert_eq!(value["results"][0]["name"], "Oslo");
}

#[tokio::test]
async fn caller_supplied_client_is_used_as_is() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "meteo-kiosk/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::places_json("Bergen")))
        .expect(1)
        .mount(&server)
        .await;

    let http = reqwest::Client::builder().user_agent("meteo-kiosk/1.0").build().unwrap();
    let value = ReqwestFetcher::with_client(http)
        .get_json(&endpoint(&server, "/v1/search"), Duration::from_secs(5))
        .await
        .expect("should reach the mock with the custom agent");

    assert_eq!(value["results"][0]["name"], "Bergen");
}

#[tokio::test]
async fn non_2xx_is_a_transport_error_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = fetcher()
        .get_json(&endpoint(&server, "/v1/forecast"), Duration::from_secs(5))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "HTTP Error: 500 Internal Server Error");
}

#[tokio::test]
async fn slow_server_is_a_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(common::forecast_json())
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let err = fetcher()
        .get_json(&endpoint(&server, "/v1/forecast"), Duration::from_millis(50))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(err.to_string(), "Request timeout");
}

#[tokio::test]
async fn non_json_body_is_a_data_shape_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = fetcher()
        .get_json(&endpoint(&server, "/v1/forecast"), Duration::from_secs(5))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DataShape);
}

#[tokio::test]
async fn client_end_to_end_caches_the_forecast() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Berlin"))
        .and(query_param("count", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::places_json("Berlin")))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "50"))
        .and(query_param("timezone", "auto"))
        .and(query_param("forecast_days", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::forecast_json()))
        .expect(1)
        .mount(&server)
        .await;

    let settings = ClientSettings {
        geocoding_url: format!("{}/v1/search", server.uri()),
        forecast_url: format!("{}/v1/forecast", server.uri()),
        ..ClientSettings::default()
    };
    let client = WeatherClient::new(
        settings,
        Arc::new(fetcher()),
        Arc::new(ConfiguredPosition::new(None)),
        Arc::new(SystemClock),
    );

    let first = client.get_weather_for_place("Berlin").await.expect("first load");
    let second = client.get_weather_for_place("Berlin").await.expect("second load");

    assert_eq!(first.location.name, "Berlin");
    assert_eq!(first.weather.hourly.len(), 24);
    assert_eq!(first.weather.daily.len(), 7);
    assert_eq!(first.weather, second.weather);
    // Mock expectations are verified when `server` drops.
}

#[tokio::test]
async fn no_position_configured_is_unsupported() {
    let client = WeatherClient::new(
        ClientSettings::default(),
        Arc::new(fetcher()),
        Arc::new(ConfiguredPosition::new(None)),
        Arc::new(SystemClock),
    );

    let err = client.get_weather_for_current_position().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Geolocation);
    assert_eq!(err.to_string(), "Geolocation is not supported on this system.");
}
