//! Client integration tests
//!
//! Drives the client against a wiremock server: refresh ordering, readiness,
//! action preconditions and upstream error reporting.

mod common;

use common::{MockData, MockServerFactory, TestUtils, helpers::client_for};
use f1tv_api::{
    ClientEvent, Error, F1TvClient, Platform,
    types::{PictureOptions, SearchVodParams},
};
use pretty_assertions::assert_eq;
use std::time::Duration;
use tokio::time::timeout;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WAIT: Duration = Duration::from_secs(5);

/// Registered session: entitlement "ENT-1", location scoped to US / PRO
async fn setup_registered(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path("/2.0/R/ENG/WEB_DASH/ALL/USER/ENTITLEMENT"))
        .and(header("ascendontoken", token))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockData::entitlement("ENT-1")))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/1.0/R/ENG/WEB_DASH/ALL/USER/LOCATION"))
        .and(query_param("homeCountry", "US"))
        .and(header("entitlementtoken", "ENT-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockData::location("PRO", 2)))
        .expect(1)
        .mount(server)
        .await;

    MockServerFactory::setup_config(server).await;
}

async fn ready_anonymous_client(server: &MockServer) -> F1TvClient {
    MockServerFactory::setup_anonymous(server).await;
    let client = client_for(server, None, false);
    client.refresh_location().await.unwrap();
    client
}

#[tokio::test]
async fn test_anonymous_location_then_search() {
    TestUtils::init_logger();
    let server = MockServerFactory::new().await;
    MockServerFactory::setup_anonymous(&server).await;

    Mock::given(method("GET"))
        .and(path("/2.0/A/ENG/WEB_DASH/ALL/PAGE/SEARCH/VOD/ANONYMOUS/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockData::search(3)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, None, true);
    timeout(WAIT, client.when_location_ready()).await.unwrap();

    let location = client.location().unwrap();
    assert_eq!(location.user_location[0].group_id, 1);
    assert_eq!(location.user_location[0].entitlement, "ANONYMOUS");
    assert!(location.countries.is_empty());

    let results = client.search_vod(&SearchVodParams::new()).await.unwrap();
    assert_eq!(results.total, 3);
}

#[tokio::test]
async fn test_registered_chain_runs_in_order() {
    TestUtils::init_logger();
    let server = MockServerFactory::new().await;
    let token = MockData::subscriber_token("1001", "US");
    setup_registered(&server, &token).await;

    let client = client_for(&server, Some(&token), true);
    timeout(WAIT, client.when_ready()).await.unwrap();

    assert!(client.is_ready());
    assert_eq!(client.entitlement().as_deref(), Some("ENT-1"));
    assert_eq!(client.location().unwrap().user_location[0].entitlement, "PRO");
    assert_eq!(client.config().unwrap().version, "7");
}

#[tokio::test]
async fn test_refresh_all_emits_events_in_chain_order() {
    let server = MockServerFactory::new().await;
    let token = MockData::subscriber_token("1001", "US");
    setup_registered(&server, &token).await;

    let client = client_for(&server, Some(&token), false);
    let mut events = client.subscribe_events();
    client.refresh_all().await;

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }

    assert!(matches!(
        seen.as_slice(),
        [
            ClientEvent::EntitlementUpdated,
            ClientEvent::LocationUpdated,
            ClientEvent::ConfigUpdated,
            ClientEvent::Ready
        ]
    ));
}

#[tokio::test]
async fn test_ready_event_emitted_once() {
    let server = MockServerFactory::new().await;
    let client = ready_anonymous_client(&server).await;
    let mut events = client.subscribe_events();

    client.refresh_config().await.unwrap();
    client.refresh_location().await.unwrap();
    client.refresh_config().await.unwrap();

    let mut ready = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event, ClientEvent::Ready) {
            ready += 1;
        }
    }
    assert_eq!(ready, 1);
}

#[tokio::test]
async fn test_when_location_ready_resolves_immediately_once_populated() {
    let server = MockServerFactory::new().await;
    let client = ready_anonymous_client(&server).await;

    timeout(Duration::from_millis(1), client.when_location_ready())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_concurrent_waiters_released_together() {
    let server = MockServerFactory::new().await;
    MockServerFactory::setup_anonymous(&server).await;
    let client = client_for(&server, None, false);

    let waiters: Vec<_> = (0..4)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.when_location_ready().await })
        })
        .collect();

    client.refresh_location().await.unwrap();

    for waiter in waiters {
        timeout(WAIT, waiter).await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn test_content_video_upstream_error_carries_status_and_body() {
    let server = MockServerFactory::new().await;
    let client = ready_anonymous_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/4.0/A/ENG/WEB_DASH/ALL/CONTENT/VIDEO/1000005001/ANONYMOUS/1"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"error":"not found"}"#))
        .mount(&server)
        .await;

    match client.content_video(1000005001).await.unwrap_err() {
        Error::Upstream { status, body, .. } => {
            assert_eq!(status, 404);
            assert_eq!(body, r#"{"error":"not found"}"#);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_content_video_empty_containers() {
    let server = MockServerFactory::new().await;
    let client = ready_anonymous_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/4.0/A/ENG/WEB_DASH/ALL/CONTENT/VIDEO/7/ANONYMOUS/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockData::video(&[])))
        .mount(&server)
        .await;

    let err = client.content_video(7).await.unwrap_err();
    assert!(matches!(err, Error::EmptyResult { .. }));
    assert_eq!(err.to_string(), "No containers found");
}

#[tokio::test]
async fn test_content_video_selects_first_of_many() {
    let server = MockServerFactory::new().await;
    let client = ready_anonymous_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/4.0/A/ENG/WEB_DASH/ALL/CONTENT/VIDEO/7/ANONYMOUS/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockData::video(&[11, 12])))
        .mount(&server)
        .await;

    let selected = client.content_video(7).await.unwrap();
    assert!(selected.is_ambiguous());
    assert_eq!(selected.discarded, 1);
    assert_eq!(selected.item.id, 11);
    assert_eq!(selected.item.title(), Some("Item 11"));
}

#[tokio::test]
async fn test_content_play_sends_both_tokens() {
    let server = MockServerFactory::new().await;
    let token = MockData::subscriber_token("1001", "US");

    Mock::given(method("GET"))
        .and(path("/2.0/R/ENG/WEB_DASH/ALL/USER/ENTITLEMENT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockData::entitlement("ENT-1")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/2.0/R/ENG/BIG_SCREEN_HLS/ALL/CONTENT/PLAY"))
        .and(query_param("contentId", "1000005001"))
        .and(query_param("channelId", "1011"))
        .and(header("ascendontoken", token.as_str()))
        .and(header("entitlementtoken", "ENT-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockData::envelope(
            serde_json::json!({
                "entitlementToken": "ENT-1",
                "url": "https://stream.example/manifest.mpd",
                "streamType": "DASHWV",
                "laURL": "https://license.example/",
                "channelId": 1011
            }),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some(&token), false);
    client.refresh_entitlement().await.unwrap();

    let play = client
        .content_play(1000005001, Some(1011), Some(Platform::BigScreenHls))
        .await
        .unwrap();
    assert_eq!(play.url, "https://stream.example/manifest.mpd");
    assert_eq!(play.la_url.as_deref(), Some("https://license.example/"));
}

#[tokio::test]
async fn test_live_now_uses_location_context() {
    let server = MockServerFactory::new().await;
    let client = ready_anonymous_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/1.0/A/ENG/WEB_DASH/ALL/EVENTS/LIVENOW/ANONYMOUS/1"))
        .and(header("User-Agent", f1tv_api::utils::default_user_agent().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockData::envelope(
            serde_json::json!({ "pollingLower": 30, "pollingUpper": 60, "items": [] }),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let live = client.live_now().await.unwrap();
    assert_eq!(live.polling_lower, 30);
}

#[tokio::test]
async fn test_config_accepts_envelope_or_bare_body() {
    let server = MockServerFactory::new().await;
    Mock::given(method("GET"))
        .and(path("/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(MockData::envelope(MockData::config())))
        .mount(&server)
        .await;

    let client = client_for(&server, None, false);
    let config = client.refresh_config().await.unwrap();
    assert_eq!(config.app_iso_code, "NL");
    assert_eq!(config.extra["featureFlags"]["pip"], true);

    let bare = MockServerFactory::new().await;
    MockServerFactory::setup_config(&bare).await;
    let client = client_for(&bare, None, false);
    assert_eq!(client.refresh_config().await.unwrap().version, "7");
}

#[tokio::test]
async fn test_picture_returns_bytes() {
    let server = MockServerFactory::new().await;
    Mock::given(method("GET"))
        .and(path("/image/1000005001-abc"))
        .and(query_param("width", "320"))
        .and(query_param("height", "180"))
        .and(query_param("o", "L"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF]))
        .mount(&server)
        .await;

    let client = client_for(&server, None, false);
    let bytes = client
        .picture("1000005001-abc", 320, 180, &PictureOptions::new().with_landscape(true))
        .await
        .unwrap();
    assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF]);

    let err = client
        .picture("missing", 1, 1, &PictureOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_stale_entitlement_is_discarded() {
    let server = MockServerFactory::new().await;
    let first = MockData::subscriber_token("1", "US");
    let second = MockData::subscriber_token("2", "NL");

    Mock::given(method("GET"))
        .and(path("/2.0/R/ENG/WEB_DASH/ALL/USER/ENTITLEMENT"))
        .and(header("ascendontoken", first.as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockData::entitlement("ENT-OLD"))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, Some(&first), false);
    let pending = {
        let client = client.clone();
        tokio::spawn(async move { client.refresh_entitlement().await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    client.set_credential(Some(&second)).unwrap();

    let fetched = pending.await.unwrap().unwrap();
    assert_eq!(fetched, "ENT-OLD");
    assert!(client.entitlement().is_none());
    assert_eq!(client.decoded_credential().unwrap().subscriber_id, "2");
}

#[tokio::test]
async fn test_clearing_credential_refetches_location_anonymously() {
    let server = MockServerFactory::new().await;
    let token = MockData::subscriber_token("1001", "US");
    setup_registered(&server, &token).await;
    MockServerFactory::setup_anonymous(&server).await;

    let client = client_for(&server, Some(&token), true);
    timeout(WAIT, client.when_ready()).await.unwrap();
    assert_eq!(client.location().unwrap().user_location[0].entitlement, "PRO");

    client.set_credential(None).unwrap();
    assert!(client.entitlement().is_none());

    TestUtils::wait_for_condition(
        || {
            let client = client.clone();
            async move {
                client
                    .location()
                    .is_some_and(|l| l.user_location[0].entitlement == "ANONYMOUS")
            }
        },
        WAIT,
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_failed_location_is_reported_and_does_not_block_config() {
    let server = MockServerFactory::new().await;
    MockServerFactory::setup_config(&server).await;
    Mock::given(method("GET"))
        .and(path("/1.0/A/ENG/WEB_DASH/ALL/USER/LOCATION"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_for(&server, None, false);
    let mut events = client.subscribe_events();
    client.refresh_all().await;

    match events.try_recv().unwrap() {
        ClientEvent::LocationError(err) => assert_eq!(err.status(), Some(500)),
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(matches!(events.try_recv().unwrap(), ClientEvent::ConfigUpdated));
    assert!(client.config().is_some());
    assert!(!client.is_location_ready());
}
