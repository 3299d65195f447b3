// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the HTTP device client using wiremock.

use std::time::Duration;

use prana_lib::protocol::HttpConfig;
use prana_lib::types::{Brightness, Mode, Sensor, Speed, Subsystem};
use prana_lib::{Device, Error, ErrorKind, ParseError, ProtocolError};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn state_body() -> serde_json::Value {
    json!({
        "extract": { "speed": 30, "is_on": true, "max_speed": 60 },
        "supply": { "speed": 40, "is_on": false, "max_speed": 60 },
        "bounded": { "speed": 20, "is_on": true, "max_speed": 60 },
        "bound": false,
        "heater": true,
        "auto": false,
        "auto_plus": false,
        "winter": true,
        "night": false,
        "boost": false,
        "brightness": 16,
        "inside_temperature": 215,
        "outside_temperature": -35,
        "humidity": 41,
        "co2": 612
    })
}

// ============================================================================
// Reads
// ============================================================================

mod read_state {
    use super::*;

    #[tokio::test]
    async fn parses_full_state() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/getState"))
            .respond_with(ResponseTemplate::new(200).set_body_json(state_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let device = Device::http(mock_server.uri()).unwrap();
        let state = device.read_state().await.unwrap();

        assert_eq!(state.subsystem(Subsystem::Extract).speed(), 30);
        assert_eq!(state.percentage(Subsystem::Supply), 67);
        assert!(!state.is_on(Subsystem::Supply));
        assert!(state.mode(Mode::Heater));
        assert!(!state.mode(Mode::Bound));
        assert_eq!(state.brightness(), 16);
        assert_eq!(state.brightness_level().value(), 5);
        assert_eq!(state.sensors().inside_temperature, Some(21.5));
        assert_eq!(state.sensors().outside_temperature, Some(-3.5));
        assert_eq!(state.sensors().co2, Some(612));
        assert_eq!(state.sensors().voc, None);
        assert!(!state.available_sensors().contains(&Sensor::Voc));
    }

    #[tokio::test]
    async fn probe_returns_raw_json() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/getState"))
            .respond_with(ResponseTemplate::new(200).set_body_json(state_body()))
            .mount(&mock_server)
            .await;

        let device = Device::http(mock_server.uri()).unwrap();
        let raw = device.probe().await.unwrap();
        assert_eq!(raw["brightness"], 16);
    }

    #[tokio::test]
    async fn server_error_is_protocol_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/getState"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let device = Device::http(mock_server.uri()).unwrap();
        let err = device.read_state().await.unwrap_err();

        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::Status { status: 500, .. })
        ));
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn malformed_body_is_protocol_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/getState"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&mock_server)
            .await;

        let device = Device::http(mock_server.uri()).unwrap();
        let err = device.read_state().await.unwrap_err();

        assert!(matches!(err, Error::Parse(ParseError::Json(_))));
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[tokio::test]
    async fn unreachable_device_is_connection_error() {
        let device = Device::http("127.0.0.1:1").unwrap();
        let err = device.read_state().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
    }

    #[tokio::test]
    async fn slow_device_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/getState"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(state_body())
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let device = Device::with_config(
            HttpConfig::new(mock_server.uri()).with_timeout(Duration::from_millis(50)),
        )
        .unwrap();
        let err = device.read_state().await.unwrap_err();

        assert!(matches!(err, Error::Protocol(ProtocolError::Timeout(50))));
        assert_eq!(err.kind(), ErrorKind::Connection);
    }
}

// ============================================================================
// Writes
// ============================================================================

mod writes {
    use super::*;

    #[tokio::test]
    async fn set_speed_posts_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/setSpeed"))
            .and(body_json(json!({ "speed": 50, "fanType": "extract" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let device = Device::http(mock_server.uri()).unwrap();
        device
            .set_speed(Speed::new(50).unwrap(), Subsystem::Extract)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_response_is_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/setSpeedIsOn"))
            .and(body_json(json!({ "value": true, "fanType": "bounded" })))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .expect(1)
            .mount(&mock_server)
            .await;

        let device = Device::http(mock_server.uri()).unwrap();
        device.set_on(true, Subsystem::Bounded).await.unwrap();
    }

    #[tokio::test]
    async fn json_response_is_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/setSwitch"))
            .and(body_json(json!({ "switchType": "boost", "value": false })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
            .mount(&mock_server)
            .await;

        let device = Device::http(mock_server.uri()).unwrap();
        device.set_mode(Mode::Boost, false).await.unwrap();
    }

    #[tokio::test]
    async fn plain_text_response_is_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/setSwitch"))
            .and(body_json(json!({ "switchType": "heater", "value": true })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("OK")
                    .insert_header("content-type", "text/plain"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let device = Device::http(mock_server.uri()).unwrap();
        device.set_mode(Mode::Heater, true).await.unwrap();
    }

    #[tokio::test]
    async fn error_status_fails_write() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/setBrightness"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .mount(&mock_server)
            .await;

        let device = Device::http(mock_server.uri()).unwrap();
        let err = device
            .set_brightness(Brightness::new(4).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::Status { status: 400, .. })
        ));
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }

    #[tokio::test]
    async fn invalid_speed_sends_nothing() {
        let mock_server = MockServer::start().await;
        let _device = Device::http(mock_server.uri()).unwrap();

        for raw in [5, 15, 35, 61, 70, 100] {
            let err: Error = Speed::new(raw).unwrap_err().into();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }

        let requests = mock_server.received_requests().await.unwrap();
        assert!(requests.is_empty());
    }
}
