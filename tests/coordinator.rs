// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the coordinator.
//!
//! Timing-sensitive properties run against an in-memory device with paused
//! time; end-to-end cycles run against a wiremock device.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use prana_lib::command::Command;
use prana_lib::state::DeviceSnapshot;
use prana_lib::types::{Mode, Speed, Subsystem};
use prana_lib::{
    CommandOutcome, Coordinator, CoordinatorConfig, CoordinatorEvent, Device, DeviceApi,
    ErrorKind, ProtocolError, Result, RetryPolicy,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn state_body(supply_speed: u16, night: bool) -> serde_json::Value {
    json!({
        "extract": { "speed": 20, "is_on": true, "max_speed": 60 },
        "supply": { "speed": supply_speed, "is_on": true, "max_speed": 60 },
        "bounded": { "speed": 0, "is_on": false, "max_speed": 60 },
        "night": night,
        "brightness": 4
    })
}

fn fast_config() -> CoordinatorConfig {
    CoordinatorConfig::new("Integration")
        .with_settle_delay(Duration::from_millis(10))
        .with_retry(RetryPolicy::new().with_delay(Duration::from_millis(10)))
}

// ============================================================================
// In-memory device
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Read,
    Send(Command),
}

/// Device that applies writes to an in-memory state and takes time doing so.
struct SlowDevice {
    state: Mutex<serde_json::Value>,
    calls: Mutex<Vec<Call>>,
    latency: Duration,
}

impl SlowDevice {
    fn new() -> Self {
        Self {
            state: Mutex::new(state_body(0, false)),
            calls: Mutex::new(Vec::new()),
            latency: Duration::from_millis(200),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }
}

impl DeviceApi for SlowDevice {
    async fn read_state(&self) -> Result<DeviceSnapshot> {
        self.calls.lock().push(Call::Read);
        tokio::time::sleep(self.latency).await;
        let raw = self.state.lock().clone();
        Ok(DeviceSnapshot::from_json(raw)?)
    }

    async fn send(&self, command: &Command) -> Result<()> {
        self.calls.lock().push(Call::Send(*command));
        tokio::time::sleep(self.latency).await;
        if let Command::SetSpeed { speed, subsystem } = *command {
            self.state.lock()[subsystem.as_str()]["speed"] = json!(speed.value());
        }
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn concurrent_commands_never_interleave() {
    let coordinator = Arc::new(Coordinator::new(SlowDevice::new(), fast_config()));

    let first = Command::SetSpeed {
        speed: Speed::new(30).unwrap(),
        subsystem: Subsystem::Supply,
    };
    let second = Command::SetSpeed {
        speed: Speed::new(50).unwrap(),
        subsystem: Subsystem::Extract,
    };

    let a = tokio::spawn({
        let c = Arc::clone(&coordinator);
        async move { c.execute(first).await }
    });
    tokio::time::sleep(Duration::from_millis(1)).await;
    let b = tokio::spawn({
        let c = Arc::clone(&coordinator);
        async move { c.execute(second).await }
    });

    assert_eq!(a.await.unwrap().unwrap(), CommandOutcome::Applied);
    assert_eq!(b.await.unwrap().unwrap(), CommandOutcome::Applied);

    assert_eq!(
        coordinator.device().calls(),
        vec![
            Call::Read,
            Call::Send(first),
            Call::Read,
            Call::Read,
            Call::Send(second),
            Call::Read,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn poll_waits_for_running_command() {
    let coordinator = Arc::new(Coordinator::new(SlowDevice::new(), fast_config()));

    let command = tokio::spawn({
        let c = Arc::clone(&coordinator);
        async move { c.request_speed(2, Subsystem::Supply).await }
    });
    tokio::time::sleep(Duration::from_millis(1)).await;

    assert!(coordinator.poll().await);
    command.await.unwrap().unwrap();

    // The poll's read comes after the command's refresh
    let calls = coordinator.device().calls();
    assert_eq!(calls.len(), 4);
    assert!(matches!(calls[1], Call::Send(_)));
    assert_eq!(calls[3], Call::Read);
    assert_eq!(
        coordinator
            .current_snapshot()
            .unwrap()
            .subsystem(Subsystem::Supply)
            .speed(),
        20
    );
}

#[tokio::test(start_paused = true)]
async fn every_valid_speed_round_trips() {
    let coordinator = Coordinator::new(SlowDevice::new(), fast_config().without_skip());

    for subsystem in Subsystem::ALL {
        for level in 0..=6 {
            coordinator.request_speed(level, subsystem).await.unwrap();
            let snapshot = coordinator.current_snapshot().unwrap();
            assert_eq!(snapshot.subsystem(subsystem).speed(), u16::from(level) * 10);
            assert_eq!(snapshot.speed_level(subsystem).value(), level);
        }
    }
}

// ============================================================================
// HTTP device
// ============================================================================

#[tokio::test]
async fn command_cycle_over_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/getState"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state_body(20, true)))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/setSwitch"))
        .and(body_json(json!({ "switchType": "night", "value": false })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let device = Device::http(mock_server.uri()).unwrap();
    let coordinator = Coordinator::new(device, fast_config());

    coordinator.request_switch(Mode::Night, false).await.unwrap();

    let paths: Vec<String> = mock_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(paths, ["/getState", "/setSwitch", "/getState"]);
    assert!(coordinator.current_snapshot().is_some());
}

#[tokio::test]
async fn transient_write_failures_are_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/getState"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state_body(20, false)))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/setSpeed"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/setSpeed"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let device = Device::http(mock_server.uri()).unwrap();
    let coordinator = Coordinator::new(device, fast_config());

    let outcome = coordinator.request_speed(5, Subsystem::Supply).await.unwrap();
    assert_eq!(outcome, CommandOutcome::Applied);

    let writes = mock_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/setSpeed")
        .count();
    assert_eq!(writes, 3);
}

#[tokio::test]
async fn exhausted_retries_report_failure_after_refresh() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/getState"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state_body(20, false)))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/setBrightness"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let device = Device::http(mock_server.uri()).unwrap();
    let coordinator = Coordinator::new(device, fast_config());
    let mut events = coordinator.subscribe();

    let err = coordinator.request_brightness(6).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert!(matches!(
        err,
        prana_lib::Error::Protocol(ProtocolError::Status { status: 500, .. })
    ));

    let last = mock_server.received_requests().await.unwrap();
    assert_eq!(last.last().unwrap().url.path(), "/getState");

    assert!(matches!(
        events.recv().await.unwrap(),
        CoordinatorEvent::Updated { .. }
    ));
    assert!(matches!(
        events.recv().await.unwrap(),
        CoordinatorEvent::CommandFailed {
            kind: ErrorKind::Protocol,
            ..
        }
    ));
}

#[tokio::test]
async fn unchanged_mode_is_not_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/getState"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state_body(20, true)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let device = Device::http(mock_server.uri()).unwrap();
    let coordinator = Coordinator::new(device, fast_config());

    coordinator.first_refresh().await.unwrap();
    let outcome = coordinator.request_switch(Mode::Night, true).await.unwrap();
    assert_eq!(outcome, CommandOutcome::Skipped);
}

#[tokio::test]
async fn failed_poll_serves_stale_snapshot() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/getState"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state_body(40, false)))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/getState"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let device = Device::http(mock_server.uri()).unwrap();
    let coordinator = Coordinator::new(device, fast_config());

    assert!(coordinator.poll().await);
    let before = coordinator.current_snapshot().unwrap();

    assert!(!coordinator.poll().await);
    assert_eq!(coordinator.last_error(), Some(ErrorKind::Protocol));
    let after = coordinator.current_snapshot().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.subsystem(Subsystem::Supply).speed(), 40);
}

#[tokio::test]
async fn plain_text_ack_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/getState"))
        .respond_with(ResponseTemplate::new(200).set_body_json(state_body(20, false)))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/setSwitch"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let device = Device::http(mock_server.uri()).unwrap();
    let coordinator = Coordinator::new(device, fast_config());

    let outcome = coordinator.request_switch(Mode::Boost, true).await.unwrap();
    assert_eq!(outcome, CommandOutcome::Applied);
    assert!(coordinator.last_error().is_none());
}
