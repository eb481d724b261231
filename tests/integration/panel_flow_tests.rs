//! End-to-end flows through the composed [`App`]: driver samples and
//! gateway requests in, bus messages and output writes out.

use std::time::Duration;

use super::mock_hw::{MockNetwork, NetCall, record, rig, rig_with};

use softap_panel::app::gateway::Method;
use softap_panel::config::SystemConfig;
use softap_panel::error::NetError;
use softap_panel::fsm::softap::ApState;
use softap_panel::messages::{ApEventKind, ButtonAction, LedAction, LedCmdMsg};
use softap_panel::network::NetEvent;

const MAC: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];

// ── Buttons ───────────────────────────────────────────────────

#[test]
fn press_and_release_before_one_tick_yields_both_edges() {
    let r = rig();
    let log = record(&r.app.bus().button);
    r.clock.set(1234);

    assert!(r.app.on_button_sample(0b0001, 0b0001));
    assert!(r.app.on_button_sample(0b0000, 0b0001));
    assert_eq!(r.app.tick(), 2);

    let msgs = log.lock().unwrap().clone();
    assert_eq!(msgs.len(), 2);
    assert_eq!(msgs[0].action, ButtonAction::Pressed);
    assert_eq!(msgs[0].press_count, 1);
    assert_eq!(msgs[0].button.get(), 0);
    assert_eq!(msgs[0].timestamp_ms, 1234);
    assert_eq!(msgs[1].action, ButtonAction::Released);
    assert_eq!(msgs[1].press_count, 1);
}

#[test]
fn press_counts_accumulate_per_button() {
    let r = rig();
    for _ in 0..3 {
        r.app.on_button_sample(0b0100, 0b0100);
        r.app.on_button_sample(0b0000, 0b0100);
    }
    r.app.tick();
    assert_eq!(r.app.buttons().press_count(2), Ok(3));
    assert_eq!(r.app.buttons().press_count(0), Ok(0));
}

#[test]
fn buttons_do_not_drive_leds() {
    let r = rig();
    r.leds.clear();
    r.app.on_button_sample(0b1111, 0b1111);
    r.app.tick();
    assert!(r.leds.writes().is_empty());
}

#[test]
fn button_view_follows_bus() {
    let r = rig();
    r.app.on_button_sample(0b0010, 0b0010);
    r.app.tick();

    let resp = r.app.gateway().handle(Method::Get, "/api/buttons", b"");
    assert_eq!(resp.status, 200);
    let v: serde_json::Value = serde_json::from_str(&resp.body).unwrap();
    assert_eq!(v["buttons"][1]["pressed"], true);
    assert_eq!(v["buttons"][1]["count"], 1);
    assert_eq!(v["buttons"][1]["name"], "Button 2");
    assert_eq!(v["buttons"][0]["pressed"], false);
}

// ── LEDs via gateway ──────────────────────────────────────────

#[test]
fn toggle_request_turns_led_on_and_publishes_state() {
    let r = rig();
    let states = record(&r.app.bus().led_state);
    r.leds.clear();

    let resp = r
        .app
        .gateway()
        .handle(Method::Post, "/api/led", br#"{"led":1,"action":"toggle"}"#);
    assert_eq!(resp.status, 200);

    let states = states.lock().unwrap().clone();
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].led.get(), 1);
    assert!(states[0].on);
    assert_eq!(r.leds.writes(), vec![(1, true)]);
    assert_eq!(r.app.leds().state_of(1), Ok(true));
}

#[test]
fn out_of_range_led_is_rejected_without_publishing() {
    let r = rig();
    let cmds = record(&r.app.bus().led_cmd);
    let states = record(&r.app.bus().led_state);

    let resp = r
        .app
        .gateway()
        .handle(Method::Post, "/api/led", br#"{"led":9,"action":"on"}"#);
    assert_eq!(resp.status, 400);
    assert!(cmds.lock().unwrap().is_empty());
    assert!(states.lock().unwrap().is_empty());
}

#[test]
fn repeated_on_does_not_rewrite_output() {
    let r = rig();
    let states = record(&r.app.bus().led_state);
    r.leds.clear();
    let gw = r.app.gateway();

    gw.handle(Method::Post, "/api/led", br#"{"led":0,"action":"on"}"#);
    gw.handle(Method::Post, "/api/led", br#"{"led":0,"action":"on"}"#);

    assert_eq!(r.leds.writes(), vec![(0, true)]);
    assert_eq!(states.lock().unwrap().len(), 1);
}

#[test]
fn led_snapshot_reflects_commands() {
    let r = rig();
    let led = r.app.config().board.led(3).unwrap();
    r.app
        .bus()
        .led_cmd
        .publish(
            &LedCmdMsg {
                action: LedAction::On,
                led,
            },
            Duration::from_millis(100),
        )
        .unwrap();

    let resp = r.app.gateway().handle(Method::Get, "/api/leds", b"");
    let v: serde_json::Value = serde_json::from_str(&resp.body).unwrap();
    assert_eq!(v["leds"].as_array().unwrap().len(), 4);
    assert_eq!(v["leds"][3]["is_on"], true);
    assert_eq!(v["leds"][3]["name"], "LED 4");
    assert_eq!(v["leds"][0]["is_on"], false);
}

#[test]
fn leds_start_off() {
    let r = rig();
    assert_eq!(
        r.leds.writes(),
        vec![(0, false), (1, false), (2, false), (3, false)]
    );
}

// ── SoftAP lifecycle ──────────────────────────────────────────

#[test]
fn bring_up_calls_collaborator_in_order() {
    let r = rig();
    assert_eq!(r.app.start_softap(), ApState::Starting);
    let cfg = r.app.config().ap.clone();
    assert_eq!(
        r.net.calls(),
        vec![
            NetCall::Resolve,
            NetCall::Country(cfg.country_code.to_string()),
            NetCall::Dhcp(cfg.dhcp_pool_start),
            NetCall::Enable(cfg.ssid.to_string()),
        ]
    );
}

#[test]
fn enable_confirmation_announces_started_once() {
    let r = rig();
    let ap = record(&r.app.bus().ap);
    r.app.start_softap();

    r.app.on_net_event(NetEvent::InterfaceUp);
    r.app.on_net_event(NetEvent::ApEnableResult(0));
    r.app.poll_softap();
    r.app.poll_softap();

    let kinds: Vec<_> = ap.lock().unwrap().iter().map(|m| m.kind).collect();
    assert_eq!(kinds, vec![ApEventKind::Started]);
    assert_eq!(r.app.softap().state(), ApState::Active);
    assert!(r.app.gateway().start_requested());
}

#[test]
fn enable_failure_code_reported_once_and_state_stays_error() {
    let net = MockNetwork {
        enable_error: Some(NetError::Failed(5)),
        ..MockNetwork::default()
    };
    let r = rig_with(SystemConfig::default(), net);
    let ap = record(&r.app.bus().ap);

    assert_eq!(r.app.start_softap(), ApState::Error);
    for _ in 0..3 {
        r.app.poll_softap();
        r.app.tick();
    }

    let msgs = ap.lock().unwrap().clone();
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].kind, ApEventKind::Error);
    assert_eq!(msgs[0].error_code, 5);
    assert_eq!(r.app.softap().state(), ApState::Error);
}

#[test]
fn asynchronous_failure_result_is_reported() {
    let r = rig();
    let ap = record(&r.app.bus().ap);
    r.app.start_softap();
    r.app.on_net_event(NetEvent::ApEnableResult(5));
    r.app.poll_softap();

    let msgs = ap.lock().unwrap().clone();
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].error_code, 5);
    assert_eq!(r.app.softap().state(), ApState::Error);
}

#[test]
fn missing_interface_fails_without_enable() {
    let net = MockNetwork {
        no_device: true,
        ..MockNetwork::default()
    };
    let r = rig_with(SystemConfig::default(), net);
    assert_eq!(r.app.start_softap(), ApState::Error);
    assert_eq!(r.net.calls(), vec![NetCall::Resolve]);
}

#[test]
fn explicit_start_recovers_from_error() {
    let r = rig();
    r.app.start_softap();
    r.app.on_net_event(NetEvent::ApEnableResult(5));
    assert_eq!(r.app.softap().state(), ApState::Error);

    assert_eq!(r.app.start_softap(), ApState::Starting);
    r.app.on_net_event(NetEvent::ApEnableResult(0));
    assert_eq!(r.app.softap().state(), ApState::Active);
}

#[test]
fn clients_are_announced_only_while_active() {
    let r = rig();
    let ap = record(&r.app.bus().ap);

    r.app.on_net_event(NetEvent::StationConnected(MAC));
    assert!(ap.lock().unwrap().is_empty());

    r.app.start_softap();
    r.app.on_net_event(NetEvent::ApEnableResult(0));
    r.app.on_net_event(NetEvent::StationConnected(MAC));
    r.app.on_net_event(NetEvent::StationDisconnected(MAC));

    let kinds: Vec<_> = ap.lock().unwrap().iter().map(|m| m.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ApEventKind::Started,
            ApEventKind::ClientConnected(MAC),
            ApEventKind::ClientDisconnected(MAC),
        ]
    );
    assert_eq!(r.app.network().station_count(), 0);
}

#[test]
fn stop_tears_down_and_announces() {
    let r = rig();
    let ap = record(&r.app.bus().ap);
    r.app.start_softap();
    r.app.on_net_event(NetEvent::ApEnableResult(0));

    assert_eq!(r.app.stop_softap(), ApState::Idle);
    assert_eq!(r.net.count(&NetCall::Disable), 1);
    let last = ap.lock().unwrap().last().cloned().unwrap();
    assert_eq!(last.kind, ApEventKind::Stopped);
    assert_eq!(last.ssid.as_str(), "SoftAP-Panel");
}
