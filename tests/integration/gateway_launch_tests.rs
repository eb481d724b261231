//! Gateway start-up: the listener opens only after the SoftAP reports
//! `Started`, and then serves the same routes in-process.

use std::thread;
use std::time::Duration;

use super::mock_hw::{MockNetwork, MockServer, rig_with};

use softap_panel::adapters::http::HttpServer;
use softap_panel::app::gateway::Method;
use softap_panel::config::SystemConfig;
use softap_panel::network::NetEvent;

fn quick_config() -> SystemConfig {
    let mut config = SystemConfig::default();
    config.http.settle_delay_ms = 0;
    config.http.port = 8080;
    config
}

#[test]
fn launch_waits_for_started() {
    let r = rig_with(quick_config(), MockNetwork::default());
    let server = MockServer::default();
    let started = server.started.clone();

    let gateway = r.app.gateway().clone();
    let handle = thread::spawn(move || {
        let mut server = server;
        gateway.launch(&mut server)
    });

    thread::sleep(Duration::from_millis(50));
    assert!(started.lock().unwrap().is_empty());

    r.app.start_softap();
    r.app.on_net_event(NetEvent::ApEnableResult(0));

    handle.join().unwrap().unwrap();
    assert_eq!(*started.lock().unwrap(), vec![8080]);
}

#[test]
fn failed_bring_up_never_opens_listener() {
    let r = rig_with(quick_config(), MockNetwork::default());
    r.app.start_softap();
    r.app.on_net_event(NetEvent::ApEnableResult(3));
    assert!(!r.app.gateway().start_requested());
}

#[test]
fn http_server_serves_after_launch() {
    let r = rig_with(quick_config(), MockNetwork::default());
    let mut server = HttpServer::new(r.app.gateway().clone());
    assert!(server.request(Method::Get, "/api/leds", b"").is_none());

    r.app.start_softap();
    r.app.on_net_event(NetEvent::ApEnableResult(0));
    r.app.gateway().launch(&mut server).unwrap();
    assert_eq!(server.port(), Some(8080));

    let resp = server
        .request(Method::Post, "/api/led", br#"{"led":2,"action":"on"}"#)
        .unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(r.app.leds().state_of(2), Ok(true));

    let resp = server.request(Method::Get, "/api/nope", b"").unwrap();
    assert_eq!(resp.status, 404);
    let resp = server.request(Method::Get, "/api/led", b"").unwrap();
    assert_eq!(resp.status, 405);
}
