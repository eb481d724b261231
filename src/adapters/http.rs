//! HTTP listener adapter.
//!
//! Implements [`HttpServerPort`] by binding the gateway's routes to a
//! transport.  Routing and validation live in
//! [`Gateway::handle`](crate::app::gateway::Gateway::handle); this adapter
//! only moves bytes.
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::http::server::EspHttpServer`.
//! - **all other targets**: records the port and exposes the gateway for
//!   in-process requests.

use std::sync::Arc;

use log::info;

use crate::app::gateway::{Gateway, Method};
use crate::app::ports::HttpServerPort;
use crate::error::Error;

/// Largest accepted request body.  Commands are a few dozen bytes.
pub const MAX_BODY: usize = 256;

const ROUTES: [(&str, Method); 3] = [
    ("/api/leds", Method::Get),
    ("/api/buttons", Method::Get),
    ("/api/led", Method::Post),
];

pub struct HttpServer {
    gateway: Arc<Gateway>,
    port: Option<u16>,
    #[cfg(target_os = "espidf")]
    server: Option<esp_idf_svc::http::server::EspHttpServer<'static>>,
}

impl HttpServer {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self {
            gateway,
            port: None,
            #[cfg(target_os = "espidf")]
            server: None,
        }
    }

    /// Port the listener is bound to, once started.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Dispatch a request in-process (host simulation and tests).
    #[cfg(not(target_os = "espidf"))]
    pub fn request(&self, method: Method, path: &str, body: &[u8]) -> Option<crate::app::gateway::ApiResponse> {
        self.port?;
        Some(self.gateway.handle(method, path, &body[..body.len().min(MAX_BODY)]))
    }

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self, port: u16) -> Result<(), Error> {
        use esp_idf_svc::http::Method as EspMethod;
        use esp_idf_svc::http::server::{Configuration, EspHttpServer};
        use esp_idf_svc::io::{Read, Write};

        let conf = Configuration {
            http_port: port,
            ..Default::default()
        };
        let mut server = EspHttpServer::new(&conf).map_err(|_| Error::Init("HTTP server"))?;

        for (path, method) in ROUTES {
            let gateway = self.gateway.clone();
            let esp_method = match method {
                Method::Post => EspMethod::Post,
                _ => EspMethod::Get,
            };
            server
                .fn_handler::<anyhow::Error, _>(path, esp_method, move |mut req| {
                    let mut body = [0u8; MAX_BODY];
                    let mut len = 0;
                    while len < body.len() {
                        let n = req.read(&mut body[len..])?;
                        if n == 0 {
                            break;
                        }
                        len += n;
                    }
                    let resp = gateway.handle(method, path, &body[..len]);
                    req.into_response(resp.status, None, &[("Content-Type", resp.content_type)])?
                        .write_all(resp.body.as_bytes())?;
                    Ok(())
                })
                .map_err(|_| Error::Init("HTTP route"))?;
        }
        self.server = Some(server);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self, port: u16) -> Result<(), Error> {
        info!("HTTP(sim): {} routes bound on port {}", ROUTES.len(), port);
        Ok(())
    }
}

impl HttpServerPort for HttpServer {
    fn start(&mut self, port: u16) -> Result<(), Error> {
        if self.port.is_some() {
            return Ok(());
        }
        self.platform_start(port)?;
        self.port = Some(port);
        info!("HTTP: serving {} routes", ROUTES.len());
        Ok(())
    }
}
