//! Gateway: HTTP server for the LINE webhook.
//!
//! Single port. `POST /callback` is verified against the channel secret before any
//! event is looked at; `GET /` and `GET /favicon.ico` serve probes and browsers.

mod server;

pub use server::{handle_callback, router, run_gateway, GatewayState};
