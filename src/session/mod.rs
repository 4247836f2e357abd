//! Session management for the F1TV API
//!
//! This module owns the subscription credential and the state derived from
//! it (entitlement, location, configuration), the readiness signals built on
//! that state and the actions that consume it. HTTP goes through an injected
//! [`Transport`].

pub mod client;
pub mod credential;
pub mod endpoint;
pub mod state;
pub mod transport;
pub mod verify;

pub use client::{ClientBuilder, ClientEvent, F1TvClient};
pub use credential::decode_credential;
pub use endpoint::{Endpoints, PathContext};
pub use state::StateSlot;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use verify::verify_credential;
