//! Web page and JSON API in front of the question answering service.

mod error;
mod handlers;
mod router;
mod server;
mod service;
mod ui;

pub use error::GatewayError;
pub use server::GatewayServer;
pub use service::{QaService, ServiceFuture};
