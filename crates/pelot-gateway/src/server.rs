use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use pelot_core::config::UiConfig;
use tokio::sync::watch;

use crate::error::GatewayError;
use crate::router::build_router;
use crate::service::QaService;
use crate::ui::render_page;

#[derive(Clone)]
pub(crate) struct AppState {
    pub service: Arc<dyn QaService>,
    pub ui: Arc<UiConfig>,
    pub page: Arc<str>,
    pub started_at: Instant,
}

pub struct GatewayServer {
    addr: SocketAddr,
    service: Arc<dyn QaService>,
    ui: UiConfig,
    max_body_size: usize,
    shutdown_rx: watch::Receiver<bool>,
}

impl GatewayServer {
    #[must_use]
    pub fn new(
        bind: &str,
        port: u16,
        service: Arc<dyn QaService>,
        ui: UiConfig,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        let addr: SocketAddr = format!("{bind}:{port}").parse().unwrap_or_else(|e| {
            tracing::warn!("invalid bind '{bind}': {e}, falling back to 127.0.0.1:{port}");
            SocketAddr::from(([127, 0, 0, 1], port))
        });

        if bind == "0.0.0.0" {
            tracing::warn!("gateway binding to 0.0.0.0, the page is reachable from the network");
        }

        Self {
            addr,
            service,
            ui,
            max_body_size: 65_536,
            shutdown_rx,
        }
    }

    #[must_use]
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start the HTTP server. Returns once the shutdown signal fires.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Bind` if the address is in use.
    pub async fn serve(self) -> Result<(), GatewayError> {
        let state = AppState {
            service: self.service,
            page: render_page(&self.ui).into(),
            ui: Arc::new(self.ui),
            started_at: Instant::now(),
        };
        let router = build_router(state, self.max_body_size);

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| GatewayError::Bind(self.addr.to_string(), e))?;
        tracing::info!("gateway listening on http://{}", self.addr);

        let mut shutdown_rx = self.shutdown_rx;
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                while !*shutdown_rx.borrow_and_update() {
                    if shutdown_rx.changed().await.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
                tracing::info!("gateway shutting down");
            })
            .await
            .map_err(|e| GatewayError::Server(format!("{e}")))?;

        Ok(())
    }
}
