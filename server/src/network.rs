use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use common::error::FancyError;
use hyper::{server::conn::http1, service::service_fn};
use hyper_util::{
    rt::{TokioIo, TokioTimer},
    server::graceful::GracefulShutdown,
};
use simplelog::{debug, info, warn};
use tokio::{
    net::TcpListener,
    select, spawn,
    sync::watch::{channel, Receiver, Sender},
    task::JoinHandle,
    time::timeout,
};

use crate::{
    config::Config,
    manager::VersionManager,
    metrics::BumpMetrics,
    storage::VersionStorage,
};

pub mod router;

const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// State every request handler has access to.
pub struct Shared<S> {
    manager: VersionManager<S, Arc<BumpMetrics>>,
    metrics: Arc<BumpMetrics>,
}

impl<S: VersionStorage> Shared<S> {
    pub fn new(storage: S, metrics: Arc<BumpMetrics>) -> Self {
        Self {
            manager: VersionManager::new(storage, metrics.clone()),
            metrics,
        }
    }

    pub fn manager(&self) -> &VersionManager<S, Arc<BumpMetrics>> {
        &self.manager
    }

    pub fn metrics(&self) -> &BumpMetrics {
        &self.metrics
    }
}

pub struct NetworkStack {
    local_address: SocketAddr,
    shutdown: Sender<bool>,
    handle: JoinHandle<()>,
}

impl NetworkStack {
    pub async fn start<S: VersionStorage + 'static>(
        config: &Config,
        shared: Arc<Shared<S>>,
    ) -> Result<Self> {
        info!("Starting network stack...");

        let listener = TcpListener::bind(*config.listener())
            .await
            .with_context(|| format!("Could not listen on {}", config.listener()))?;
        let local_address = listener.local_addr()?;
        let header_timeout = config.header_read_timeout();

        let (sender, receiver) = channel(false);
        let task = spawn(async move {
            if let Err(error) = run(listener, shared, header_timeout, receiver).await {
                FancyError::print_fancy(&error, false);
            }
        });

        info!("Server is ready to handle requests at {}", local_address);
        return Ok(Self {
            local_address,
            shutdown: sender,
            handle: task,
        });

        async fn run<S: VersionStorage + 'static>(
            listener: TcpListener,
            shared: Arc<Shared<S>>,
            header_timeout: Duration,
            mut shutdown: Receiver<bool>,
        ) -> Result<()> {
            let mut builder = http1::Builder::new();
            builder.timer(TokioTimer::new()).header_read_timeout(header_timeout);
            let graceful = GracefulShutdown::new();

            loop {
                select! {
                    accepted = listener.accept() => {
                        let (stream, address) = match accepted {
                            Ok(accepted) => accepted,
                            Err(error) => {
                                warn!("Failed to accept connection: {}", error);
                                continue;
                            }
                        };

                        let shared = shared.clone();
                        let service = service_fn(move |request| {
                            let shared = shared.clone();
                            async move {
                                Ok::<_, Infallible>(router::handle(&*shared, request).await)
                            }
                        });
                        let connection = graceful
                            .watch(builder.serve_connection(TokioIo::new(stream), service));
                        spawn(async move {
                            if let Err(error) = connection.await {
                                debug!("Connection from {} closed with error: {}", address, error);
                            }
                        });
                    }
                    _ = shutdown.changed() => break,
                }
            }

            drop(listener);
            if timeout(SHUTDOWN_GRACE_PERIOD, graceful.shutdown()).await.is_err() {
                warn!(
                    "Open connections did not finish within {:?}, closing them",
                    SHUTDOWN_GRACE_PERIOD
                );
            }
            Ok(())
        }
    }

    pub fn local_address(&self) -> SocketAddr {
        self.local_address
    }

    pub async fn shutdown(self) -> Result<()> {
        info!("Stopping network stack...");
        let _ = self.shutdown.send(true); // Ignore error if receiver is dropped
        self.handle.await?;
        Ok(())
    }
}
