// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `rekindle serve` command implementation.
//!
//! Wires capability providers from configuration (absence is an explicit
//! `None`, never a lazily created global), spawns the periodic dispatch and
//! scoring tasks, and runs the webhook server in the foreground until a
//! shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rekindle_config::RekindleConfig;
use rekindle_core::{Notifier, RekindleError, SmsSender};
use rekindle_email::ResendMailer;
use rekindle_engine::{Correlator, Dispatcher, scorer};
use rekindle_gateway::{GatewayState, ServerConfig, SignatureConfig};
use rekindle_sms::TwilioSender;
use rekindle_storage::Database;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Runs the `rekindle serve` command.
pub async fn run_serve(config: RekindleConfig) -> Result<(), RekindleError> {
    info!("starting rekindle serve");

    let db = Database::open(&config.storage.database_path).await?;

    let sms: Option<Arc<dyn SmsSender>> = config
        .twilio
        .credentials()
        .map(|(sid, token)| Arc::new(TwilioSender::new(sid, token)) as Arc<dyn SmsSender>);
    if sms.is_some() {
        info!("twilio delivery enabled");
    } else {
        warn!("twilio credentials not configured, outbound delivery disabled");
    }

    let notifier: Option<Arc<dyn Notifier>> = config.email.api_key.as_deref().map(|key| {
        Arc::new(ResendMailer::new(key, &config.email.from_address)) as Arc<dyn Notifier>
    });
    if notifier.is_some() {
        info!("email notifications enabled");
    } else {
        warn!("email api key not configured, agent notifications disabled");
    }

    let dispatcher = Arc::new(Dispatcher::new(db.clone(), sms, &config.engine));
    let correlator = Arc::new(Correlator::new(db.clone(), notifier));

    let cancel = install_signal_handler();

    // Periodic dispatch sweep.
    {
        let dispatcher = dispatcher.clone();
        let cancel = cancel.clone();
        let interval_secs = config.engine.sweep_interval_secs;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            // Skip the first immediate tick.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        match dispatcher.run_sweep(Utc::now()).await {
                            Ok(stats) if stats.due > 0 => {
                                info!(
                                    sent = stats.sent,
                                    requeued = stats.requeued,
                                    failed = stats.failed,
                                    "dispatch sweep processed due messages"
                                );
                            }
                            Ok(_) => debug!("dispatch sweep idle"),
                            Err(e) => error!(error = %e, "dispatch sweep failed"),
                        }
                    }
                    _ = cancel.cancelled() => {
                        info!("dispatcher task shutting down");
                        break;
                    }
                }
            }
        });
        info!(interval_secs, "dispatcher started");
    }

    // Periodic engagement scoring.
    {
        let db = db.clone();
        let cancel = cancel.clone();
        let interval_secs = config.engine.scoring_interval_secs;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        match scorer::run_scoring_pass(&db, Utc::now()).await {
                            Ok(updated) if updated > 0 => {
                                info!(updated, "engagement scores updated");
                            }
                            Ok(_) => debug!("engagement scores unchanged"),
                            Err(e) => error!(error = %e, "scoring pass failed"),
                        }
                    }
                    _ = cancel.cancelled() => {
                        info!("scorer task shutting down");
                        break;
                    }
                }
            }
        });
        info!(interval_secs, "engagement scorer started");
    }

    // Webhook server runs in the foreground; shutdown unwinds through it.
    let state = GatewayState {
        correlator,
        signature: signature_config(&config),
    };
    let server_config = ServerConfig {
        host: config.webhook.host.clone(),
        port: config.webhook.port,
    };
    rekindle_gateway::start_server(&server_config, state, cancel.clone()).await?;

    info!("rekindle serve shutdown complete");
    Ok(())
}

/// Signature validation settings, when enabled and fully configured.
fn signature_config(config: &RekindleConfig) -> Option<SignatureConfig> {
    if !config.webhook.validate_signatures {
        return None;
    }
    match (
        config.twilio.auth_token.as_ref(),
        config.webhook.public_url.as_ref(),
    ) {
        (Some(auth_token), Some(public_url)) => Some(SignatureConfig {
            auth_token: auth_token.clone(),
            incoming_url: public_url.clone(),
        }),
        _ => {
            warn!(
                "signature validation requested but twilio auth token or webhook public_url \
                 is missing; validation disabled"
            );
            None
        }
    }
}

/// Install a handler that cancels the returned token on SIGINT/SIGTERM.
fn install_signal_handler() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received");
        token.cancel();
    });
    cancel
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler, using ctrl-c only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
