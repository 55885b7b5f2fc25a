//! Platform utilities available to handlers.
//!
//! # Data Flow
//! ```text
//! Native handlers ──▶ PlatformUtils (store, mailer, notifier) directly
//! Script handlers ──▶ host functions ──▶ UtilEvent channel ──▶ worker task
//!                                                              └▶ mailer/notifier
//! ```
//!
//! # Design Decisions
//! - Script handlers never block on utility I/O; their mail/push requests are
//!   queued and delivered by a background task
//! - Utility failures are logged, never surfaced to the caller's response

pub mod errfmt;
pub mod mail;
pub mod mask;
pub mod notify;

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::store::DocumentStore;

pub use errfmt::describe_http_error;
pub use mail::Mailer;
pub use mask::mask_sensitive;
pub use notify::Notifier;

/// Errors from the outbound utility clients.
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    #[error("utility is not configured")]
    Disabled,

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider rejected the request with status {0}")]
    Rejected(u16),
}

/// The capability set handed to every handler invocation.
#[derive(Clone)]
pub struct PlatformUtils {
    pub store: Arc<dyn DocumentStore>,
    pub mailer: Arc<Mailer>,
    pub notifier: Arc<Notifier>,
}

/// A utility request queued by a script handler.
#[derive(Debug)]
pub enum UtilEvent {
    Mail {
        to: String,
        subject: String,
        body: Value,
    },
    Notify {
        title: Option<String>,
        message: String,
    },
}

/// Drain queued utility events in the background for the process lifetime.
pub fn spawn_worker(
    mut events: mpsc::UnboundedReceiver<UtilEvent>,
    mailer: Arc<Mailer>,
    notifier: Arc<Notifier>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                UtilEvent::Mail { to, subject, body } => {
                    if let Err(err) = mailer.send(&to, &subject, &body).await {
                        log_util_failure("mail", &err);
                    }
                }
                UtilEvent::Notify { title, message } => {
                    if let Err(err) = notifier.send(title.as_deref(), &message).await {
                        log_util_failure("notify", &err);
                    }
                }
            }
        }
    })
}

fn log_util_failure(kind: &str, err: &UtilError) {
    match err {
        UtilError::Transport(inner) => {
            tracing::error!(utility = kind, error = %describe_http_error(inner), "utility delivery failed");
        }
        other => {
            tracing::error!(utility = kind, error = %other, "utility delivery failed");
        }
    }
}
