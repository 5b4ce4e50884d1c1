use std::future::Future;

use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    CtrlC,
    Terminate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Interrupted by {0:?}; the pending request was abandoned")]
pub struct Interrupted(pub Signal);

/// Wait for CTRL+C or, on Unix, SIGTERM.
///
/// A handler that cannot be installed just never fires.
async fn wait_for_signal() -> Signal {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install CTRL+C signal handler: {:?}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM signal handler: {:?}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => Signal::CtrlC,
        _ = terminate => Signal::Terminate,
    }
}

/// Run a command until it finishes or the process is asked to stop.
///
/// On a signal the command's future is dropped, which abandons any request
/// still in flight and releases its in-flight token.
pub async fn run_until_interrupted<F: Future>(task: F) -> Result<F::Output, Interrupted> {
    tokio::select! {
        output = task => Ok(output),
        signal = wait_for_signal() => {
            info!("Received {:?}, abandoning current command", signal);
            Err(Interrupted(signal))
        }
    }
}
