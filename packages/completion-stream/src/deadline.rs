//! Hard deadline for one completion call.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Cancellation timer armed before the transport call starts.
///
/// When `duration` elapses the token is cancelled; everything racing on
/// [`Deadline::token`] then gives up. The timer task is aborted on
/// [`Deadline::disarm`] or drop, so it never outlives the call.
#[derive(Debug)]
pub struct Deadline {
    token: CancellationToken,
    timer: Option<JoinHandle<()>>,
    duration: Duration,
}

impl Deadline {
    /// Arm a new deadline. Must be called from within a Tokio runtime.
    pub fn start(duration: Duration) -> Self {
        let token = CancellationToken::new();
        let timer_token = token.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            debug!(timeout_ms = duration.as_millis() as u64, "deadline elapsed");
            timer_token.cancel();
        });

        Self {
            token,
            timer: Some(timer),
            duration,
        }
    }

    /// Signal that fires when the deadline elapses.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Whether the deadline has already fired.
    pub fn is_expired(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Stop the timer without firing the signal.
    pub fn disarm(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        self.disarm();
    }
}
