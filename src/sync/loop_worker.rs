use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::controller::{DeliveryOutcome, PollTrigger, WeakCoordinator};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Poll the mailbox for one session: once immediately, then every
/// `poll_interval`, until a capture lands, the session is cancelled, or the
/// coordinator is gone.
pub(crate) async fn poll_loop(
    coordinator: WeakCoordinator,
    session_id: String,
    poll_interval: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("poll loop for session {session_id} cancelled");
                break;
            }
            _ = ticker.tick() => {
                let Some(live) = coordinator.upgrade() else {
                    log_info!("coordinator for session {session_id} dropped; stopping poll loop");
                    break;
                };
                match live.poll_session(&session_id, PollTrigger::Tick).await {
                    DeliveryOutcome::NothingYet | DeliveryOutcome::AlreadyConsumed => {}
                    outcome => {
                        log_debug!("poll loop for session {session_id} finished: {outcome:?}");
                        break;
                    }
                }
            }
        }
    }
}
