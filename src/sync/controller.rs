use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use anyhow::Result;
use serde::Serialize;
use tokio::sync::{watch, Mutex, MutexGuard};

use crate::{
    capture::{route_capture, RawCapture},
    commit::{build_payload, CommitPayload, ProductDraft},
    error::{CommitError, SlotError},
    mailbox::{HttpMailbox, MailboxClient},
    settings::SyncSettings,
    slots::{PreferenceSlot, PreferenceSlots, SlotId},
};

use super::{loop_worker::poll_loop, session::SyncSession};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info};

/// What the UI renders: every slot plus the live session, if any.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncSnapshot {
    pub slots: PreferenceSlots,
    pub armed: Option<SlotId>,
    pub session_id: Option<String>,
}

/// Result of handing one poll's worth of mailbox data to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Capture written into this slot; the session is over.
    Delivered(SlotId),
    /// The mailbox had nothing yet.
    NothingYet,
    /// The mailbox still holds a capture that was already delivered into
    /// another slot, or one older than the newest delivery.
    AlreadyConsumed,
    /// The capture belongs to a session that has since been torn down.
    StaleSessionIgnored,
    /// No session is live.
    Idle,
}

/// What asked for the mailbox read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PollTrigger {
    /// Scheduled poll; skips captures another slot already consumed.
    Tick,
    /// User-requested refresh; takes whatever the mailbox holds.
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ConsumedCapture {
    stamp: i64,
    slot: SlotId,
}

impl ConsumedCapture {
    fn blocks(&self, stamp: i64, target: SlotId) -> bool {
        stamp < self.stamp || (stamp == self.stamp && self.slot != target)
    }
}

struct SyncState {
    slots: PreferenceSlots,
    session: Option<SyncSession>,
    /// Newest timestamped capture written into a slot, and which slot took it.
    last_consumed: Option<ConsumedCapture>,
}

impl SyncState {
    fn snapshot(&self) -> SyncSnapshot {
        SyncSnapshot {
            slots: self.slots.clone(),
            armed: self.session.as_ref().map(|session| session.target),
            session_id: self.session.as_ref().map(|session| session.id.clone()),
        }
    }

    fn end_session(&mut self) -> Option<SlotId> {
        let session = self.session.take()?;
        let target = session.target;
        self.slots.get_mut(target).disarm();
        log_info!(
            "ended capture session {} for {} after {} ms",
            session.id,
            target,
            session.elapsed_ms()
        );
        session.cancel();
        Some(target)
    }

    /// Keep "armed" and "session target" in lockstep after a user edit.
    fn reconcile(&mut self) {
        let target = self.session.as_ref().map(|session| session.target);
        if let Some(target) = target {
            if !self.slots.get(target).armed {
                self.end_session();
            }
        }
        for id in SlotId::ALL {
            if Some(id) != target && self.slots.get(id).armed {
                self.slots.get_mut(id).disarm();
            }
        }
    }
}

/// Sole owner of the capture session. Arms one slot at a time, drives the poll
/// loop, and routes deliveries into whichever slot is still the target.
#[derive(Clone)]
pub struct SyncCoordinator {
    state: Arc<Mutex<SyncState>>,
    mailbox: MailboxClient,
    poll_interval: Duration,
    snapshots: Arc<watch::Sender<SyncSnapshot>>,
}

/// Non-owning view of a [`SyncCoordinator`] held by poll tasks. Once every
/// owning handle is gone, `upgrade` fails and the task stops.
#[derive(Clone)]
pub(crate) struct WeakCoordinator {
    state: Weak<Mutex<SyncState>>,
    mailbox: MailboxClient,
    poll_interval: Duration,
    snapshots: Weak<watch::Sender<SyncSnapshot>>,
}

impl WeakCoordinator {
    pub(crate) fn upgrade(&self) -> Option<SyncCoordinator> {
        Some(SyncCoordinator {
            state: self.state.upgrade()?,
            mailbox: self.mailbox.clone(),
            poll_interval: self.poll_interval,
            snapshots: self.snapshots.upgrade()?,
        })
    }
}

impl SyncCoordinator {
    pub fn new(mailbox: MailboxClient, poll_interval: Duration) -> Self {
        let state = SyncState {
            slots: PreferenceSlots::new(),
            session: None,
            last_consumed: None,
        };
        let (snapshots, _) = watch::channel(state.snapshot());

        Self {
            state: Arc::new(Mutex::new(state)),
            mailbox,
            poll_interval,
            snapshots: Arc::new(snapshots),
        }
    }

    pub fn from_settings(settings: &SyncSettings) -> Result<Self> {
        let source = HttpMailbox::new(&settings.mailbox)?;
        log_info!("polling capture mailbox at {}", source.url());
        let mailbox = MailboxClient::new(Arc::new(source), settings.request_timeout());
        Ok(Self::new(mailbox, settings.poll_interval()))
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncSnapshot> {
        self.snapshots.subscribe()
    }

    pub async fn snapshot(&self) -> SyncSnapshot {
        self.state.lock().await.snapshot()
    }

    fn downgrade(&self) -> WeakCoordinator {
        WeakCoordinator {
            state: Arc::downgrade(&self.state),
            mailbox: self.mailbox.clone(),
            poll_interval: self.poll_interval,
            snapshots: Arc::downgrade(&self.snapshots),
        }
    }

    /// Make `slot` the capture target. Any live session is torn down first, so
    /// a late answer for the old target can never land in the new one.
    /// Returns the new session id.
    pub async fn arm(&self, slot: SlotId) -> String {
        let mut state = self.state.lock().await;
        state.end_session();

        state.slots.get_mut(slot).arm();
        let mut session = SyncSession::new(slot);
        let session_id = session.id.clone();

        let handle = tokio::spawn(poll_loop(
            self.downgrade(),
            session_id.clone(),
            self.poll_interval,
            session.cancel_token(),
        ));
        session.attach_poll_task(handle);
        state.session = Some(session);

        log_info!("armed {slot} with capture session {session_id}");
        self.publish(&state);
        session_id
    }

    /// Manual refresh: poll right now instead of waiting for the next tick.
    /// Whatever the mailbox holds is routed, even a capture that already went
    /// into another slot.
    pub async fn refresh(&self) -> DeliveryOutcome {
        let session_id = {
            let state = self.state.lock().await;
            state.session.as_ref().map(|session| session.id.clone())
        };

        match session_id {
            Some(session_id) => self.poll_session(&session_id, PollTrigger::Manual).await,
            None => DeliveryOutcome::Idle,
        }
    }

    /// Cancel any live poll. Slot data stays as it is.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if state.end_session().is_some() {
            self.publish(&state);
        }
    }

    pub async fn activate(&self, slot: SlotId) {
        let mut state = self.state.lock().await;
        state.slots.get_mut(slot).activate();
        self.publish(&state);
    }

    /// Reset `slot`, cancelling its capture session if it was the target.
    pub async fn deactivate(&self, slot: SlotId) {
        let mut state = self.state.lock().await;
        state.slots.get_mut(slot).deactivate();
        state.reconcile();
        self.publish(&state);
    }

    /// Apply a user edit to one slot and publish the result.
    pub async fn update_slot<R>(
        &self,
        slot: SlotId,
        edit: impl FnOnce(&mut PreferenceSlot) -> Result<R, SlotError>,
    ) -> Result<R, SlotError> {
        let mut state = self.state.lock().await;
        let outcome = edit(state.slots.get_mut(slot));
        state.reconcile();
        self.publish(&state);
        outcome
    }

    /// Close the session and assemble the wishlist payload.
    pub async fn commit(&self, product: ProductDraft) -> Result<CommitPayload, CommitError> {
        let mut state = self.state.lock().await;
        if state.end_session().is_some() {
            self.publish(&state);
        }
        build_payload(&state.slots, product)
    }

    pub(crate) async fn poll_session(
        &self,
        session_id: &str,
        trigger: PollTrigger,
    ) -> DeliveryOutcome {
        match self.mailbox.poll().await {
            Some(capture) => self.deliver(session_id, &capture, trigger).await,
            None => DeliveryOutcome::NothingYet,
        }
    }

    /// Route a capture fetched on behalf of `session_id`.
    pub(crate) async fn deliver(
        &self,
        session_id: &str,
        capture: &RawCapture,
        trigger: PollTrigger,
    ) -> DeliveryOutcome {
        let mut state = self.state.lock().await;

        let target = match state.session.as_ref() {
            Some(session) if session.id == session_id => session.target,
            _ => {
                log_debug!("ignoring capture for torn-down session {session_id}");
                return DeliveryOutcome::StaleSessionIgnored;
            }
        };

        if let (PollTrigger::Tick, Some(stamp), Some(consumed)) =
            (trigger, capture.timestamp, state.last_consumed)
        {
            if consumed.blocks(stamp, target) {
                log_debug!(
                    "mailbox still holds capture {stamp} consumed by {}; waiting for a newer one",
                    consumed.slot
                );
                return DeliveryOutcome::AlreadyConsumed;
            }
        }

        let routed = route_capture(capture);
        if let Err(err) = state
            .slots
            .get_mut(target)
            .receive_capture(routed.attributes, routed.media)
        {
            log_error!("session {session_id} targets {target} but delivery failed: {err}");
            state.end_session();
            self.publish(&state);
            return DeliveryOutcome::StaleSessionIgnored;
        }

        if let Some(stamp) = capture.timestamp {
            match state.last_consumed {
                Some(newer) if newer.stamp > stamp => {}
                _ => state.last_consumed = Some(ConsumedCapture { stamp, slot: target }),
            }
        }

        if let Some(session) = state.session.take() {
            log_info!(
                "capture session {} delivered into {} after {} ms ({} attributes)",
                session.id,
                target,
                session.elapsed_ms(),
                state.slots.get(target).attributes.len()
            );
            session.cancel();
        }

        self.publish(&state);
        DeliveryOutcome::Delivered(target)
    }

    fn publish(&self, state: &MutexGuard<'_, SyncState>) {
        self.snapshots.send_replace(state.snapshot());
    }
}
