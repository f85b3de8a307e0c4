//! Bookkeeping shared by every orchestrated multi-call load.

use cinefeed_client::ApiError;
use cinefeed_config::LoadingPolicy;
use futures::future::BoxFuture;
use std::fmt::Debug;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn, Instrument};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    /// Some calls have settled, others are still in flight
    PartiallyLoaded,
    Completed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadStatus {
    pub phase: LoadPhase,
    pub is_loading: bool,
    pub last_error: Option<AppError>,
    pending: usize,
    batches: u64,
    policy: LoadingPolicy,
}

impl LoadStatus {
    pub fn new(policy: LoadingPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> LoadingPolicy {
        self.policy
    }

    /// Calls dispatched but not yet settled, across all overlapping batches
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Number of batches begun so far
    pub fn batches(&self) -> u64 {
        self.batches
    }

    /// True once `batches` batches have begun and none of their calls is outstanding
    pub fn settled_after(&self, batches: u64) -> bool {
        self.batches >= batches && self.pending == 0
    }

    pub fn begin(&mut self, calls: usize) {
        self.batches += 1;
        self.pending += calls;
        self.is_loading = true;
        self.last_error = None;
        self.phase = LoadPhase::Loading;
    }

    pub fn settle(&mut self, primary: bool, error: Option<AppError>) {
        self.pending = self.pending.saturating_sub(1);
        if let Some(error) = error {
            self.last_error = Some(error);
        }
        self.is_loading = match self.policy {
            LoadingPolicy::AllSettled => self.pending > 0,
            LoadingPolicy::PrimaryCall => self.is_loading && !primary,
        };
        // Under PrimaryCall the batch is complete once the primary call lands,
        // and late siblings leave it there
        let complete = match self.policy {
            LoadingPolicy::AllSettled => self.pending == 0,
            LoadingPolicy::PrimaryCall => !self.is_loading,
        };
        self.phase = if complete {
            LoadPhase::Completed
        } else {
            LoadPhase::PartiallyLoaded
        };
    }
}

/// One upstream call within an orchestrated load
pub trait LoadCall: Copy + Debug + Send + 'static {
    fn label(&self) -> &'static str;

    /// The call whose completion ends loading under `LoadingPolicy::PrimaryCall`
    fn is_primary(&self) -> bool;
}

#[derive(Debug, Clone)]
pub enum LoadEvent<C, P> {
    /// A batch of this many calls was dispatched
    Begin(usize),
    Settled { call: C, outcome: Result<P, AppError> },
}

impl<C: LoadCall, P> LoadEvent<C, P> {
    /// Applies the bookkeeping half of the event; successful payloads are handed back
    pub fn record(self, status: &mut LoadStatus) -> Option<(C, P)> {
        match self {
            LoadEvent::Begin(calls) => {
                status.begin(calls);
                None
            }
            LoadEvent::Settled { call, outcome } => match outcome {
                Ok(payload) => {
                    status.settle(call.is_primary(), None);
                    Some((call, payload))
                }
                Err(error) => {
                    status.settle(call.is_primary(), Some(error));
                    None
                }
            },
        }
    }
}

pub(crate) type CallFuture<P> = BoxFuture<'static, Result<P, ApiError>>;

/// Announce the batch, then run every call on its own task. Each completion is
/// wrapped into the owner's event type and sent back to its actor.
pub(crate) fn dispatch<C, P, E>(
    events: &UnboundedSender<E>,
    calls: Vec<(C, CallFuture<P>)>,
    wrap: impl Fn(LoadEvent<C, P>) -> E + Clone + Send + 'static,
) where
    C: LoadCall,
    P: Send + 'static,
    E: Send + 'static,
{
    let _ = events.send(wrap(LoadEvent::Begin(calls.len())));

    for (call, fut) in calls {
        let events = events.clone();
        let wrap = wrap.clone();
        tokio::spawn(
            async move {
                let outcome = match fut.await {
                    Ok(payload) => {
                        debug!(call = call.label(), "Call completed");
                        Ok(payload)
                    }
                    Err(e) => {
                        warn!(call = call.label(), error = %e, "Call failed");
                        Err(AppError::from(e))
                    }
                };
                let _ = events.send(wrap(LoadEvent::Settled { call, outcome }));
            }
            .in_current_span(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_settled_waits_for_every_call() {
        let mut status = LoadStatus::new(LoadingPolicy::AllSettled);
        assert_eq!(status.phase, LoadPhase::Idle);

        status.begin(3);
        assert!(status.is_loading);
        assert_eq!(status.phase, LoadPhase::Loading);

        status.settle(true, None);
        assert!(status.is_loading);
        assert_eq!(status.phase, LoadPhase::PartiallyLoaded);

        status.settle(false, Some(AppError::MovieNotFound));
        status.settle(false, None);
        assert!(!status.is_loading);
        assert_eq!(status.phase, LoadPhase::Completed);
        assert_eq!(status.last_error, Some(AppError::MovieNotFound));
        assert!(status.settled_after(1));
        assert!(!status.settled_after(2));
    }

    #[test]
    fn test_primary_call_ends_loading_early() {
        let mut status = LoadStatus::new(LoadingPolicy::PrimaryCall);
        status.begin(3);

        status.settle(false, None);
        assert!(status.is_loading);

        assert_eq!(status.phase, LoadPhase::PartiallyLoaded);

        status.settle(true, None);
        assert!(!status.is_loading);
        assert_eq!(status.phase, LoadPhase::Completed);
        assert_eq!(status.pending(), 1);

        // Late siblings never reopen the load
        status.settle(false, Some(AppError::InvalidData));
        assert!(!status.is_loading);
        assert_eq!(status.phase, LoadPhase::Completed);
        assert_eq!(status.last_error, Some(AppError::InvalidData));
    }

    #[test]
    fn test_primary_call_first_completes_immediately() {
        let mut status = LoadStatus::new(LoadingPolicy::PrimaryCall);
        status.begin(5);
        status.settle(false, None);
        status.settle(true, None);
        assert!(!status.is_loading);
        assert_eq!(status.phase, LoadPhase::Completed);

        status.begin(2);
        assert!(status.is_loading);
        assert_eq!(status.phase, LoadPhase::Loading);
    }

    #[test]
    fn test_overlapping_batches() {
        let mut status = LoadStatus::new(LoadingPolicy::AllSettled);
        status.begin(2);
        status.settle(false, Some(AppError::InvalidData));
        status.begin(2);
        assert_eq!(status.pending(), 3);
        assert_eq!(status.last_error, None);

        status.settle(false, None);
        status.settle(false, None);
        assert!(status.is_loading);
        status.settle(false, None);
        assert!(!status.is_loading);
    }
}
