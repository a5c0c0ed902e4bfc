//! Run transition notifications.
//!
//! The executor calls a caller-supplied [`RunObserver`] synchronously after
//! every transition. [`EventBus`] is an observer that fans snapshots out to
//! any number of broadcast subscribers without ever blocking the run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::{Run, RunStatus, StepStatus};

/// What just changed in a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transition {
    RunStarted,
    StepStarted { step_id: String },
    StepFinished { step_id: String, status: StepStatus },
    RunFinished { status: RunStatus },
}

/// Receives the full run snapshot after every transition.
pub trait RunObserver: Send + Sync {
    fn on_transition(&self, transition: &Transition, run: &Run);
}

impl<F> RunObserver for F
where
    F: Fn(&Transition, &Run) + Send + Sync,
{
    fn on_transition(&self, transition: &Transition, run: &Run) {
        self(transition, run)
    }
}

/// A transition together with the run snapshot it produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    pub transition: Transition,
    pub run: Run,
    pub timestamp: DateTime<Utc>,
}

/// Broadcast fan-out of run events
pub struct EventBus {
    sender: broadcast::Sender<RunEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: RunEvent) {
        // No subscribers is fine; lagging ones drop old events.
        if self.sender.send(event).is_err() {
            tracing::trace!("run event dropped: no subscribers");
        }
    }
}

impl RunObserver for EventBus {
    fn on_transition(&self, transition: &Transition, run: &Run) {
        if self.sender.receiver_count() == 0 {
            return;
        }
        self.emit(RunEvent {
            transition: transition.clone(),
            run: run.clone(),
            timestamp: Utc::now(),
        });
    }
}
