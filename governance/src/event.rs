//! Observable governance events.

use dao_types::{Address, ProposalId, TokenAmount};
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Audit events emitted once per successful state change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum GovernanceEvent {
    Deposited {
        voter: Address,
        amount: TokenAmount,
    },
    Withdrawn {
        voter: Address,
        amount: TokenAmount,
    },
    ProposalAdded {
        id: ProposalId,
        recipient: Address,
        description: String,
    },
    Voted {
        id: ProposalId,
        voter: Address,
        is_for: bool,
    },
    /// Emitted exactly once per proposal, whatever the resolution.
    VotingFinished {
        id: ProposalId,
        success: bool,
        reason: String,
    },
    DebatingPeriodUpdated {
        old_secs: u64,
        new_secs: u64,
    },
}

/// Synchronous fan-out event bus for governance events.
///
/// Listeners run inline on the emitting thread while the engine is mid-call;
/// they must not call back into the engine.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&GovernanceEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&GovernanceEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &GovernanceEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Collects every event it is subscribed to, for assertions and replay.
#[derive(Clone, Debug, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<GovernanceEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A listener to hand to [`EventBus::subscribe`]; it shares this recorder's buffer.
    pub fn listener(&self) -> Box<dyn Fn(&GovernanceEvent) + Send + Sync> {
        let sink = Arc::clone(&self.events);
        Box::new(move |event| {
            if let Ok(mut events) = sink.lock() {
                events.push(event.clone());
            }
        })
    }

    pub fn events(&self) -> Vec<GovernanceEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<GovernanceEvent> {
        self.events.lock().ok().and_then(|e| e.last().cloned())
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<GovernanceEvent> {
        self.events
            .lock()
            .map(|mut e| std::mem::take(&mut *e))
            .unwrap_or_default()
    }
}
