use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the channel is closed.
    /// Used after commit: the write has already happened, so a lost event must
    /// not fail the operation.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            error!("Dropping event: {}", e);
        }
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Project events
    ProjectCreated(Uuid),
    ProjectUpdated(Uuid),
    ProjectDeleted(Uuid),

    // Sub-job events
    SubJobCreated {
        sub_job_id: Uuid,
        project_id: Uuid,
    },
    SubJobUpdated(Uuid),
    SubJobDeleted(Uuid),

    // Rule-of-credit events
    RuleOfCreditCreated(Uuid),
    RuleOfCreditUpdated(Uuid),
    RuleOfCreditStepsReplaced {
        rule_id: Uuid,
        step_count: usize,
    },
    RuleOfCreditDeleted(Uuid),

    // Cost code events
    CostCodeCreated {
        cost_code_id: Uuid,
        project_id: Uuid,
    },
    CostCodeUpdated(Uuid),
    CostCodeDeleted(Uuid),

    // Work item events
    WorkItemCreated {
        work_item_id: Uuid,
        sub_job_id: Uuid,
    },
    WorkItemUpdated(Uuid),
    WorkItemStepUpdated {
        work_item_id: Uuid,
        step: String,
        percent: f64,
    },
    WorkItemRecomputed {
        work_item_id: Uuid,
        earned_man_hours: f64,
        earned_quantity: f64,
    },
    WorkItemRebound {
        work_item_id: Uuid,
        cost_code_id: Uuid,
    },
    WorkItemDeleted(Uuid),

    // Generic event for custom messages
    Generic {
        message: String,
        timestamp: DateTime<Utc>,
        metadata: serde_json::Value,
    },
}

impl Event {
    /// Create a generic event with string data
    pub fn with_data(data: String) -> Self {
        Event::Generic {
            message: data,
            timestamp: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }
}

// Define a trait for handling events. Handlers implementing this trait will process events asynchronously.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle_event(&self, event: Event) -> Result<(), String>;
}

// Function to process incoming events and distribute them to registered event handlers.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::WorkItemStepUpdated {
                work_item_id,
                ref step,
                percent,
            } => {
                info!(
                    "Step '{}' of work item {} set to {}%",
                    step, work_item_id, percent
                );
            }
            Event::WorkItemRecomputed {
                work_item_id,
                earned_man_hours,
                earned_quantity,
            } => {
                info!(
                    "Work item {} recomputed: earned_man_hours={}, earned_quantity={}",
                    work_item_id, earned_man_hours, earned_quantity
                );
            }
            Event::WorkItemRebound {
                work_item_id,
                cost_code_id,
            } => {
                // Rebinding discards prior step progress; worth a trace of its own
                info!(
                    "Work item {} rebound to cost code {} (progress reset)",
                    work_item_id, cost_code_id
                );
            }
            Event::RuleOfCreditStepsReplaced {
                rule_id,
                step_count,
            } => {
                info!(
                    "Rule of credit {} steps replaced ({} steps)",
                    rule_id, step_count
                );
            }
            Event::RuleOfCreditDeleted(rule_id) => {
                info!("Rule of credit {} deleted", rule_id);
            }
            _ => {
                info!("No specific handler for event: {:?}", event);
            }
        }
    }

    warn!("Event processing loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_event_to_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);

        let work_item_id = Uuid::new_v4();
        sender
            .send(Event::WorkItemUpdated(work_item_id))
            .await
            .expect("send should succeed");

        match rx.recv().await {
            Some(Event::WorkItemUpdated(id)) => assert_eq!(id, work_item_id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_or_log_swallows_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        // Must not panic or error out
        sender.send_or_log(Event::ProjectUpdated(Uuid::new_v4())).await;
    }
}
