//! Per-election change notifications.
//!
//! Every admin write publishes an [`ElectionEvent`] after its transaction
//! commits. Dashboards subscribe through the SSE endpoint and re-fetch the
//! affected collection. Delivery is best effort: a lagging subscriber skips
//! the events it missed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Collection touched by a write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChangeTarget {
    Election,
    Candidate,
    Partylist,
    Position,
    Voter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ElectionEvent {
    pub election_id: Uuid,
    pub target: ChangeTarget,
    pub action: ChangeAction,
    pub entity_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}

impl ElectionEvent {
    pub fn new(
        election_id: Uuid,
        target: ChangeTarget,
        action: ChangeAction,
        entity_id: Uuid,
    ) -> Self {
        Self {
            election_id,
            target,
            action,
            entity_id,
            occurred_at: Utc::now(),
        }
    }
}

/// Process-wide hub fanning change events out to SSE subscribers
pub struct ElectionEvents {
    sender: broadcast::Sender<ElectionEvent>,
}

impl ElectionEvents {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: ElectionEvent) {
        match self.sender.send(event) {
            Ok(receivers) => debug!("Change event delivered to {} subscriber(s)", receivers),
            // No dashboard is listening right now
            Err(_) => debug!("Change event dropped: no subscribers"),
        }
    }

    /// Stream of events for one election only
    pub fn subscribe(&self, election_id: Uuid) -> impl Stream<Item = ElectionEvent> + Send + 'static {
        BroadcastStream::new(self.sender.subscribe()).filter_map(move |item| match item {
            Ok(event) if event.election_id == election_id => Some(event),
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(
                    "Subscriber for election {} lagged, skipped {} event(s)",
                    election_id, skipped
                );
                None
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscriber_only_receives_matching_election() {
        let events = ElectionEvents::new(16);
        let mine = Uuid::new_v4();
        let other = Uuid::new_v4();
        let candidate_id = Uuid::new_v4();

        let mut stream = Box::pin(events.subscribe(mine));
        assert_eq!(events.subscriber_count(), 1);

        events.publish(ElectionEvent::new(
            other,
            ChangeTarget::Partylist,
            ChangeAction::Created,
            Uuid::new_v4(),
        ));
        events.publish(ElectionEvent::new(
            mine,
            ChangeTarget::Candidate,
            ChangeAction::Updated,
            candidate_id,
        ));

        let received = stream.next().await.unwrap();
        assert_eq!(received.election_id, mine);
        assert_eq!(received.target, ChangeTarget::Candidate);
        assert_eq!(received.entity_id, candidate_id);
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let events = ElectionEvents::new(4);
        events.publish(ElectionEvent::new(
            Uuid::new_v4(),
            ChangeTarget::Voter,
            ChangeAction::Deleted,
            Uuid::new_v4(),
        ));
        assert_eq!(events.subscriber_count(), 0);
    }

    #[test]
    fn test_event_serializes_camel_case() {
        let event = ElectionEvent::new(
            Uuid::nil(),
            ChangeTarget::Position,
            ChangeAction::Created,
            Uuid::nil(),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["target"], "position");
        assert_eq!(json["action"], "created");
        assert!(json.get("electionId").is_some());
    }
}
