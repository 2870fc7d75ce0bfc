use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    response::{
        sse::{Event, KeepAlive},
        Sse,
    },
};
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::features::elections::context::ElectionContext;
use crate::features::elections::events::{ElectionEvent, ElectionEvents};

/// Subscribe to change events of an election
///
/// Server-sent events stream; each `change` event carries one
/// `ElectionEvent` as JSON. Dashboards re-fetch the affected collection
/// when an event arrives.
#[utoipa::path(
    get,
    path = "/api/elections/{election_slug}/events",
    params(("election_slug" = String, Path, description = "Election slug")),
    responses(
        (status = 200, description = "Event stream", content_type = "text/event-stream", body = ElectionEvent),
        (status = 403, description = "Not a commissioner of this election"),
        (status = 404, description = "Election not found")
    ),
    security(("bearer_auth" = [])),
    tag = "elections"
)]
pub async fn stream_events(
    ctx: ElectionContext,
    State(events): State<Arc<ElectionEvents>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!(
        "Account {} subscribed to events of election {}",
        ctx.user.account_id, ctx.election.id
    );

    let stream = events
        .subscribe(ctx.election.id)
        .filter_map(|event| match Event::default().event("change").json_data(&event) {
            Ok(sse_event) => Some(Ok(sse_event)),
            Err(e) => {
                warn!("Failed to encode change event: {}", e);
                None
            }
        });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}
