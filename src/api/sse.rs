//! Server-Sent Events support

use crate::runtime::SessionSnapshot;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;

/// Stream the current snapshot, then every published snapshot
pub fn sse_stream(
    snapshot_rx: watch::Receiver<SessionSnapshot>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let snapshots = WatchStream::new(snapshot_rx).map(|snapshot| Ok(snapshot_to_event(&snapshot)));

    Sse::new(snapshots).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn snapshot_to_event(snapshot: &SessionSnapshot) -> Event {
    let data = serde_json::to_string(snapshot).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to serialize snapshot");
        "null".to_string()
    });
    Event::default().event("snapshot").data(data)
}
