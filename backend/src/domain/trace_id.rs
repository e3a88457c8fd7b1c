//! Request correlation identifier.
//!
//! The active [`TraceId`] lives in Tokio task-local storage so errors and log
//! lines can pick it up without threading it through every call. Task-locals
//! do not follow work onto spawned tasks or blocking threads; wrap such work
//! in [`TraceId::scope`].

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static TRACE_ID: TraceId;
}

/// UUID identifying a single request.
///
/// # Examples
/// ```
/// use yamda::domain::TraceId;
///
/// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
/// let id: TraceId = "6f1e2a9c-0c7b-4a43-9d8e-2b1f0f6c3d11".parse().expect("uuid");
/// let seen = TraceId::scope(id, async { TraceId::current() }).await;
/// assert_eq!(seen, Some(id));
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Random identifier for a new request.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Identifier of the request currently being served, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        TRACE_ID.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` as the current identifier.
    pub async fn scope<Fut>(trace_id: Self, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        TRACE_ID.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn current_is_none_outside_a_request() {
        assert!(TraceId::current().is_none());
    }

    #[tokio::test]
    async fn scope_is_visible_to_nested_futures() {
        let id = TraceId::generate();
        let seen = TraceId::scope(id, async { async { TraceId::current() }.await }).await;
        assert_eq!(seen, Some(id));
    }

    #[tokio::test]
    async fn scope_does_not_leak_into_spawned_tasks() {
        let id = TraceId::generate();
        let seen = TraceId::scope(id, async {
            tokio::spawn(async { TraceId::current() })
                .await
                .expect("task completes")
        })
        .await;
        assert!(seen.is_none());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        let id = TraceId::generate();
        let parsed: TraceId = id.to_string().parse().expect("valid uuid");
        assert_eq!(parsed, id);
    }
}
