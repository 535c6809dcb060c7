//! State poller
//!
//! Repeatedly queries a remote resource and classifies the result until it
//! reaches one of the target states, leaves the pending set, times out, or
//! the operation is cancelled.
//!
//! Query results are classified as follows:
//!
//! - `Ok(resource)` → the state reported by the `phase` function
//! - `Err(CloudError::NotFound)` → [`STATE_DELETED`]
//! - any other error → [`STATE_ERROR`]
//!
//! [`STATE_DELETED`] is only a success when the caller lists it as a target,
//! which is how delete paths converge.

use crate::error::{CloudError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// State reported when the query returns not-found
pub const STATE_DELETED: &str = "DELETED";

/// State reported when the query fails for any other reason
pub const STATE_ERROR: &str = "ERROR";

/// Default time between two queries
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Pending/target sets and timing of one wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitSpec {
    pub pending: Vec<String>,
    pub target: Vec<String>,
    /// Sleep before the first query
    pub delay: Duration,
    /// Sleep between queries
    pub poll_interval: Duration,
    /// Overall deadline, measured from the start of the wait
    pub timeout: Duration,
}

impl WaitSpec {
    pub fn new(pending: &[&str], target: &[&str], timeout: Duration) -> Self {
        Self {
            pending: pending.iter().map(|s| s.to_string()).collect(),
            target: target.iter().map(|s| s.to_string()).collect(),
            delay: Duration::ZERO,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn is_target(&self, state: &str) -> bool {
        self.target.iter().any(|s| s == state)
    }

    pub fn is_pending(&self, state: &str) -> bool {
        self.pending.iter().any(|s| s == state)
    }
}

/// Wait until the queried resource reaches a target state
///
/// Returns the resource observed in the target state, or `None` when the
/// target was reached through a not-found result.
pub async fn wait_for_state<T, F, Fut, P>(
    spec: &WaitSpec,
    cancel: &CancellationToken,
    mut query: F,
    phase: P,
) -> Result<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&T) -> String,
{
    let deadline = Instant::now() + spec.timeout;

    if !spec.delay.is_zero() {
        sleep_or_cancel(spec, cancel, spec.delay).await?;
    }

    let mut last_state = String::from("unknown");

    loop {
        if cancel.is_cancelled() {
            return Err(CloudError::Cancelled(spec.target.clone()));
        }

        // An in-flight query is bounded by the deadline and the cancellation
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(targets = ?spec.target, "Wait cancelled during query");
                return Err(CloudError::Cancelled(spec.target.clone()));
            }
            _ = tokio::time::sleep_until(deadline) => {
                return Err(CloudError::Timeout {
                    target: spec.target.clone(),
                    last_state: last_state.clone(),
                    timeout: spec.timeout,
                });
            }
            result = query() => result,
        };

        let mut cause = None;
        let (resource, state) = match result {
            Ok(resource) => {
                let state = phase(&resource);
                (Some(resource), state)
            }
            Err(e) if e.is_not_found() => (None, STATE_DELETED.to_string()),
            Err(e) => {
                tracing::debug!(error = %e, "State query failed");
                cause = Some(e.to_string());
                (None, STATE_ERROR.to_string())
            }
        };

        tracing::debug!(state = %state, targets = ?spec.target, "Observed state");

        if spec.is_target(&state) {
            return Ok(resource);
        }

        if !spec.is_pending(&state) {
            return Err(CloudError::UnexpectedState {
                state,
                target: spec.target.clone(),
                cause,
            });
        }

        last_state = state;

        let now = Instant::now();
        if now >= deadline {
            return Err(CloudError::Timeout {
                target: spec.target.clone(),
                last_state,
                timeout: spec.timeout,
            });
        }

        let wait = spec.poll_interval.min(deadline - now);
        sleep_or_cancel(spec, cancel, wait).await?;
    }
}

async fn sleep_or_cancel(spec: &WaitSpec, cancel: &CancellationToken, wait: Duration) -> Result<()> {
    tokio::select! {
        _ = cancel.cancelled() => {
            tracing::debug!(targets = ?spec.target, "Wait cancelled");
            Err(CloudError::Cancelled(spec.target.clone()))
        }
        _ = tokio::time::sleep(wait) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast(pending: &[&str], target: &[&str]) -> WaitSpec {
        WaitSpec::new(pending, target, Duration::from_millis(200))
            .with_poll_interval(Duration::from_millis(5))
    }

    /// Query returning the scripted phases in order, repeating the last one
    fn scripted(
        phases: Vec<&'static str>,
        calls: Arc<AtomicUsize>,
    ) -> impl FnMut() -> std::future::Ready<Result<String>> {
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            let phase = phases[n.min(phases.len() - 1)];
            std::future::ready(match phase {
                "404" => Err(CloudError::NotFound("ns".to_string())),
                "500" => Err(CloudError::Api {
                    status: 500,
                    message: "internal".to_string(),
                }),
                p => Ok(p.to_string()),
            })
        }
    }

    #[tokio::test]
    async fn test_stops_at_target() {
        let calls = Arc::new(AtomicUsize::new(0));
        let spec = fast(&["Pending"], &["Active"]);
        let result = wait_for_state(
            &spec,
            &CancellationToken::new(),
            scripted(vec!["Pending", "Pending", "Active", "Pending"], calls.clone()),
            |s: &String| s.clone(),
        )
        .await
        .unwrap();

        assert_eq!(result.as_deref(), Some("Active"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_not_found_reaches_deleted_target() {
        let calls = Arc::new(AtomicUsize::new(0));
        let spec = fast(&["Active", "Terminating"], &[STATE_DELETED]);
        let result = wait_for_state(
            &spec,
            &CancellationToken::new(),
            scripted(vec!["Active", "Terminating", "404"], calls.clone()),
            |s: &String| s.clone(),
        )
        .await
        .unwrap();

        assert!(result.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_not_found_is_fatal_without_deleted_target() {
        let spec = fast(&["Pending"], &["Active"]);
        let err = wait_for_state(
            &spec,
            &CancellationToken::new(),
            scripted(vec!["404"], Arc::new(AtomicUsize::new(0))),
            |s: &String| s.clone(),
        )
        .await
        .unwrap_err();

        assert!(
            matches!(err, CloudError::UnexpectedState { ref state, .. } if state == STATE_DELETED)
        );
    }

    #[tokio::test]
    async fn test_query_error_is_fatal() {
        let calls = Arc::new(AtomicUsize::new(0));
        let spec = fast(&["Pending"], &["Active"]);
        let err = wait_for_state(
            &spec,
            &CancellationToken::new(),
            scripted(vec!["Pending", "500", "Active"], calls.clone()),
            |s: &String| s.clone(),
        )
        .await
        .unwrap_err();

        match err {
            CloudError::UnexpectedState { state, cause, .. } => {
                assert_eq!(state, STATE_ERROR);
                assert!(cause.unwrap().contains("internal"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_state_is_fatal() {
        let spec = fast(&["Pending"], &["Active"]);
        let err = wait_for_state(
            &spec,
            &CancellationToken::new(),
            scripted(vec!["Failed"], Arc::new(AtomicUsize::new(0))),
            |s: &String| s.clone(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CloudError::UnexpectedState { .. }));
    }

    #[tokio::test]
    async fn test_times_out_while_pending() {
        let spec = WaitSpec::new(&["Pending"], &["Active"], Duration::from_millis(30))
            .with_poll_interval(Duration::from_millis(5));
        let err = wait_for_state(
            &spec,
            &CancellationToken::new(),
            scripted(vec!["Pending"], Arc::new(AtomicUsize::new(0))),
            |s: &String| s.clone(),
        )
        .await
        .unwrap_err();

        match err {
            CloudError::Timeout { last_state, .. } => assert_eq!(last_state, "Pending"),
            other => panic!("unexpected error: {other}"),
        }
    }

    type SlowQuery = std::pin::Pin<Box<dyn Future<Output = Result<String>> + Send>>;

    /// Query that takes two seconds to answer
    fn slow_query(calls: Arc<AtomicUsize>) -> impl FnMut() -> SlowQuery {
        move || -> SlowQuery {
            calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Ok("Active".to_string())
            })
        }
    }

    #[tokio::test]
    async fn test_cancellation_interrupts_slow_query() {
        let cancel = CancellationToken::new();
        let spec = WaitSpec::new(&["Pending"], &["Active"], Duration::from_secs(60));

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let calls = Arc::new(AtomicUsize::new(0));
        let started = std::time::Instant::now();
        let err = wait_for_state(&spec, &cancel, slow_query(calls.clone()), |s: &String| {
            s.clone()
        })
        .await
        .unwrap_err();

        assert!(matches!(err, CloudError::Cancelled(_)), "{err}");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_deadline_bounds_slow_query() {
        let spec = WaitSpec::new(&["Pending"], &["Active"], Duration::from_millis(50));

        let started = std::time::Instant::now();
        let err = wait_for_state(
            &spec,
            &CancellationToken::new(),
            slow_query(Arc::new(AtomicUsize::new(0))),
            |s: &String| s.clone(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CloudError::Timeout { .. }), "{err}");
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_cancellation_aborts_wait() {
        let cancel = CancellationToken::new();
        let spec = WaitSpec::new(&["Pending"], &["Active"], Duration::from_secs(60))
            .with_delay(Duration::from_secs(30));

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let calls = Arc::new(AtomicUsize::new(0));
        let started = std::time::Instant::now();
        let err = wait_for_state(
            &spec,
            &cancel,
            scripted(vec!["Pending"], calls.clone()),
            |s: &String| s.clone(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CloudError::Cancelled(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
