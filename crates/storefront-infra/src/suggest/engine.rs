//! Debounced autocomplete over a [`SuggestionSource`].
//!
//! Each input event bumps the state's generation and replaces the single
//! background task. The task sleeps for the debounce period, queries the
//! source, and applies the result only if its generation is still current, so
//! the last keystroke always wins even if an older lookup finishes later.

use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use storefront_core::ErrorKind;
use storefront_core::domain::{
    InputOutcome, NavKey, Suggestion, SuggestionConfig, SuggestionSnapshot, SuggestionState,
};
use storefront_core::ports::{ErrorReport, ErrorReporter, SuggestionSource};

struct Shared {
    state: Mutex<SuggestionState>,
    /// Timer or lookup task. Never held across an await, so `Drop` can
    /// always take it.
    pending: StdMutex<Option<JoinHandle<()>>>,
    source: Arc<dyn SuggestionSource>,
    reporter: Arc<dyn ErrorReporter>,
    config: SuggestionConfig,
}

/// Autocomplete state for one input field.
///
/// Dropping the engine aborts pending work, like [`SuggestionEngine::dispose`].
pub struct SuggestionEngine {
    shared: Arc<Shared>,
}

impl SuggestionEngine {
    pub fn new(
        config: SuggestionConfig,
        source: Arc<dyn SuggestionSource>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(SuggestionState::new()),
                pending: StdMutex::new(None),
                source,
                reporter,
                config,
            }),
        }
    }

    /// Handle a change of the input text.
    pub async fn on_input(&self, query: &str) {
        let mut state = self.shared.state.lock().await;
        self.shared.abort_pending();

        match state.input(query, &self.shared.config) {
            InputOutcome::BelowMinimum => {
                tracing::trace!(len = query.chars().count(), "Query below minimum length");
            }
            InputOutcome::Schedule { generation, query } => {
                let shared = Arc::clone(&self.shared);
                let handle = tokio::spawn(shared.run_lookup(generation, query));
                self.shared.set_pending(handle);
            }
        }
    }

    /// Handle a navigation key. Returns the highlighted suggestion on `Enter`.
    ///
    /// `Escape` also cancels a scheduled lookup when the list is not open yet.
    pub async fn on_key(&self, key: NavKey) -> Option<Suggestion> {
        let mut state = self.shared.state.lock().await;
        let picked = state.key(key);
        if key == NavKey::Escape {
            self.shared.abort_pending();
            state.cancel_pending();
        }
        picked
    }

    /// Close the list on the user's choice and hand the choice back.
    pub async fn select(&self, suggestion: Suggestion) -> Suggestion {
        let mut state = self.shared.state.lock().await;
        self.shared.abort_pending();
        state.select(suggestion)
    }

    /// Close and clear the list, e.g. on blur.
    pub async fn close(&self) {
        let mut state = self.shared.state.lock().await;
        self.shared.abort_pending();
        state.blur();
    }

    /// Cancel any scheduled or in-flight lookup.
    pub async fn dispose(&self) {
        let mut state = self.shared.state.lock().await;
        self.shared.abort_pending();
        state.cancel_pending();
    }

    pub async fn snapshot(&self) -> SuggestionSnapshot {
        self.shared.state.lock().await.snapshot()
    }
}

impl Drop for SuggestionEngine {
    fn drop(&mut self) {
        self.shared.abort_pending();
    }
}

impl Shared {
    fn set_pending(&self, handle: JoinHandle<()>) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    fn abort_pending(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }

    async fn run_lookup(self: Arc<Self>, generation: u64, query: String) {
        tokio::time::sleep(self.config.debounce).await;

        {
            let mut state = self.state.lock().await;
            if !state.begin_lookup(generation, &query) {
                tracing::trace!(query = %query, "Lookup skipped");
                return;
            }
        }

        tracing::debug!(query = %query, generation, "Dispatching suggestion lookup");
        let outcome = self.source.search(&query).await;

        let mut state = self.state.lock().await;
        match outcome {
            Ok(results) => {
                let count = results.len();
                if state.apply_results(generation, results, self.config.max_suggestions) {
                    tracing::debug!(query = %query, results = count, "Suggestions updated");
                } else {
                    tracing::debug!(query = %query, "Discarding stale suggestions");
                }
            }
            Err(e) => {
                state.apply_failure(generation);
                self.reporter.report(
                    ErrorReport::new(ErrorKind::LookupFailed, e.to_string()).with_context(query),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;
    use storefront_core::domain::SuggestionPhase;
    use storefront_core::ports::LookupError;

    /// Source that echoes the query, with optional per-query latency and failures.
    #[derive(Default)]
    struct FakeSource {
        calls: StdMutex<Vec<String>>,
        delays: HashMap<String, Duration>,
        failing: Vec<String>,
    }

    impl FakeSource {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SuggestionSource for FakeSource {
        async fn search(&self, query: &str) -> Result<Vec<Suggestion>, LookupError> {
            self.calls.lock().unwrap().push(query.to_string());
            if let Some(delay) = self.delays.get(query) {
                tokio::time::sleep(*delay).await;
            }
            if self.failing.iter().any(|q| q == query) {
                return Err(LookupError::Backend("catalog offline".to_string()));
            }
            Ok((0..5)
                .map(|i| Suggestion::new(format!("{query}-{i}"), format!("{query} {i}")))
                .collect())
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        reports: StdMutex<Vec<ErrorReport>>,
    }

    impl ErrorReporter for RecordingReporter {
        fn report(&self, report: ErrorReport) {
            self.reports.lock().unwrap().push(report);
        }
    }

    const DEBOUNCE: Duration = Duration::from_millis(300);

    fn engine(source: Arc<FakeSource>, reporter: Arc<RecordingReporter>) -> SuggestionEngine {
        let config = SuggestionConfig::new(2, DEBOUNCE, 3).unwrap();
        SuggestionEngine::new(config, source, reporter)
    }

    async fn settle(by: Duration) {
        tokio::time::sleep(by).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_input_coalesces_into_one_lookup() {
        let source = Arc::new(FakeSource::default());
        let engine = engine(source.clone(), Arc::default());

        engine.on_input("a").await;
        settle(Duration::from_millis(50)).await;
        engine.on_input("ab").await;
        settle(Duration::from_millis(50)).await;
        engine.on_input("abc").await;
        settle(DEBOUNCE * 2).await;

        assert_eq!(source.calls(), ["abc"]);
        let snapshot = engine.snapshot().await;
        assert!(snapshot.is_open);
        assert_eq!(snapshot.suggestions.len(), 3);
        assert_eq!(snapshot.suggestions[0].label, "abc 0");
        assert_eq!(snapshot.selected_index, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_below_minimum_schedules_nothing() {
        let source = Arc::new(FakeSource::default());
        let engine = engine(source.clone(), Arc::default());

        engine.on_input("p").await;
        settle(DEBOUNCE * 2).await;
        assert!(source.calls().is_empty());
        let snapshot = engine.snapshot().await;
        assert!(!snapshot.is_open);
        assert_eq!(snapshot.phase, SuggestionPhase::Idle);

        engine.on_input("pe").await;
        assert_eq!(engine.snapshot().await.phase, SuggestionPhase::Debouncing);
        settle(DEBOUNCE - Duration::from_millis(10)).await;
        assert!(source.calls().is_empty());
        settle(Duration::from_millis(20)).await;
        assert_eq!(source.calls(), ["pe"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_lookup_never_overwrites_newer_result() {
        let source = Arc::new(FakeSource {
            delays: HashMap::from([("ab".to_string(), Duration::from_secs(2))]),
            ..Default::default()
        });
        let engine = engine(source.clone(), Arc::default());

        engine.on_input("ab").await;
        // Let the "ab" lookup start and hang in the source.
        settle(DEBOUNCE + Duration::from_millis(10)).await;
        assert_eq!(source.calls(), ["ab"]);

        engine.on_input("abcd").await;
        settle(DEBOUNCE * 2).await;
        settle(Duration::from_secs(3)).await;

        assert_eq!(source.calls(), ["ab", "abcd"]);
        let snapshot = engine.snapshot().await;
        assert_eq!(snapshot.suggestions[0].label, "abcd 0");
        assert!(snapshot.is_open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_query_is_not_refetched() {
        let source = Arc::new(FakeSource::default());
        let engine = engine(source.clone(), Arc::default());

        engine.on_input("pen").await;
        settle(DEBOUNCE * 2).await;
        engine.on_input("pend").await;
        engine.on_input("pen").await;
        settle(DEBOUNCE * 2).await;

        assert_eq!(source.calls(), ["pen"]);
        assert!(engine.snapshot().await.is_open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retyping_an_interrupted_query_fetches_it_again() {
        let source = Arc::new(FakeSource {
            delays: HashMap::from([("pen".to_string(), Duration::from_millis(500))]),
            ..Default::default()
        });
        let engine = engine(source.clone(), Arc::default());

        engine.on_input("pen").await;
        // "pen" is now waiting on the source.
        settle(DEBOUNCE + Duration::from_millis(50)).await;
        engine.on_input("pend").await;
        engine.on_input("pen").await;
        settle(Duration::from_secs(5)).await;

        assert_eq!(source.calls(), ["pen", "pen"]);
        let snapshot = engine.snapshot().await;
        assert_eq!(snapshot.query, "pen");
        assert!(snapshot.is_open);
        assert_eq!(snapshot.suggestions[0].label, "pen 0");
        assert_eq!(snapshot.phase, SuggestionPhase::Open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_lookup_closes_and_reports() {
        let source = Arc::new(FakeSource {
            failing: vec!["pen".to_string()],
            ..Default::default()
        });
        let reporter = Arc::new(RecordingReporter::default());
        let engine = engine(source, reporter.clone());

        engine.on_input("pen").await;
        settle(DEBOUNCE * 2).await;

        let snapshot = engine.snapshot().await;
        assert!(!snapshot.is_open);
        assert!(snapshot.suggestions.is_empty());

        let reports = reporter.reports.lock().unwrap().clone();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].kind, ErrorKind::LookupFailed);
        assert_eq!(reports[0].context.as_deref(), Some("pen"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_keyboard_selection_flow() {
        let source = Arc::new(FakeSource::default());
        let engine = engine(source, Arc::default());

        engine.on_input("lamp").await;
        settle(DEBOUNCE * 2).await;

        engine.on_key(NavKey::ArrowDown).await;
        engine.on_key(NavKey::ArrowDown).await;
        let picked = engine.on_key(NavKey::Enter).await.unwrap();
        assert_eq!(picked.label, "lamp 1");
        assert_eq!(engine.snapshot().await.selected_index, Some(1));

        let chosen = engine.select(picked).await;
        assert_eq!(chosen.id, "lamp-1");
        let snapshot = engine.snapshot().await;
        assert!(!snapshot.is_open);
        assert!(snapshot.suggestions.is_empty());
        assert_eq!(snapshot.phase, SuggestionPhase::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_escape_cancels_pending_lookup() {
        let source = Arc::new(FakeSource::default());
        let engine = engine(source.clone(), Arc::default());

        engine.on_input("lamp").await;
        settle(DEBOUNCE * 2).await;
        engine.on_input("lamps").await;
        engine.on_key(NavKey::Escape).await;
        settle(DEBOUNCE * 2).await;

        assert_eq!(source.calls(), ["lamp"]);
        assert!(!engine.snapshot().await.is_open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_escape_before_results_returns_to_idle() {
        let source = Arc::new(FakeSource::default());
        let engine = engine(source.clone(), Arc::default());

        engine.on_input("pen").await;
        assert_eq!(engine.snapshot().await.phase, SuggestionPhase::Debouncing);
        engine.on_key(NavKey::Escape).await;
        settle(Duration::from_secs(5)).await;

        assert!(source.calls().is_empty());
        let snapshot = engine.snapshot().await;
        assert!(!snapshot.is_open);
        assert_eq!(snapshot.phase, SuggestionPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_cancels_timer() {
        let source = Arc::new(FakeSource::default());
        let engine = engine(source.clone(), Arc::default());

        engine.on_input("desk").await;
        engine.dispose().await;
        settle(DEBOUNCE * 2).await;

        assert!(source.calls().is_empty());
        assert_eq!(engine.snapshot().await.phase, SuggestionPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_pending_lookup() {
        let source = Arc::new(FakeSource::default());
        let engine = engine(source.clone(), Arc::default());

        engine.on_input("desk").await;
        drop(engine);
        settle(DEBOUNCE * 2).await;

        assert!(source.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_in_flight_lookup() {
        let source = Arc::new(FakeSource {
            delays: HashMap::from([("desk".to_string(), Duration::from_secs(2))]),
            ..Default::default()
        });
        let engine = engine(source.clone(), Arc::default());

        engine.on_input("desk").await;
        settle(DEBOUNCE + Duration::from_millis(10)).await;
        assert_eq!(source.calls(), ["desk"]);

        drop(engine);
        settle(Duration::from_millis(10)).await;

        // The aborted task released the engine's share of the source.
        assert_eq!(Arc::strong_count(&source), 1);
    }
}
