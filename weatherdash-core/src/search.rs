//! Search-box state: the visible result list and the typing debounce.

use std::{future::Future, time::Duration};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    diagnostics::Diagnostics,
    gateway::{SearchOutcome, SearchStamp},
    location::Location,
};

/// What the list shows in place of (or above) its options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// Query too short to send.
    TooShort,
    Searching,
    Results,
    NoResults,
    Failed,
}

impl SearchStatus {
    pub fn message(self) -> Option<&'static str> {
        match self {
            SearchStatus::TooShort => Some("Type in more than 3 characters."),
            SearchStatus::Searching => Some("...Searching for cities."),
            SearchStatus::Results => None,
            SearchStatus::NoResults => Some("No cities found with that name."),
            SearchStatus::Failed => Some("Cannot Contact Server."),
        }
    }
}

/// Whether `text` is long enough to be sent as a search.
pub fn is_searchable(text: &str, min_chars: usize) -> bool {
    text.trim().chars().count() >= min_chars
}

/// Options currently offered to the user.
///
/// Only results stamped at or after the latest [`begin`](Self::begin) are
/// applied, so an earlier search that answers late cannot replace the list.
#[derive(Debug, Clone)]
pub struct SearchList {
    latest: SearchStamp,
    options: Vec<Location>,
    diagnostics: Diagnostics,
    status: SearchStatus,
}

impl Default for SearchList {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchList {
    pub fn new() -> Self {
        Self {
            latest: SearchStamp::ZERO,
            options: Vec::new(),
            diagnostics: Diagnostics::new(),
            status: SearchStatus::TooShort,
        }
    }

    /// Clear the list for a newly dispatched search.
    pub fn begin(&mut self, stamp: SearchStamp) {
        self.latest = self.latest.max(stamp);
        self.options.clear();
        self.diagnostics = Diagnostics::new();
        self.status = SearchStatus::Searching;
    }

    /// Reset to the "type more" state, e.g. when the query got too short.
    pub fn reset(&mut self) {
        self.options.clear();
        self.diagnostics = Diagnostics::new();
        self.status = SearchStatus::TooShort;
    }

    /// Replace the options with `outcome` unless a newer search was begun.
    /// Returns whether the outcome was applied.
    pub fn apply(&mut self, outcome: SearchOutcome) -> bool {
        if outcome.stamp < self.latest {
            tracing::debug!(
                stamp = ?outcome.stamp,
                latest = ?self.latest,
                "discarding stale search result"
            );
            return false;
        }

        self.latest = outcome.stamp;
        self.options = outcome.results.data;
        self.diagnostics = outcome.results.diagnostics;
        self.status =
            if self.options.is_empty() { SearchStatus::NoResults } else { SearchStatus::Results };
        true
    }

    /// Mark the search stamped `stamp` as failed, if it is still the latest.
    pub fn fail(&mut self, stamp: SearchStamp) -> bool {
        if stamp < self.latest {
            return false;
        }
        self.options.clear();
        self.status = SearchStatus::Failed;
        true
    }

    pub fn options(&self) -> &[Location] {
        &self.options
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn status(&self) -> SearchStatus {
        self.status
    }
}

/// Delays an action until input has been quiet for a fixed period.
/// Triggering again cancels the pending run and restarts the wait.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    pending: Option<CancellationToken>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, pending: None }
    }

    /// Schedule `action`. The handle resolves to `true` if the action ran,
    /// `false` if a later trigger (or [`cancel`](Self::cancel)) superseded it.
    pub fn trigger<F>(&mut self, action: F) -> JoinHandle<bool>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let token = CancellationToken::new();
        self.pending = Some(token.clone());
        let quiet = self.quiet;

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => false,
                _ = tokio::time::sleep(quiet) => {
                    action.await;
                    true
                }
            }
        })
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gateway::RequestGateway, model::Normalized, normalize::NO_CITIES,
        source::fixture::FixtureSource,
    };
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    fn outcome(stamp: SearchStamp, names: &[&str]) -> SearchOutcome {
        let data = names.iter().map(|n| Location::new(*n, "", "")).collect();
        SearchOutcome { stamp, results: Normalized::new(data, Diagnostics::new()) }
    }

    /// Stamps of `n` searches dispatched (and immediately abandoned) in order.
    fn stamps(n: usize) -> Vec<SearchStamp> {
        let gw = RequestGateway::new(Arc::new(FixtureSource::new()), 2);
        (0..n).map(|_| gw.search("x").stamp()).collect()
    }

    #[test]
    fn short_queries_are_not_searchable() {
        assert!(!is_searchable("pa", 3));
        assert!(!is_searchable("  pa  ", 3));
        assert!(is_searchable("par", 3));
        assert!(is_searchable("Zürich", 3));
    }

    #[test]
    fn new_list_asks_for_more_input() {
        let list = SearchList::new();
        assert_eq!(list.status(), SearchStatus::TooShort);
        assert_eq!(list.status().message(), Some("Type in more than 3 characters."));
        assert!(list.options().is_empty());
    }

    #[test]
    fn later_outcome_wins_regardless_of_arrival() {
        let s = stamps(2);
        let mut list = SearchList::new();
        list.begin(s[0]);
        list.begin(s[1]);
        assert_eq!(list.status(), SearchStatus::Searching);

        assert!(list.apply(outcome(s[1], &["Paris"])));
        assert!(!list.apply(outcome(s[0], &["Portland", "Porto"])));

        assert_eq!(list.options().len(), 1);
        assert_eq!(list.status(), SearchStatus::Results);
    }

    #[test]
    fn in_order_outcomes_both_apply() {
        let s = stamps(2);
        let mut list = SearchList::new();

        list.begin(s[0]);
        assert!(list.apply(outcome(s[0], &["Po"])));
        list.begin(s[1]);
        assert!(list.apply(outcome(s[1], &["Portland", "Porto"])));
        assert_eq!(list.options().len(), 2);
    }

    #[test]
    fn empty_outcome_shows_no_results() {
        let s = stamps(1);
        let mut list = SearchList::new();
        list.begin(s[0]);

        let mut diagnostics = Diagnostics::new();
        diagnostics.push(NO_CITIES);
        let applied = list.apply(SearchOutcome {
            stamp: s[0],
            results: Normalized::new(Vec::new(), diagnostics),
        });

        assert!(applied);
        assert_eq!(list.status(), SearchStatus::NoResults);
        assert!(list.diagnostics().contains(NO_CITIES));
    }

    #[test]
    fn only_latest_failure_is_shown() {
        let s = stamps(2);
        let mut list = SearchList::new();
        list.begin(s[0]);
        list.begin(s[1]);

        assert!(!list.fail(s[0]));
        assert_eq!(list.status(), SearchStatus::Searching);
        assert!(list.fail(s[1]));
        assert_eq!(list.status().message(), Some("Cannot Contact Server."));

        list.reset();
        assert_eq!(list.status(), SearchStatus::TooShort);
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_runs_only_last_trigger() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(500));

        let bump = |runs: &Arc<AtomicUsize>| {
            let runs = Arc::clone(runs);
            async move {
                runs.fetch_add(1, Ordering::SeqCst);
            }
        };

        let first = debouncer.trigger(bump(&runs));
        tokio::time::sleep(Duration::from_millis(300)).await;
        let second = debouncer.trigger(bump(&runs));
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        assert!(!first.await.unwrap());
        assert!(second.await.unwrap());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_run() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(500));

        let handle = debouncer.trigger({
            let runs = Arc::clone(&runs);
            async move {
                runs.fetch_add(1, Ordering::SeqCst);
            }
        });
        debouncer.cancel();

        assert!(!handle.await.unwrap());
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
