//! Request gateway: dispatches provider queries and tracks what is in flight.
//!
//! At most one weather fetch may be outstanding; a second is refused. Searches
//! may overlap, and each is stamped at dispatch so late answers to superseded
//! searches can be recognized and dropped.

use parking_lot::Mutex;
use std::{
    fmt,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{
    diagnostics::Diagnostics,
    location::Location,
    model::{Normalized, WeatherKind, WeatherReport},
    normalize::ResponseNormalizer,
    source::{Query, WeatherSource},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestCategory {
    Search,
    Weather,
}

impl fmt::Display for RequestCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RequestCategory::Search => "search",
            RequestCategory::Weather => "weather",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("a {0} request is already in flight")]
    Busy(RequestCategory),

    #[error("request was cancelled")]
    Cancelled,

    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

/// Dispatch order of a search. Later searches compare greater.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchStamp(u64);

impl SearchStamp {
    /// Stamp that no dispatched search is older than.
    pub const ZERO: SearchStamp = SearchStamp(0);
}

/// Search results tagged with the dispatch stamp of their request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub stamp: SearchStamp,
    pub results: Normalized<Vec<Location>>,
}

pub type WeatherCallback = Box<dyn FnOnce(WeatherReport, Diagnostics) + Send>;
pub type SearchCallback = Box<dyn FnOnce(SearchStamp, Vec<Location>, Diagnostics) + Send>;
pub type FailCallback = Box<dyn FnOnce() + Send>;

#[derive(Debug, Default)]
struct Flags {
    weather_busy: bool,
    searches_in_flight: usize,
    last_stamp: u64,
}

/// Clears its category's busy flag when dropped, whether the request
/// finished, failed, or was abandoned.
#[derive(Debug)]
struct BusyGuard {
    flags: Arc<Mutex<Flags>>,
    category: RequestCategory,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let mut flags = self.flags.lock();
        match self.category {
            RequestCategory::Weather => flags.weather_busy = false,
            RequestCategory::Search => {
                flags.searches_in_flight = flags.searches_in_flight.saturating_sub(1)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RequestGateway {
    source: Arc<dyn WeatherSource>,
    normalizer: ResponseNormalizer,
    flags: Arc<Mutex<Flags>>,
}

impl RequestGateway {
    pub fn new(source: Arc<dyn WeatherSource>, forecast_days: u32) -> Self {
        Self {
            source,
            normalizer: ResponseNormalizer::new(forecast_days),
            flags: Arc::new(Mutex::new(Flags::default())),
        }
    }

    /// No search and no weather fetch outstanding.
    pub fn is_free_to_search(&self) -> bool {
        let flags = self.flags.lock();
        flags.searches_in_flight == 0 && !flags.weather_busy
    }

    /// No weather fetch outstanding.
    pub fn is_free_to_query(&self) -> bool {
        !self.flags.lock().weather_busy
    }

    /// Stamp of the most recently dispatched search.
    pub fn latest_search(&self) -> SearchStamp {
        SearchStamp(self.flags.lock().last_stamp)
    }

    /// Whether a result stamped `stamp` is still the newest one.
    pub fn is_latest(&self, stamp: SearchStamp) -> bool {
        stamp >= self.latest_search()
    }

    fn acquire_weather(&self) -> Result<BusyGuard, GatewayError> {
        let mut flags = self.flags.lock();
        if flags.weather_busy {
            tracing::debug!("weather fetch refused, one is already in flight");
            return Err(GatewayError::Busy(RequestCategory::Weather));
        }
        flags.weather_busy = true;
        Ok(BusyGuard { flags: Arc::clone(&self.flags), category: RequestCategory::Weather })
    }

    fn acquire_search(&self) -> (SearchStamp, BusyGuard) {
        let mut flags = self.flags.lock();
        flags.searches_in_flight += 1;
        flags.last_stamp += 1;
        let stamp = SearchStamp(flags.last_stamp);
        (stamp, BusyGuard { flags: Arc::clone(&self.flags), category: RequestCategory::Search })
    }

    /// Fetch and normalize current conditions (and the forecast, for
    /// [`WeatherKind::Forecast`]) for `location`.
    pub async fn fetch_weather(
        &self,
        kind: WeatherKind,
        location: &Location,
    ) -> Result<Normalized<WeatherReport>, GatewayError> {
        let guard = self.acquire_weather()?;
        self.run_weather(guard, kind, location.search_string()).await
    }

    async fn run_weather(
        &self,
        guard: BusyGuard,
        kind: WeatherKind,
        location: String,
    ) -> Result<Normalized<WeatherReport>, GatewayError> {
        let query = Query::weather(kind, location, self.normalizer.forecast_days());
        let body = self.source.fetch(&query).await;
        drop(guard);

        let body = body.map_err(|err| {
            tracing::warn!(%kind, error = %err, "weather request failed");
            err.context(format!("{kind} weather request failed"))
        })?;

        let normalized = self.normalizer.weather(&body, kind);
        if !normalized.is_clean() {
            tracing::info!(
                %kind,
                missing = normalized.diagnostics.len(),
                "weather response had gaps"
            );
        }
        Ok(normalized)
    }

    /// Dispatch a location search. The stamp is taken now, before the
    /// returned future is first polled.
    pub fn search(&self, text: &str) -> PendingSearch {
        let (stamp, guard) = self.acquire_search();
        let source = Arc::clone(&self.source);
        let normalizer = self.normalizer;
        let query = Query::search(text);

        tracing::debug!(?stamp, "search dispatched");

        let inner = Box::pin(async move {
            let body = source.fetch(&query).await;
            drop(guard);

            let body = body.map_err(|err| {
                tracing::warn!(error = %err, "search request failed");
                err.context("search request failed")
            })?;
            Ok::<_, GatewayError>(normalizer.search(&body))
        });

        PendingSearch { stamp, inner }
    }

    /// Callback form of [`fetch_weather`](Self::fetch_weather). Returns
    /// `None` when refused because a weather fetch is already in flight.
    pub fn dispatch_weather(
        &self,
        kind: WeatherKind,
        location: &Location,
        on_success: Option<WeatherCallback>,
        on_fail: Option<FailCallback>,
    ) -> Option<JoinHandle<()>> {
        let guard = self.acquire_weather().ok()?;
        let gateway = self.clone();
        let location = location.search_string();

        Some(tokio::spawn(async move {
            match gateway.run_weather(guard, kind, location).await {
                Ok(normalized) => match on_success {
                    Some(cb) => cb(normalized.data, normalized.diagnostics),
                    None => tracing::warn!(%kind, "no success callback, dropping weather result"),
                },
                Err(_) => match on_fail {
                    Some(cb) => cb(),
                    None => tracing::warn!(%kind, "no failure callback, dropping weather failure"),
                },
            }
        }))
    }

    /// Callback form of [`search`](Self::search).
    pub fn dispatch_search(
        &self,
        text: &str,
        on_result: Option<SearchCallback>,
        on_fail: Option<FailCallback>,
    ) -> (SearchStamp, JoinHandle<()>) {
        let pending = self.search(text);
        let stamp = pending.stamp();

        let handle = tokio::spawn(async move {
            match pending.await {
                Ok(outcome) => match on_result {
                    Some(cb) => {
                        cb(outcome.stamp, outcome.results.data, outcome.results.diagnostics)
                    }
                    None => tracing::warn!("no result callback, dropping search result"),
                },
                Err(_) => match on_fail {
                    Some(cb) => cb(),
                    None => tracing::warn!("no failure callback, dropping search failure"),
                },
            }
        });

        (stamp, handle)
    }
}

type SearchFuture =
    Pin<Box<dyn Future<Output = Result<Normalized<Vec<Location>>, GatewayError>> + Send>>;

/// A dispatched search. Await it for the [`SearchOutcome`]; drop it to
/// abandon the request.
pub struct PendingSearch {
    stamp: SearchStamp,
    inner: SearchFuture,
}

impl PendingSearch {
    pub fn stamp(&self) -> SearchStamp {
        self.stamp
    }
}

impl fmt::Debug for PendingSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingSearch").field("stamp", &self.stamp).finish_non_exhaustive()
    }
}

impl Future for PendingSearch {
    type Output = Result<SearchOutcome, GatewayError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let stamp = self.stamp;
        self.inner
            .as_mut()
            .poll(cx)
            .map(|res| res.map(|results| SearchOutcome { stamp, results }))
    }
}

/// Run `request` unless `cancel` fires first. A cancelled request is
/// dropped, which also releases its busy flag.
pub async fn cancellable<T, F>(request: F, cancel: &CancellationToken) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    tokio::select! {
        _ = cancel.cancelled() => Err(GatewayError::Cancelled),
        res = request => res,
    }
}
