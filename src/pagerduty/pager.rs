//! Lazy, offset-driven pagination over one query window

use crate::config::PaginationConfig;
use crate::error::{AppError, Result};
use crate::models::{DateWindow, Incident};
use crate::pagerduty::IncidentSource;
use futures::stream::{self, Stream, TryStreamExt};
use tracing::{debug, warn};

/// Drains every page of one window from an [`IncidentSource`].
///
/// Each call to [`IncidentPager::incidents`] starts again at offset 0.
/// The sequence ends when a page reports `more = false` or when the next
/// offset would reach the configured cap; no request is made at or past
/// the cap. A pacing delay precedes every request.
pub struct IncidentPager<'a, S: IncidentSource + ?Sized> {
    source: &'a S,
    window: DateWindow,
    settings: &'a PaginationConfig,
}

impl<'a, S: IncidentSource + ?Sized> IncidentPager<'a, S> {
    pub fn new(source: &'a S, window: DateWindow, settings: &'a PaginationConfig) -> Self {
        Self {
            source,
            window,
            settings,
        }
    }

    /// Stream of pages, as incident batches
    pub fn pages(&self) -> impl Stream<Item = Result<Vec<Incident>>> + 'a {
        let source = self.source;
        let window = self.window;
        let settings = self.settings;

        stream::try_unfold(Some(0u32), move |next_offset| {
            next_page(source, window, settings, next_offset)
        })
    }

    /// Stream of individual incidents across all pages
    pub fn incidents(&self) -> impl Stream<Item = Result<Incident>> + 'a {
        self.pages()
            .map_ok(|batch| stream::iter(batch.into_iter().map(Ok::<_, AppError>)))
            .try_flatten()
    }

    /// Drain the window into memory
    pub async fn collect_all(&self) -> Result<Vec<Incident>> {
        self.incidents().try_collect().await
    }
}

/// One unfold step: the batch at `next_offset` and the offset after it
async fn next_page<S: IncidentSource + ?Sized>(
    source: &S,
    window: DateWindow,
    settings: &PaginationConfig,
    next_offset: Option<u32>,
) -> Result<Option<(Vec<Incident>, Option<u32>)>> {
    let Some(offset) = next_offset else {
        return Ok(None);
    };

    if offset >= settings.max_offset {
        warn!(
            offset,
            max_offset = settings.max_offset,
            since = %window.since_param(),
            "Offset reached the maximum allowed, not querying further"
        );
        return Ok(None);
    }

    let delay = settings.request_delay();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    debug!(offset, "Requesting incident page");
    let page = source.fetch_page(&window, offset, settings.page_size).await?;

    let next = page
        .more
        .then(|| offset.saturating_add(settings.page_size));
    Ok(Some((page.incidents, next)))
}
