// Search session: owns the current criteria, page and result slot, and makes
// sure only the most recently issued request may publish its results.

use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tokio::sync::RwLock;

use crate::{
    filters::{FilterCriteria, FilterError, FilterOverride},
    listing_api::ListingApi,
    models::SearchPage,
    presenter::{PageItem, page_window, sort_listings},
};

/// Snapshot of what the result view renders.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    pub criteria: FilterCriteria,
    pub page: u32,
    pub results: SearchPage,
    pub loading: bool,
    pub error: Option<String>,
}

impl SearchState {
    pub fn page_window(&self) -> Vec<PageItem> {
        page_window(self.page, self.results.total_pages)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    // A newer request was issued while this one was in flight; its response was dropped
    Stale,
}

#[derive(Clone)]
pub struct SearchSession {
    api: ListingApi,
    per_page: u32,
    generation: Arc<AtomicU64>,
    state: Arc<RwLock<SearchState>>,
}

impl SearchSession {
    pub fn new(api: ListingApi, per_page: u32) -> Self {
        let state = SearchState { page: 1, ..Default::default() };
        SearchSession {
            api,
            per_page: per_page.max(1),
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Starts from the defaults with a caller-supplied partial override applied.
    pub async fn seed(&self, overrides: FilterOverride) -> Result<(), FilterError> {
        let mut criteria = FilterCriteria::default();
        criteria.apply_override(overrides)?;
        criteria.validate()?;
        let mut state = self.state.write().await;
        state.criteria = criteria;
        state.page = 1;
        Ok(())
    }

    pub async fn snapshot(&self) -> SearchState {
        self.state.read().await.clone()
    }

    /// Replaces the criteria, returns to page 1 and re-fetches. A change of
    /// `sort_by` alone while page 1 is on screen only re-sorts it.
    pub async fn set_criteria(&self, criteria: FilterCriteria) -> Result<RefreshOutcome, FilterError> {
        criteria.validate()?;
        {
            let mut state = self.state.write().await;
            let only_sort_changed = FilterCriteria { sort_by: criteria.sort_by, ..state.criteria.clone() } == criteria
                && state.criteria.sort_by != criteria.sort_by;
            let first_page_shown = state.page == 1;
            state.criteria = criteria;
            state.page = 1;
            if only_sort_changed && first_page_shown {
                let sort_by = state.criteria.sort_by;
                sort_listings(&mut state.results.cars, sort_by);
                return Ok(RefreshOutcome::Applied);
            }
        }
        Ok(self.refresh().await)
    }

    /// Resets the criteria to the defaults and re-fetches.
    pub async fn reset(&self) -> RefreshOutcome {
        {
            let mut state = self.state.write().await;
            state.criteria.reset();
            state.page = 1;
        }
        self.refresh().await
    }

    pub async fn set_page(&self, page: u32) -> RefreshOutcome {
        self.state.write().await.page = page.max(1);
        self.refresh().await
    }

    /// Fetches the current page. A failure clears the results rather than
    /// leaving the previous ones on screen.
    pub async fn refresh(&self) -> RefreshOutcome {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (criteria, page) = {
            let mut state = self.state.write().await;
            state.loading = true;
            (state.criteria.clone(), state.page)
        };

        let result = self.api.search(&criteria, page, self.per_page).await;

        let mut state = self.state.write().await;
        if self.generation.load(Ordering::SeqCst) != token {
            tracing::debug!(token, "Discarding stale search response");
            return RefreshOutcome::Stale;
        }

        state.loading = false;
        match result {
            Ok(mut results) => {
                // The sort may have changed while the request was in flight
                sort_listings(&mut results.cars, state.criteria.sort_by);
                state.results = results;
                state.error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, page, "Search failed");
                state.results = SearchPage::default();
                state.error = Some(e.user_message());
            }
        }
        RefreshOutcome::Applied
    }
}
