//! Catalog controller: load, filter, render.

use meditation_types::MeditationItem;

use crate::error::ClientError;
use crate::server_api::MeditationApi;
use crate::session::SessionContext;
use crate::view::{Card, CatalogView, Notifier};

/// Active catalog filters. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub category: Option<String>,
    pub duration: Option<u32>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.duration.is_none()
    }

    fn matches(&self, item: &MeditationItem) -> bool {
        self.category
            .as_deref()
            .is_none_or(|category| item.category == category)
            && self.duration.is_none_or(|minutes| item.duration == minutes)
    }
}

/// Items of `list` that pass `filter`, in their original order.
pub fn apply_filters(list: &[MeditationItem], filter: &FilterState) -> Vec<MeditationItem> {
    list.iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect()
}

pub struct CatalogController<V> {
    view: V,
    filter: FilterState,
}

impl<V: CatalogView> CatalogController<V> {
    pub fn new(view: V) -> Self {
        Self::with_filter(view, FilterState::default())
    }

    /// Start with `filter` already selected; the next load renders through it.
    pub fn with_filter(view: V, filter: FilterState) -> Self {
        Self { view, filter }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Fetch the full catalog, cache it on the session, and render it.
    ///
    /// On failure the previously cached list stays on screen.
    pub fn load(
        &mut self,
        session: &mut SessionContext,
        api: &dyn MeditationApi,
        notifier: &mut dyn Notifier,
    ) -> Result<usize, ClientError> {
        notifier.set_loading(true);
        let result = api.list_meditations(&FilterState::default());
        notifier.set_loading(false);
        match result {
            Ok(items) => {
                tracing::debug!(count = items.len(), "catalog loaded");
                let count = items.len();
                session.set_catalog(items);
                self.render(&apply_filters(session.catalog(), &self.filter));
                Ok(count)
            }
            Err(err) => {
                tracing::warn!(error = %err, "catalog load failed");
                session.report_failure(notifier, &err);
                Err(err)
            }
        }
    }

    /// Recompute the visible list from the cached catalog.
    pub fn on_filter_change(&mut self, session: &SessionContext, filter: FilterState) {
        self.filter = filter;
        self.render(&apply_filters(session.catalog(), &self.filter));
    }

    /// Draw `list`, or the empty state when there is nothing to show.
    pub fn render(&mut self, list: &[MeditationItem]) {
        self.view.clear_grid();
        if list.is_empty() {
            self.view.set_empty_state(true);
            return;
        }
        self.view.set_empty_state(false);
        self.view.show_cards(list.iter().map(Card::from).collect());
    }

    /// Look up a cached item for the player.
    pub fn select<'a>(&self, session: &'a SessionContext, id: i64) -> Option<&'a MeditationItem> {
        session.catalog().iter().find(|item| item.id == id)
    }
}
