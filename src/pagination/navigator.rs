//! Page navigation state machine shared by both query modes.
//!
//! Every transition happens in three steps: plan (decide what to fetch and
//! stamp the request with an id), fetch (through [`QueryEngine`]), apply
//! (commit the response). Nothing changes until `apply`, so a failed fetch
//! leaves the navigator exactly where it was, and a response for a request
//! that has since been superseded is dropped.

use super::token::{Cursor, LocalPageMarker, PageToken};
use crate::error::AppError;
use crate::index::{QueryEngine, QueryMode, QueryPage, QueryParams};
use crate::model::Entry;
use std::collections::BTreeMap;
use std::fmt;

/// Monotonic stamp of a planned transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Reset,
    Next,
    Previous,
    GoTo(usize),
}

/// A planned fetch, to be executed and handed back to
/// [`PageNavigator::apply`].
#[derive(Debug, Clone)]
pub struct PageRequest {
    id: RequestId,
    pub transition: Transition,
    /// Page number the response will become.
    pub page: usize,
    pub token: Option<PageToken>,
    pub params: QueryParams,
}

impl PageRequest {
    pub fn id(&self) -> RequestId {
        self.id
    }
}

/// A go-to-page the cursor model cannot satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnreachablePage {
    pub requested: usize,
    /// Highest page reachable from the current state.
    pub frontier: usize,
}

impl fmt::Display for UnreachablePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "page {} has not been reached yet (furthest reachable page is {})",
            self.requested, self.frontier
        )
    }
}

#[derive(Debug, Clone)]
pub enum NavigationPlan {
    Fetch(PageRequest),
    /// Nothing to do: already at the boundary, or nothing loaded yet.
    NoOp,
    Unreachable(UnreachablePage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied { page: usize },
    Superseded { request: RequestId, latest: RequestId },
}

/// Result of a complete plan-fetch-apply round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Moved { page: usize },
    NoOp,
    Unreachable(UnreachablePage),
    Superseded,
}

/// Uniform "current page" view over cursor and local pagination.
#[derive(Debug, Clone)]
pub struct PageNavigator {
    params: QueryParams,
    current_page: usize,
    page_map: BTreeMap<usize, Option<PageToken>>,
    back_stack: Vec<Option<Cursor>>,
    next_token: Option<PageToken>,
    total_matched: Option<usize>,
    entries: Vec<Entry>,
    loaded: bool,
    latest_request: u64,
}

impl PageNavigator {
    pub fn new(params: QueryParams) -> Self {
        Self {
            params,
            current_page: 1,
            page_map: initial_page_map(),
            back_stack: Vec::new(),
            next_token: None,
            total_matched: None,
            entries: Vec::new(),
            loaded: false,
            latest_request: 0,
        }
    }

    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    pub fn mode(&self) -> QueryMode {
        self.params.mode
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Known token for `page`; page 1 is always `Some(None)`.
    pub fn page_token(&self, page: usize) -> Option<Option<&PageToken>> {
        self.page_map.get(&page).map(Option::as_ref)
    }

    /// Cursors for pages `1..current_page` in remote mode; `None` is page 1.
    pub fn back_stack(&self) -> &[Option<Cursor>] {
        &self.back_stack
    }

    pub fn next_token(&self) -> Option<&PageToken> {
        self.next_token.as_ref()
    }

    /// Size of the full matching set, local mode only.
    pub fn total_matched(&self) -> Option<usize> {
        self.total_matched
    }

    /// Number of pages in the local result set (at least 1).
    pub fn total_pages(&self) -> Option<usize> {
        let size = self.params.page_size.as_usize();
        self.total_matched
            .map(|total| total.div_ceil(size).max(1))
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn has_next(&self) -> bool {
        match self.params.mode {
            QueryMode::Local => self
                .total_pages()
                .is_some_and(|total| self.current_page < total),
            QueryMode::Remote => self.next_token.is_some(),
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    /// Plans page 1 of a new query.
    ///
    /// The navigator keeps showing the old query until the response is
    /// applied; applying it resets the page map and back stack.
    pub fn set_query(&mut self, params: QueryParams) -> PageRequest {
        if params != self.params {
            log::debug!(
                "Query changed ({} mode, search '{}'), resetting to page 1",
                params.mode,
                params.search
            );
        }
        self.issue_with(params, Transition::Reset, 1, None)
    }

    /// Re-fetches page 1 of the current query.
    pub fn plan_reload(&mut self) -> PageRequest {
        self.issue(Transition::Reset, 1, None)
    }

    pub fn plan_next(&mut self) -> NavigationPlan {
        if !self.loaded || !self.has_next() {
            return NavigationPlan::NoOp;
        }
        let page = self.current_page + 1;
        let token = match self.params.mode {
            QueryMode::Local => LocalPageMarker::for_page(page).map(PageToken::LocalPage),
            QueryMode::Remote => self.next_token.clone(),
        };
        NavigationPlan::Fetch(self.issue(Transition::Next, page, token))
    }

    pub fn plan_previous(&mut self) -> NavigationPlan {
        if !self.has_previous() {
            return NavigationPlan::NoOp;
        }
        let page = self.current_page - 1;
        let token = match self.params.mode {
            QueryMode::Local => LocalPageMarker::for_page(page).map(PageToken::LocalPage),
            QueryMode::Remote => match self.back_stack.last() {
                Some(cursor) => cursor.clone().map(PageToken::Cursor),
                None => return NavigationPlan::NoOp,
            },
        };
        NavigationPlan::Fetch(self.issue(Transition::Previous, page, token))
    }

    pub fn plan_go_to(&mut self, page: usize) -> NavigationPlan {
        if page == 0 {
            return NavigationPlan::Unreachable(UnreachablePage {
                requested: page,
                frontier: self.frontier(),
            });
        }
        match self.params.mode {
            QueryMode::Local => {
                let last = self.total_pages().unwrap_or(1);
                let target = page.clamp(1, last);
                let token = LocalPageMarker::for_page(target).map(PageToken::LocalPage);
                NavigationPlan::Fetch(self.issue(Transition::GoTo(page), target, token))
            }
            QueryMode::Remote => {
                if page == 1 {
                    return NavigationPlan::Fetch(self.issue(Transition::GoTo(1), 1, None));
                }
                if let Some(token) = self.page_map.get(&page).cloned() {
                    return NavigationPlan::Fetch(self.issue(Transition::GoTo(page), page, token));
                }
                if page == self.current_page + 1 && self.next_token.is_some() {
                    let token = self.next_token.clone();
                    return NavigationPlan::Fetch(self.issue(Transition::GoTo(page), page, token));
                }
                NavigationPlan::Unreachable(UnreachablePage {
                    requested: page,
                    frontier: self.frontier(),
                })
            }
        }
    }

    fn frontier(&self) -> usize {
        let known = self.page_map.keys().next_back().copied().unwrap_or(1);
        let reachable = if self.next_token.is_some() {
            self.current_page + 1
        } else {
            self.current_page
        };
        match self.params.mode {
            QueryMode::Local => self.total_pages().unwrap_or(1),
            QueryMode::Remote => known.max(reachable),
        }
    }

    fn issue(&mut self, transition: Transition, page: usize, token: Option<PageToken>) -> PageRequest {
        let params = self.params.clone();
        self.issue_with(params, transition, page, token)
    }

    fn issue_with(
        &mut self,
        params: QueryParams,
        transition: Transition,
        page: usize,
        token: Option<PageToken>,
    ) -> PageRequest {
        self.latest_request += 1;
        PageRequest {
            id: RequestId(self.latest_request),
            transition,
            page,
            token,
            params,
        }
    }

    /// Commits a fetched page, unless a newer request was planned since.
    pub fn apply(&mut self, request: PageRequest, result: QueryPage) -> ApplyOutcome {
        let latest = RequestId(self.latest_request);
        if request.id != latest {
            log::debug!(
                "Discarding response for superseded request {} (latest is {})",
                request.id,
                latest
            );
            return ApplyOutcome::Superseded {
                request: request.id,
                latest,
            };
        }

        let PageRequest {
            page,
            token,
            params,
            ..
        } = request;
        self.params = params;
        if page == 1 {
            self.page_map = initial_page_map();
        } else {
            self.page_map.insert(page, token);
        }

        self.back_stack = match self.params.mode {
            QueryMode::Remote => (1..page)
                .map(|p| {
                    self.page_map
                        .get(&p)
                        .and_then(|token| token.as_ref())
                        .and_then(PageToken::as_cursor)
                        .cloned()
                })
                .collect(),
            QueryMode::Local => Vec::new(),
        };

        self.current_page = page;
        self.next_token = result.next;
        self.total_matched = result.total_matched;
        self.entries = result.entries;
        self.loaded = true;

        log::debug!(
            "Now on page {} ({} entries, has next: {})",
            page,
            self.entries.len(),
            self.has_next()
        );
        ApplyOutcome::Applied { page }
    }

    /// Executes a planned request against `engine` and applies the result.
    ///
    /// On error the navigator is unchanged.
    pub async fn execute(
        &mut self,
        engine: &mut QueryEngine,
        request: PageRequest,
    ) -> Result<NavigationOutcome, AppError> {
        let result = engine.query(&request.params, request.token.as_ref()).await?;
        Ok(match self.apply(request, result) {
            ApplyOutcome::Applied { page } => NavigationOutcome::Moved { page },
            ApplyOutcome::Superseded { .. } => NavigationOutcome::Superseded,
        })
    }

    async fn run(
        &mut self,
        engine: &mut QueryEngine,
        plan: NavigationPlan,
    ) -> Result<NavigationOutcome, AppError> {
        match plan {
            NavigationPlan::Fetch(request) => self.execute(engine, request).await,
            NavigationPlan::NoOp => Ok(NavigationOutcome::NoOp),
            NavigationPlan::Unreachable(unreachable) => {
                Ok(NavigationOutcome::Unreachable(unreachable))
            }
        }
    }

    /// Sets a new query and loads its first page.
    pub async fn change_query(
        &mut self,
        engine: &mut QueryEngine,
        params: QueryParams,
    ) -> Result<NavigationOutcome, AppError> {
        let request = self.set_query(params);
        self.execute(engine, request).await
    }

    /// Loads page 1 of the current query.
    pub async fn load(&mut self, engine: &mut QueryEngine) -> Result<NavigationOutcome, AppError> {
        let request = self.plan_reload();
        self.execute(engine, request).await
    }

    pub async fn next(&mut self, engine: &mut QueryEngine) -> Result<NavigationOutcome, AppError> {
        let plan = self.plan_next();
        self.run(engine, plan).await
    }

    pub async fn previous(
        &mut self,
        engine: &mut QueryEngine,
    ) -> Result<NavigationOutcome, AppError> {
        let plan = self.plan_previous();
        self.run(engine, plan).await
    }

    pub async fn go_to_page(
        &mut self,
        engine: &mut QueryEngine,
        page: usize,
    ) -> Result<NavigationOutcome, AppError> {
        let plan = self.plan_go_to(page);
        self.run(engine, plan).await
    }
}

fn initial_page_map() -> BTreeMap<usize, Option<PageToken>> {
    BTreeMap::from([(1, None)])
}
