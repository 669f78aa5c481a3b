//! Page-level orchestration: scans, rescans and user-driven sorts.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use unitprice_core::{EngineConfig, UnitKind};

use crate::debounce::{debounce_notices, Debouncer};
use crate::detect::detect_units_on_page;
use crate::label::{label_all_cards, LabeledCard};
use crate::page::Page;
use crate::sort::{sort_options, sort_product_groups, SortOption, SortedGroup};
use crate::{Engine, EngineError};

/// Mutable state carried across scans of one page.
#[derive(Debug, Clone)]
pub struct Session {
    /// Direction the next toggled sort will use.
    pub last_sort_ascending: bool,
    /// Unit kinds found by the latest scan.
    pub units: Vec<UnitKind>,
    pub debouncer: Debouncer,
}

impl Session {
    #[must_use]
    pub fn new(debounce_window: Duration) -> Self {
        Self {
            last_sort_ascending: true,
            units: Vec::new(),
            debouncer: Debouncer::new(debounce_window),
        }
    }
}

/// Result of one detection-and-labeling pass.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub units: Vec<UnitKind>,
    pub labeled: Vec<LabeledCard>,
    pub options: Vec<SortOption>,
}

/// Outcome of a toggled sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOutcome {
    pub ascending: bool,
    pub changed: bool,
}

#[derive(Debug, Clone)]
pub struct Controller {
    engine: Engine,
    session: Session,
}

impl Controller {
    #[must_use]
    pub fn new(engine: Engine, debounce_window: Duration) -> Self {
        Self {
            engine,
            session: Session::new(debounce_window),
        }
    }

    /// Builds a controller from configuration, loading page markers from
    /// `markers_path` when one is set.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if the markers file cannot be loaded.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let engine = Engine::from_config(config)?;
        Ok(Self::new(engine, Duration::from_millis(config.debounce_ms)))
    }

    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// First pass once the page is ready.
    pub fn init(&mut self, page: &mut Page) -> ScanReport {
        self.rescan(page)
    }

    /// Re-detects unit kinds and refreshes every card's labels.
    pub fn rescan(&mut self, page: &mut Page) -> ScanReport {
        scan(&self.engine, &mut self.session.units, page)
    }

    /// Records a page change. Returns `true` when it scheduled a rescan.
    pub fn on_mutation(&mut self, now: Instant) -> bool {
        self.session.debouncer.notify(now)
    }

    /// Runs the scheduled rescan once it is due.
    pub fn tick(&mut self, page: &mut Page, now: Instant) -> Option<ScanReport> {
        if self.session.debouncer.poll(now) {
            Some(self.rescan(page))
        } else {
            None
        }
    }

    /// Rescans `page` for every debounced burst of change notices until the
    /// sender side closes. Returns the number of rescans run.
    ///
    /// Shares the session's debouncer, so a rescan already scheduled through
    /// [`Controller::on_mutation`] fires here too.
    pub async fn watch(&mut self, page: &mut Page, notices: mpsc::Receiver<()>) -> usize {
        let Self { engine, session } = self;
        let Session {
            units, debouncer, ..
        } = session;
        debounce_notices(notices, debouncer, || {
            scan(engine, units, page);
        })
        .await
    }

    /// Sorts every product container by `kind` unit price.
    pub fn sort(&mut self, page: &mut Page, kind: UnitKind, ascending: bool) -> bool {
        self.sort_groups(page, kind, ascending).is_some()
    }

    /// Like [`Controller::sort`], returning the reordered containers.
    pub fn sort_groups(
        &mut self,
        page: &mut Page,
        kind: UnitKind,
        ascending: bool,
    ) -> Option<Vec<SortedGroup>> {
        sort_product_groups(page, kind, ascending, &self.engine)
    }

    /// Sorts in the session's current direction and flips it for the next
    /// call, but only when the sort found products.
    pub fn toggle_sort(&mut self, page: &mut Page, kind: UnitKind) -> SortOutcome {
        let ascending = self.session.last_sort_ascending;
        let changed = self.sort(page, kind, ascending);
        if changed {
            self.session.last_sort_ascending = !ascending;
        }
        SortOutcome { ascending, changed }
    }

    /// Sort menu entries for the unit kinds of the latest scan.
    #[must_use]
    pub fn sort_options(&self) -> Vec<SortOption> {
        sort_options(&self.session.units)
    }
}

fn scan(engine: &Engine, session_units: &mut Vec<UnitKind>, page: &mut Page) -> ScanReport {
    let units = detect_units_on_page(page, engine);
    let labeled = label_all_cards(page, &units, engine);
    let options = sort_options(&units);

    tracing::info!(
        units = ?units,
        labeled = labeled.len(),
        "page scan complete"
    );
    session_units.clone_from(&units);
    ScanReport {
        units,
        labeled,
        options,
    }
}
