//! One mapping session: the store, the active strategies and the report view.
//!
//! Analysis runs on a snapshot taken when the report view opens. A result is
//! applied only while the view that asked for it is still open; a result that
//! arrives after the view was closed (or reopened) is dropped.

use tracing::{debug, info};
use uuid::Uuid;

use crate::analysis::AnalysisResult;
use crate::conditions::ConditionKey;
use crate::config::{build_session_strategies, ConfigError, MapperConfig, Strategies};
use crate::report::{build_report, SystemsReport};
use crate::store::{Initiative, InitiativeId, InitiativeStore, Origin};
use crate::suggestions;

/// State of the report view.
#[derive(Debug, Clone, Default)]
pub enum ReportView {
    #[default]
    Closed,
    Loading,
    Ready(SystemsReport),
}

/// Handle for one in-flight analysis, issued by [`MapperSession::open_report`].
#[derive(Debug)]
pub struct ReportTicket {
    generation: u64,
    snapshot: Vec<Initiative>,
}

impl ReportTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshot(&self) -> &[Initiative] {
        &self.snapshot
    }
}

pub struct MapperSession {
    id: Uuid,
    store: InitiativeStore,
    strategies: Strategies,
    view: ReportView,
    generation: u64,
}

impl MapperSession {
    pub fn new(strategies: Strategies) -> Self {
        Self::with_id(Uuid::new_v4(), strategies)
    }

    /// Session whose remote requests carry this session's id.
    pub fn from_config(config: &MapperConfig) -> Result<Self, ConfigError> {
        let id = Uuid::new_v4();
        let strategies = build_session_strategies(config, id)?;
        Ok(Self::with_id(id, strategies))
    }

    fn with_id(id: Uuid, strategies: Strategies) -> Self {
        Self {
            id,
            store: InitiativeStore::new(),
            strategies,
            view: ReportView::Closed,
            generation: 0,
        }
    }

    /// Session with the offline strategies.
    pub fn offline() -> Self {
        Self::new(Strategies::offline())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn store(&self) -> &InitiativeStore {
        &self.store
    }

    pub fn strategies(&self) -> &Strategies {
        &self.strategies
    }

    pub fn add_initiative(&mut self, condition: ConditionKey, text: &str) -> Option<Initiative> {
        self.store.add(condition, text, Origin::User)
    }

    pub fn remove_initiative(&mut self, id: InitiativeId) -> bool {
        self.store.remove(id)
    }

    pub async fn suggest(&self, condition: ConditionKey) -> Vec<String> {
        self.strategies.suggestions.suggest(condition).await
    }

    pub fn accept_suggestions<I, S>(&mut self, condition: ConditionKey, accepted: I) -> Vec<Initiative>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        suggestions::accept_suggestions(&mut self.store, condition, accepted)
    }

    pub fn view(&self) -> &ReportView {
        &self.view
    }

    pub fn report(&self) -> Option<&SystemsReport> {
        match &self.view {
            ReportView::Ready(report) => Some(report),
            _ => None,
        }
    }

    /// Open the report view and capture the snapshot to analyze.
    pub fn open_report(&mut self) -> ReportTicket {
        self.generation += 1;
        self.view = ReportView::Loading;
        ReportTicket {
            generation: self.generation,
            snapshot: self.store.snapshot(),
        }
    }

    /// Apply a finished analysis. Returns false if the ticket is stale.
    pub fn complete_report(&mut self, ticket: ReportTicket, result: AnalysisResult) -> bool {
        let current = ticket.generation == self.generation
            && matches!(self.view, ReportView::Loading);
        if !current {
            debug!(
                session = %self.id,
                ticket = ticket.generation,
                generation = self.generation,
                "dropping stale analysis result"
            );
            return false;
        }
        self.view = ReportView::Ready(build_report(&ticket.snapshot, &result));
        true
    }

    pub fn close_report(&mut self) {
        self.generation += 1;
        self.view = ReportView::Closed;
    }

    /// Open, analyze and complete in one step.
    pub async fn run_report(&mut self) -> Option<&SystemsReport> {
        let ticket = self.open_report();
        let analyzer = self.strategies.analyzer.clone();
        debug!(
            session = %self.id,
            strategy = analyzer.name(),
            initiatives = ticket.snapshot.len(),
            "running analysis"
        );
        let result = analyzer.analyze(ticket.snapshot()).await;
        self.complete_report(ticket, result);
        self.report()
    }

    /// Clear every initiative and close the report view.
    pub fn reset(&mut self) {
        let cleared = self.store.len();
        self.store.clear();
        self.close_report();
        info!(session = %self.id, cleared, "session reset");
    }
}
