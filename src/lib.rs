#![forbid(unsafe_code)]

//! # systems-change-mapper
//!
//! Map an organization's initiatives onto the Six Conditions of Systems Change
//! and judge how balanced the portfolio is.
//!
//! The six conditions sit in three tiers of visibility: explicit (policies,
//! practices, resource flows), semi-explicit (relationships, power dynamics)
//! and implicit (mental models). Most portfolios cluster in the explicit tier;
//! the analysis rewards spreading effort toward the deeper ones.
//!
//! Suggestions and analysis each come in two interchangeable strategies: a
//! deterministic offline one and one backed by a remote text-generation
//! service. Remote failures never surface to callers; they are logged and
//! replaced with fallback output.

pub mod analysis;
pub mod conditions;
pub mod config;
pub mod extract;
pub mod gateway;
pub mod prompts;
pub mod report;
pub mod session;
pub mod store;
pub mod suggestions;

pub use analysis::{
    analyze, AnalysisResult, Analyzer, ReadinessLevel, RemoteAnalyzer, StaticAnalyzer,
    TierDistribution, UnknownLevel,
};
pub use conditions::{condition_of, tier_of, Condition, ConditionKey, RegistryError, Tier, CONDITIONS};
pub use config::{
    build_session_strategies, build_strategies, ConfigError, MapperConfig, Strategies,
    StrategyKind,
};
pub use gateway::{Attribution, ChatGateway, ProviderError, ProviderGateway};
pub use report::{build_report, render_report_markdown, SystemsReport};
pub use session::{MapperSession, ReportTicket, ReportView};
pub use store::{Initiative, InitiativeId, InitiativeStore, Origin, StoreError};
pub use suggestions::{accept_suggestions, RemoteSuggestions, StaticSuggestions, SuggestionProvider};
