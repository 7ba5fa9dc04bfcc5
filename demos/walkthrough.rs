//! End-to-end walkthrough for `systems-change-mapper`.
//!
//! Maps a small portfolio, accepts a few suggestions, runs the analysis and
//! prints the report as markdown.
//!
//! To run:
//! - `cargo run --example walkthrough` (offline strategies)
//! - `MAPPER_STRATEGY=remote OPENROUTER_API_KEY=... cargo run --example walkthrough`
//!
//! Set `RUST_LOG=systems_change_mapper=debug` to see fallbacks and retries.

use systems_change_mapper::{render_report_markdown, ConditionKey, MapperConfig, MapperSession};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = MapperConfig::from_env()?;
    let mut session = MapperSession::from_config(&config)?;

    // -- Map what the organization already does ------------------------------

    session.add_initiative(ConditionKey::Policies, "Advocate for paid family leave");
    session.add_initiative(ConditionKey::Practices, "Trust-based grantmaking pilot");
    session.add_initiative(ConditionKey::ResourceFlows, "Seed fund for women-led cooperatives");
    session.add_initiative(ConditionKey::Relationships, "Quarterly grantee learning circles");

    // -- Fill the gaps with suggestions --------------------------------------

    for key in [ConditionKey::PowerDynamics, ConditionKey::MentalModels] {
        let candidates = session.suggest(key).await;
        println!("Suggestions for {}:", key.condition().label);
        for c in &candidates {
            println!("  - {c}");
        }
        // Accept the first two; the rest are left for the user to ignore.
        session.accept_suggestions(key, candidates.iter().take(2));
    }
    println!();

    // -- Report --------------------------------------------------------------

    match session.run_report().await {
        Some(report) => println!("{}", render_report_markdown(report)),
        None => println!("report view closed before analysis finished"),
    }

    Ok(())
}
