//! CLI command handlers, one file per subcommand.

mod deals;
mod run;

pub use deals::run_deals;
pub use run::run_import;

#[cfg(test)]
pub(crate) use deals::format_row;

use anyhow::{Context, Result};
use boostimport_core::config::ServiceEnv;
use boostimport_core::rpc::{parse_api_info, BoostGraphql, MarketsRpc};

/// Build both Boost clients from `MARKETS_API_INFO` / `BOOST_GRAPHQL_ENDPOINT`.
fn connect() -> Result<(BoostGraphql, MarketsRpc)> {
    let env = ServiceEnv::from_env()?;
    let graphql = BoostGraphql::new(&env.graphql_endpoint)
        .with_context(|| format!("invalid GraphQL endpoint {:?}", env.graphql_endpoint))?;
    let info = parse_api_info(&env.markets_api_info)?;
    let rpc = MarketsRpc::new(&info);
    tracing::info!(graphql = graphql.url(), markets = rpc.url(), "using Boost endpoints");
    Ok((graphql, rpc))
}
