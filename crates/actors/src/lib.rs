//! Single-purpose Scrappa actors.
//!
//! Each actor calls one Scrappa endpoint and persists the response into a
//! local dataset and key-value store. The control flow lives in
//! [`harness::run_actor`]; the per-endpoint details live in [`actors`].
//!
//! # Usage
//!
//! ```no_run
//! use scrappa::ScrappaClient;
//! use scrappa_actors::{ActorKind, RunStorage};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = ScrappaClient::from_env()?;
//! let storage = RunStorage::open("./storage").await?;
//! let input = serde_json::json!({ "query": "coffee berlin" });
//!
//! ActorKind::MapsSearch.run(&client, input, &storage).await?;
//! # Ok(())
//! # }
//! ```

pub mod actors;
pub mod error;
pub mod harness;
pub mod storage;

pub use actors::ActorKind;
pub use error::ActorError;
pub use harness::{
    run_actor, run_with_json, Actor, Inspection, NotFound, NotFoundPolicy, RunOutcome,
};
pub use storage::{RunStorage, OUTPUT_KEY};
