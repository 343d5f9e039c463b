//! Concrete actor definitions.

pub mod google_search;
pub mod linkedin;
pub mod maps;

use clap::ValueEnum;
use scrappa::{RequestParams, ScrappaApi};
use serde_json::Value;

use crate::error::ActorError;
use crate::harness::{run_with_json, RunOutcome};
use crate::storage::RunStorage;

pub use google_search::GoogleSearch;
pub use linkedin::{LinkedInCompany, LinkedInPost, LinkedInProfile};
pub use maps::{
    MapsAdvancedSearch, MapsAutocomplete, MapsBusinessDetails, MapsPhotos, MapsSearch,
};

/// Every actor the CLI can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActorKind {
    GoogleSearch,
    MapsSearch,
    MapsAdvancedSearch,
    MapsAutocomplete,
    MapsBusinessDetails,
    MapsPhotos,
    LinkedinProfile,
    LinkedinCompany,
    LinkedinPost,
}

impl ActorKind {
    /// Run the actor with a raw JSON input document.
    pub async fn run(
        self,
        api: &dyn ScrappaApi,
        input: Value,
        storage: &RunStorage,
    ) -> Result<RunOutcome, ActorError> {
        match self {
            Self::GoogleSearch => run_with_json(&GoogleSearch, api, input, storage).await,
            Self::MapsSearch => run_with_json(&MapsSearch, api, input, storage).await,
            Self::MapsAdvancedSearch => {
                run_with_json(&MapsAdvancedSearch, api, input, storage).await
            }
            Self::MapsAutocomplete => run_with_json(&MapsAutocomplete, api, input, storage).await,
            Self::MapsBusinessDetails => {
                run_with_json(&MapsBusinessDetails, api, input, storage).await
            }
            Self::MapsPhotos => run_with_json(&MapsPhotos, api, input, storage).await,
            Self::LinkedinProfile => run_with_json(&LinkedInProfile, api, input, storage).await,
            Self::LinkedinCompany => run_with_json(&LinkedInCompany, api, input, storage).await,
            Self::LinkedinPost => run_with_json(&LinkedInPost, api, input, storage).await,
        }
    }
}

/// How an actor sends the `use_cache` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheMode {
    /// Send `use_cache=1` unless the input explicitly disables it.
    OnByDefault,
    /// Send `use_cache=1` only when the input enables it.
    OptIn,
}

/// Apply `use_cache` and `maximum_cache_age` to `params`.
pub(crate) fn apply_cache(
    params: &mut RequestParams,
    mode: CacheMode,
    use_cache: Option<bool>,
    maximum_cache_age: Option<u32>,
) {
    let enabled = match mode {
        CacheMode::OnByDefault => use_cache != Some(false),
        CacheMode::OptIn => use_cache == Some(true),
    };
    if enabled {
        params.insert("use_cache", true);
    }
    params.insert("maximum_cache_age", maximum_cache_age);
}
