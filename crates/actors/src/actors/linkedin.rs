//! LinkedIn actors: profile, company and post.

use std::sync::LazyLock;

use regex::Regex;
use scrappa::{RequestParams, ScrappaError};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use url::Url;

use super::{apply_cache, CacheMode};
use crate::error::ActorError;
use crate::harness::{array_len, require, Actor, Inspection, NotFound, NotFoundPolicy};

static COUNTRY_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z]{2,3}\.linkedin\.com$").expect("country host pattern is valid")
});

static COUNTRY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(https?://)[a-z]{2,3}\.linkedin\.com").expect("country prefix pattern is valid")
});

static COMPANY_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(https?://(?:www\.)?linkedin\.com/company/[a-zA-Z0-9._-]+)/?.*$")
        .expect("company URL pattern is valid")
});

/// Input shared by the LinkedIn actors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkedInInput {
    #[serde(default)]
    pub url: String,
    pub use_cache: Option<bool>,
    pub maximum_cache_age: Option<u32>,
}

/// Canonical form of a profile URL: `www.` host, no query, no fragment, no
/// trailing slash.
pub fn normalize_profile_url(raw: &str) -> Result<String, ActorError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ActorError::InvalidInput(format!("Invalid LinkedIn profile URL: {e}")))?;

    if let Some(host) = url.host_str().map(str::to_string) {
        if COUNTRY_HOST.is_match(&host) {
            url.set_host(Some("www.linkedin.com"))
                .map_err(|e| ActorError::InvalidInput(e.to_string()))?;
        }
    }

    url.set_query(None);
    url.set_fragment(None);

    let path = url.path().trim_end_matches('/').to_string();
    url.set_path(&path);

    Ok(url.to_string())
}

/// Reduce a company URL to `https://www.linkedin.com/company/<slug>`.
pub fn normalize_company_url(raw: &str) -> Result<String, ActorError> {
    let url = COUNTRY_PREFIX.replace(raw.trim(), "${1}www.linkedin.com");
    let url = url.split('?').next().unwrap_or_default();

    COMPANY_URL
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            ActorError::InvalidInput(
                "Invalid LinkedIn company URL. Expected format: \
                 https://www.linkedin.com/company/company-slug"
                    .to_string(),
            )
        })
}

fn count(response: &Value, key: &str) -> Value {
    response.get(key).cloned().unwrap_or_else(|| json!(0))
}

fn reports_failure(response: &Value) -> bool {
    response.get("success").and_then(Value::as_bool) == Some(false)
}

// ============================================================================
// Profile
// ============================================================================

pub struct LinkedInProfile;

impl Actor for LinkedInProfile {
    type Input = LinkedInInput;

    fn name(&self) -> &'static str {
        "linkedin-profile"
    }

    fn endpoint(&self) -> &'static str {
        "/linkedin/profile"
    }

    fn validate(&self, input: &LinkedInInput) -> Result<(), ActorError> {
        require(&input.url, "LinkedIn profile URL is required")
    }

    fn params(&self, input: &LinkedInInput) -> Result<RequestParams, ActorError> {
        let url = normalize_profile_url(&input.url)?;
        if url == input.url {
            info!(url = %url, "Fetching LinkedIn profile");
        } else {
            info!(url = %url, original = %input.url, "Fetching LinkedIn profile (normalized)");
        }

        let mut params = RequestParams::new().with("url", url);
        apply_cache(
            &mut params,
            CacheMode::OptIn,
            input.use_cache,
            input.maximum_cache_age,
        );
        Ok(params)
    }

    fn not_found_policy(&self) -> NotFoundPolicy {
        NotFoundPolicy::Record
    }

    fn not_found(&self, _input: &LinkedInInput, error: &ScrappaError) -> NotFound {
        let record = json!({
            "success": false,
            "error": "Profile not found",
            "message": error.to_string(),
        });
        NotFound {
            item: record.clone(),
            output: Some(record),
        }
    }

    fn inspect(&self, _input: &LinkedInInput, response: &Value) -> Result<Inspection, ActorError> {
        if reports_failure(response) {
            warn!("Profile scraping returned success: false");
        }
        Ok(Inspection::Accept)
    }

    fn items(&self, response: &Value) -> Vec<Value> {
        vec![response.clone()]
    }

    fn summary(&self, _input: &LinkedInInput, response: &Value) -> Value {
        json!({
            "success": response.get("success").cloned().unwrap_or(Value::Null),
            "name": response.get("name").cloned().unwrap_or(Value::Null),
            "location": response.get("location").cloned().unwrap_or(Value::Null),
            "followers": count(response, "followers"),
            "connections": count(response, "connections"),
            "experience_count": array_len(response, "experience"),
            "education_count": array_len(response, "education"),
            "skills_count": array_len(response, "skills"),
            "articles_count": array_len(response, "articles"),
            "activity_count": array_len(response, "activity"),
            "publications_count": array_len(response, "publications"),
            "projects_count": array_len(response, "projects"),
            "recommendations_count": array_len(response, "recommendations"),
            "similar_profiles_count": array_len(response, "similar_profiles"),
            "is_cached": response.get("cached").and_then(Value::as_bool).unwrap_or(false),
        })
    }
}

// ============================================================================
// Company
// ============================================================================

pub struct LinkedInCompany;

impl LinkedInCompany {
    fn not_found_record(url: &str, message: &str) -> NotFound {
        let record = json!({
            "success": false,
            "url": url,
            "message": message,
            "status_code": 404,
        });
        NotFound {
            item: record.clone(),
            output: Some(record),
        }
    }

    fn company_url(input: &LinkedInInput) -> String {
        normalize_company_url(&input.url).unwrap_or_else(|_| input.url.clone())
    }
}

impl Actor for LinkedInCompany {
    type Input = LinkedInInput;

    fn name(&self) -> &'static str {
        "linkedin-company"
    }

    fn endpoint(&self) -> &'static str {
        "/linkedin/company"
    }

    fn validate(&self, input: &LinkedInInput) -> Result<(), ActorError> {
        require(&input.url, "LinkedIn company URL is required")?;
        normalize_company_url(&input.url).map(|_| ())
    }

    fn params(&self, input: &LinkedInInput) -> Result<RequestParams, ActorError> {
        let url = normalize_company_url(&input.url)?;
        info!(url = %url, "Scraping LinkedIn company");

        // The company endpoint takes the flag as given rather than defaulting it.
        Ok(RequestParams::new()
            .with("url", url)
            .with("use_cache", input.use_cache)
            .with("maximum_cache_age", input.maximum_cache_age))
    }

    fn not_found_policy(&self) -> NotFoundPolicy {
        NotFoundPolicy::Record
    }

    fn not_found(&self, input: &LinkedInInput, _error: &ScrappaError) -> NotFound {
        Self::not_found_record(&Self::company_url(input), "Company not found")
    }

    fn inspect(&self, input: &LinkedInInput, response: &Value) -> Result<Inspection, ActorError> {
        if !reports_failure(response) {
            return Ok(Inspection::Accept);
        }

        let message = response.get("message").and_then(Value::as_str);
        if response.get("status_code").and_then(Value::as_u64) == Some(404) {
            return Ok(Inspection::NotFound(Self::not_found_record(
                &Self::company_url(input),
                message.unwrap_or("Company not found"),
            )));
        }

        Err(ActorError::Rejected(
            message
                .unwrap_or("Failed to scrape LinkedIn company")
                .to_string(),
        ))
    }

    fn items(&self, response: &Value) -> Vec<Value> {
        vec![response.clone()]
    }

    fn summary(&self, _input: &LinkedInInput, response: &Value) -> Value {
        json!({
            "name": response.get("name").and_then(Value::as_str).unwrap_or("Unknown"),
            "industry": response.get("industry").and_then(Value::as_str).unwrap_or("Unknown"),
            "followers": count(response, "followers"),
            "employee_count": count(response, "employee_count"),
            "employees_found": array_len(response, "employees"),
            "posts_found": array_len(response, "posts"),
            "locations_found": array_len(response, "address"),
            "specialties_count": array_len(response, "specialties"),
            "similar_pages_count": array_len(response, "similar_pages"),
            "has_funding": response.get("funding").is_some_and(|f| !f.is_null()),
            "cached": response.get("cached").and_then(Value::as_bool).unwrap_or(false),
        })
    }
}

// ============================================================================
// Post
// ============================================================================

pub struct LinkedInPost;

impl LinkedInPost {
    /// Flat dataset record for a post.
    fn record(response: &Value) -> Value {
        let field = |pointer: &str| response.pointer(pointer).cloned().unwrap_or(Value::Null);
        json!({
            "title": field("/title"),
            "url": field("/url"),
            "date_published": field("/date_published"),
            "date_modified": field("/date_modified"),
            "image": field("/image"),
            "body": field("/body"),
            "author_name": field("/author/name"),
            "author_url": field("/author/url"),
            "author_image": field("/author/image"),
            "author_headline": field("/author/headline"),
            "reactions_total": field("/reactions/total"),
            "reactions_likes": field("/reactions/likes"),
            "comments_count": field("/reactions/comments"),
            "topics": field("/topics"),
            "more_articles": field("/more_articles"),
            "comments": field("/comments"),
            "success": field("/success"),
        })
    }
}

impl Actor for LinkedInPost {
    type Input = LinkedInInput;

    fn name(&self) -> &'static str {
        "linkedin-post"
    }

    fn endpoint(&self) -> &'static str {
        "/linkedin/post"
    }

    fn validate(&self, input: &LinkedInInput) -> Result<(), ActorError> {
        require(&input.url, "LinkedIn post URL is required")
    }

    fn params(&self, input: &LinkedInInput) -> Result<RequestParams, ActorError> {
        info!(url = %input.url, "Scraping LinkedIn post");
        let mut params = RequestParams::new().with("url", &input.url);
        apply_cache(
            &mut params,
            CacheMode::OptIn,
            input.use_cache,
            input.maximum_cache_age,
        );
        Ok(params)
    }

    fn not_found_policy(&self) -> NotFoundPolicy {
        NotFoundPolicy::Record
    }

    fn not_found(&self, input: &LinkedInInput, error: &ScrappaError) -> NotFound {
        NotFound {
            item: json!({
                "success": false,
                "error": error.to_string(),
                "url": input.url,
            }),
            output: None,
        }
    }

    fn inspect(&self, input: &LinkedInInput, response: &Value) -> Result<Inspection, ActorError> {
        if reports_failure(response) {
            warn!(url = %input.url, "API returned success: false");
        }
        Ok(Inspection::Accept)
    }

    fn items(&self, response: &Value) -> Vec<Value> {
        vec![Self::record(response)]
    }

    fn summary(&self, _input: &LinkedInInput, response: &Value) -> Value {
        json!({
            "title": response.get("title").cloned().unwrap_or(Value::Null),
            "author": response.pointer("/author/name").cloned().unwrap_or(Value::Null),
            "date_published": response.get("date_published").cloned().unwrap_or(Value::Null),
            "reactions_total": response.pointer("/reactions/total").cloned().unwrap_or_else(|| json!(0)),
            "comments_count": response.pointer("/reactions/comments").cloned().unwrap_or_else(|| json!(0)),
            "topics_count": array_len(response, "topics"),
            "more_articles_count": array_len(response, "more_articles"),
        })
    }
}
