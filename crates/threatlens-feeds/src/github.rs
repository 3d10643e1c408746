//! GitHub repository search provider
//!
//! Backs exploit-evidence collection: repository search, tree listing,
//! and raw file fetch. A token is optional but raises the search rate
//! limit substantially.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use threatlens_core::{Error, ExploitCandidate, RepoSearchProvider, Result};
use tracing::debug;

const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_RAW_URL: &str = "https://raw.githubusercontent.com";
const SEARCH_PAGE_SIZE: u32 = 10;

/// Exploit-evidence provider backed by the GitHub REST API
pub struct GithubSearch {
    client: Client,
    api_url: String,
    raw_url: String,
    token: Option<String>,
}

impl GithubSearch {
    pub fn new(client: Client, token: Option<String>) -> Self {
        Self {
            client,
            api_url: DEFAULT_API_URL.to_string(),
            raw_url: DEFAULT_RAW_URL.to_string(),
            token,
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_raw_url(mut self, url: impl Into<String>) -> Self {
        self.raw_url = url.into();
        self
    }

    fn api_request(&self, url: &str) -> RequestBuilder {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(ref token) = self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        request
    }
}

/// Map a non-success GitHub response to a domain error
fn api_error(response: &Response) -> Error {
    match response.status() {
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
            let retry_after_seconds = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);
            Error::RateLimited {
                service: "github".to_string(),
                retry_after_seconds,
            }
        }
        status => Error::unavailable("github", format!("API returned status {}", status)),
    }
}

#[async_trait]
impl RepoSearchProvider for GithubSearch {
    async fn search(&self, query: &str) -> Result<Vec<ExploitCandidate>> {
        let url = format!(
            "{}/search/repositories?q={}&sort=stars&order=desc&per_page={}",
            self.api_url,
            urlencode(query),
            SEARCH_PAGE_SIZE
        );
        debug!(%query, "searching GitHub repositories");

        let response = self
            .api_request(&url)
            .send()
            .await
            .map_err(|e| Error::unavailable("github", e.to_string()))?;

        if !response.status().is_success() {
            return Err(api_error(&response));
        }

        let results: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("failed to parse search response: {}", e)))?;

        Ok(results.items.into_iter().map(candidate_from_item).collect())
    }

    async fn list_files(&self, repo: &str, branch: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/repos/{}/git/trees/{}?recursive=1",
            self.api_url, repo, branch
        );

        let response = self
            .api_request(&url)
            .send()
            .await
            .map_err(|e| Error::unavailable("github", e.to_string()))?;

        // A missing branch or empty repository is not an error for the
        // caller; it just means no files to inspect.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(api_error(&response));
        }

        let tree: TreeResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("failed to parse tree response: {}", e)))?;

        Ok(tree
            .tree
            .into_iter()
            .filter(|entry| entry.entry_type == "blob")
            .map(|entry| entry.path)
            .collect())
    }

    async fn get_file_content(&self, repo: &str, path: &str, branch: &str) -> Result<String> {
        let url = format!("{}/{}/{}/{}", self.raw_url, repo, branch, path);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::unavailable("github", e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::unavailable(
                "github",
                format!("raw fetch returned status {}", response.status()),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| Error::unavailable("github", e.to_string()))
    }
}

fn candidate_from_item(item: SearchItem) -> ExploitCandidate {
    let mut candidate = ExploitCandidate::new(item.full_name, item.html_url)
        .with_stars(item.stargazers_count);
    candidate.forks = item.forks_count;
    candidate.pushed_at = item.pushed_at;
    candidate.description = item.description;
    if let Some(branch) = item.default_branch {
        candidate.default_branch = branch;
    }
    candidate
}

/// Percent-encode the characters GitHub search queries need escaped
fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            b' ' => out.push_str("%20"),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    full_name: String,
    html_url: String,
    #[serde(default)]
    stargazers_count: u32,
    #[serde(default)]
    forks_count: u32,
    #[serde(default)]
    pushed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    default_branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntry>,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    entry_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_from_search_item() {
        let item: SearchItem = serde_json::from_str(
            r#"{
                "full_name": "researcher/CVE-2025-53770-poc",
                "html_url": "https://github.com/researcher/CVE-2025-53770-poc",
                "stargazers_count": 42,
                "forks_count": 7,
                "pushed_at": "2025-07-21T10:30:00Z",
                "description": "PoC for ToolShell",
                "default_branch": "master"
            }"#,
        )
        .unwrap();

        let candidate = candidate_from_item(item);
        assert_eq!(candidate.full_name, "researcher/CVE-2025-53770-poc");
        assert_eq!(candidate.stars, 42);
        assert_eq!(candidate.forks, 7);
        assert!(candidate.pushed_at.is_some());
        assert_eq!(candidate.default_branch, "master");
        assert!(candidate.snippet.is_none());
    }

    #[test]
    fn test_sparse_item_gets_defaults() {
        let item: SearchItem = serde_json::from_str(
            r#"{"full_name": "a/b", "html_url": "https://github.com/a/b"}"#,
        )
        .unwrap();

        let candidate = candidate_from_item(item);
        assert_eq!(candidate.stars, 0);
        assert!(candidate.pushed_at.is_none());
        assert_eq!(candidate.default_branch, "main");
    }

    #[test]
    fn test_tree_filtering() {
        let tree: TreeResponse = serde_json::from_str(
            r#"{"tree": [
                {"path": "README.md", "type": "blob"},
                {"path": "src", "type": "tree"},
                {"path": "src/exploit.py", "type": "blob"}
            ]}"#,
        )
        .unwrap();

        let files: Vec<String> = tree
            .tree
            .into_iter()
            .filter(|e| e.entry_type == "blob")
            .map(|e| e.path)
            .collect();
        assert_eq!(files, vec!["README.md", "src/exploit.py"]);
    }

    #[test]
    fn test_urlencode_query() {
        assert_eq!(
            urlencode("CVE-2025-53770 poc OR exploit in:name,description,readme"),
            "CVE-2025-53770%20poc%20OR%20exploit%20in%3Aname%2Cdescription%2Creadme"
        );
    }
}
