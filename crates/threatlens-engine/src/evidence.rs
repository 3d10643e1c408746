//! Exploit evidence ranking and curation
//!
//! Orders candidate repositories by (snippet presence, last-push recency,
//! star count) and surfaces a small curated set instead of the full
//! search result list. Ties break by star count then repository name so
//! the ordering is fully deterministic.

use std::cmp::Ordering;
use std::sync::Arc;
use threatlens_core::{ExploitCandidate, RepoSearchProvider, Result};
use tracing::{debug, warn};

/// Default number of curated candidates
pub const DEFAULT_EVIDENCE_LIMIT: usize = 3;

/// Default cap on extracted snippet length
pub const DEFAULT_SNIPPET_MAX_CHARS: usize = 1200;

/// File extensions that plausibly hold proof-of-concept code
const POC_EXTENSIONS: [&str; 9] = [
    ".py", ".sh", ".rb", ".c", ".cpp", ".go", ".rs", ".ps1", ".js",
];

/// Rank candidates and keep at most `limit` of them.
///
/// Pure and deterministic: same input sequence yields the same output.
pub fn rank(mut candidates: Vec<ExploitCandidate>, limit: usize) -> Vec<ExploitCandidate> {
    candidates.sort_by(rank_order);
    candidates.truncate(limit);
    candidates
}

fn rank_order(a: &ExploitCandidate, b: &ExploitCandidate) -> Ordering {
    b.snippet
        .is_some()
        .cmp(&a.snippet.is_some())
        .then_with(|| b.pushed_at.cmp(&a.pushed_at))
        .then_with(|| b.stars.cmp(&a.stars))
        .then_with(|| a.full_name.cmp(&b.full_name))
}

/// Build the PoC-oriented repository search query for a CVE id
pub fn poc_query(cve_id: &str) -> String {
    format!("{} poc OR exploit OR vulnerability in:name,description,readme", cve_id)
}

/// Searches for exploit evidence and curates the result set
pub struct EvidenceCollector {
    provider: Arc<dyn RepoSearchProvider>,
    limit: usize,
    snippet_max_chars: usize,
}

impl EvidenceCollector {
    pub fn new(provider: Arc<dyn RepoSearchProvider>) -> Self {
        Self {
            provider,
            limit: DEFAULT_EVIDENCE_LIMIT,
            snippet_max_chars: DEFAULT_SNIPPET_MAX_CHARS,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_snippet_max_chars(mut self, max_chars: usize) -> Self {
        self.snippet_max_chars = max_chars;
        self
    }

    /// Fetch raw candidates for a CVE id. Provider failures propagate.
    pub async fn search(&self, cve_id: &str) -> Result<Vec<ExploitCandidate>> {
        let query = poc_query(cve_id);
        let candidates = self.provider.search(&query).await?;
        debug!(cve_id, candidates = candidates.len(), "evidence search complete");
        Ok(candidates)
    }

    /// Rank the candidates, keep the curated set, and attach snippets.
    ///
    /// Snippet extraction only enriches candidates already selected by
    /// the ranker, and is best-effort: a failed fetch leaves the
    /// candidate without a snippet rather than failing the assessment.
    pub async fn select(&self, candidates: Vec<ExploitCandidate>) -> Vec<ExploitCandidate> {
        let mut selected = rank(candidates, self.limit);

        for candidate in &mut selected {
            if candidate.snippet.is_some() {
                continue;
            }
            match self.extract_snippet(candidate).await {
                Ok(snippet) => candidate.snippet = snippet,
                Err(e) => {
                    warn!(repo = %candidate.full_name, error = %e, "snippet extraction failed");
                }
            }
        }

        selected
    }

    async fn extract_snippet(&self, candidate: &ExploitCandidate) -> Result<Option<String>> {
        let files = self
            .provider
            .list_files(&candidate.full_name, &candidate.default_branch)
            .await?;

        let Some(path) = pick_poc_file(&files) else {
            return Ok(None);
        };

        let content = self
            .provider
            .get_file_content(&candidate.full_name, path, &candidate.default_branch)
            .await?;

        let mut snippet: String = content.chars().take(self.snippet_max_chars).collect();
        if snippet.len() < content.len() {
            snippet.push_str("\n...");
        }

        Ok(Some(snippet))
    }
}

/// Pick the most promising file from a repository listing: prefer names
/// mentioning exploit/poc, then any recognized code extension.
fn pick_poc_file(files: &[String]) -> Option<&String> {
    let is_code =
        |f: &str| POC_EXTENSIONS.iter().any(|ext| f.to_lowercase().ends_with(ext));

    files
        .iter()
        .filter(|f| is_code(f))
        .find(|f| {
            let lower = f.to_lowercase();
            lower.contains("exploit") || lower.contains("poc")
        })
        .or_else(|| files.iter().find(|f| is_code(f)))
}
