//! Assessment workflow - the state machine sequencing one assessment
//!
//! ```text
//! START -> VALIDATING -> (NOT_FOUND | MATCHING)
//!                          MATCHING -> (UNAFFECTED | EXPLOIT_CHECK)
//!                          EXPLOIT_CHECK -> EVIDENCE_LOOKUP -> DONE
//! ```
//!
//! One invocation produces exactly one `AssessmentOutcome`. The workflow
//! never retries internally; retry policy belongs to the collaborator
//! transport layer.

use crate::evidence::EvidenceCollector;
use crate::exploitation::ExploitationResolver;
use crate::matcher::match_assets;
use crate::scoring::ThreatScorer;
use chrono::Utc;
use std::sync::Arc;
use threatlens_core::{
    canonical_cve_id, AssessmentOutcome, AssetInventory, Error, Result, ThreatAssessment,
    ThreatLevel, VulnerabilityRegistry,
};
use tracing::{debug, info};
use uuid::Uuid;

/// Named states of the assessment state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Start,
    Validating,
    NotFound,
    Matching,
    Unaffected,
    ExploitCheck,
    EvidenceLookup,
    Done,
}

impl WorkflowState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowState::NotFound | WorkflowState::Unaffected | WorkflowState::Done
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Start => "start",
            WorkflowState::Validating => "validating",
            WorkflowState::NotFound => "not_found",
            WorkflowState::Matching => "matching",
            WorkflowState::Unaffected => "unaffected",
            WorkflowState::ExploitCheck => "exploit_check",
            WorkflowState::EvidenceLookup => "evidence_lookup",
            WorkflowState::Done => "done",
        }
    }
}

/// Sequences one assessment end-to-end over the collaborator interfaces
pub struct AssessmentWorkflow {
    registry: Arc<dyn VulnerabilityRegistry>,
    inventory: Arc<dyn AssetInventory>,
    resolver: ExploitationResolver,
    evidence: EvidenceCollector,
    scorer: ThreatScorer,
}

impl AssessmentWorkflow {
    pub fn new(
        registry: Arc<dyn VulnerabilityRegistry>,
        inventory: Arc<dyn AssetInventory>,
        resolver: ExploitationResolver,
        evidence: EvidenceCollector,
        scorer: ThreatScorer,
    ) -> Self {
        Self {
            registry,
            inventory,
            resolver,
            evidence,
            scorer,
        }
    }

    /// Run a single assessment for the given CVE id
    pub async fn run(&self, raw_cve_id: &str) -> Result<AssessmentOutcome> {
        let cve_id = canonical_cve_id(raw_cve_id)
            .ok_or_else(|| Error::InvalidCveId(raw_cve_id.to_string()))?;

        let mut state = WorkflowState::Start;
        self.advance(&mut state, WorkflowState::Validating, &cve_id);

        let Some(record) = self.registry.fetch(&cve_id).await? else {
            self.advance(&mut state, WorkflowState::NotFound, &cve_id);
            info!(cve_id = %cve_id, "vulnerability not found in registry");
            return Ok(AssessmentOutcome::NotFound { cve_id });
        };

        self.advance(&mut state, WorkflowState::Matching, &cve_id);
        let inventory = self.inventory.list().await?;
        let matched = match_assets(&record, &inventory);

        if matched.is_empty() {
            self.advance(&mut state, WorkflowState::Unaffected, &cve_id);
            info!(cve_id = %cve_id, "no owned asset is affected");
            return Ok(AssessmentOutcome::Unaffected { record });
        }

        // Exploitation lookup and evidence search are independent
        // read-only calls; issue them concurrently and join.
        self.advance(&mut state, WorkflowState::ExploitCheck, &cve_id);
        let (exploitation, candidates) = tokio::join!(
            self.resolver.resolve(&record),
            self.evidence.search(&record.cve_id),
        );
        let exploitation = exploitation?;
        let candidates = candidates?;

        let score = self.scorer.score(&matched, &exploitation);
        if score.level == ThreatLevel::None {
            debug_assert!(false, "non-empty match set scored NONE");
            return Err(Error::InvariantViolation(format!(
                "{} matched {} assets but scored NONE",
                cve_id,
                matched.len()
            )));
        }

        self.advance(&mut state, WorkflowState::EvidenceLookup, &cve_id);
        let evidence = self.evidence.select(candidates).await;

        self.advance(&mut state, WorkflowState::Done, &cve_id);
        info!(
            cve_id = %cve_id,
            matched = matched.len(),
            level = score.level.as_str(),
            exploited = exploitation.actively_exploited,
            evidence = evidence.len(),
            "assessment complete"
        );

        Ok(AssessmentOutcome::Assessed(Box::new(ThreatAssessment {
            id: Uuid::new_v4(),
            record,
            matched_assets: matched,
            exploitation,
            score,
            evidence,
            assessed_at: Utc::now(),
        })))
    }

    fn advance(&self, state: &mut WorkflowState, next: WorkflowState, cve_id: &str) {
        debug!(
            cve_id,
            from = state.as_str(),
            to = next.as_str(),
            "workflow transition"
        );
        *state = next;
    }
}
