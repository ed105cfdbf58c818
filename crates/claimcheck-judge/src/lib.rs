//! Evidence judge: prompt a generative model with retrieved evidence, recover
//! a [`Verdict`] from its reply and scan it for medical-advice language.

pub mod client;
pub mod guardrail;
pub mod parse;
pub mod policy;
pub mod prompt;
pub mod vision;

use serde_json::Value;

use claimcheck_core::error::Result;
use claimcheck_core::traits::JudgeModel;
use claimcheck_core::types::{EvidenceItem, Verdict};

pub use client::OllamaJudge;
pub use policy::JudgePolicy;
pub use vision::OllamaVision;

/// Result of judging one claim.
#[derive(Debug, Clone, PartialEq)]
pub struct Judgement {
    pub verdict: Verdict,
    /// The JSON object recovered from the model, before normalization.
    pub raw: Value,
    /// Guardrail matches over `raw`, the object that gets stored.
    pub flags: Vec<String>,
}

pub struct EvidenceJudge<M> {
    model: M,
}

impl<M: JudgeModel> EvidenceJudge<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Judge `claim` against `evidence`.
    ///
    /// With no evidence there is nothing to ground a verdict on, so the model
    /// is not called and the verdict is `Unknown`.
    pub fn judge(&self, claim: &str, evidence: &[EvidenceItem], policy: JudgePolicy) -> Result<Judgement> {
        if evidence.is_empty() {
            tracing::info!(%policy, "no evidence retrieved, returning Unknown");
            let verdict = Verdict::unknown("No evidence was retrieved for this claim.");
            let raw = serde_json::to_value(&verdict)?;
            let flags = guardrail::scan(&raw.to_string());
            return Ok(Judgement { verdict, raw, flags });
        }

        let prompt = prompt::build_prompt(claim, evidence, policy);
        let completion = self.model.complete(&prompt)?;
        let raw = parse::recover_json(&completion)?;
        let verdict = parse::verdict_from_value(&raw)?;
        let flags = guardrail::scan(&raw.to_string());
        if !flags.is_empty() {
            tracing::warn!(?flags, "verdict contains guarded language");
        }
        tracing::debug!(verdict = %verdict.verdict, citations = verdict.citations.len(), "claim judged");
        Ok(Judgement { verdict, raw, flags })
    }
}
