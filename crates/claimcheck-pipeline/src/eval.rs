//! A/B evaluation over a labeled failure set.
//!
//! Each variant runs every case through retrieval and the judge, scores the
//! prediction against the expected verdict and writes one artifact file.

use anyhow::{Context, Result};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use claimcheck_core::corpus::read_jsonl_strict;
use claimcheck_core::error::Error;
use claimcheck_core::traits::{EvidenceSource, JudgeModel};
use claimcheck_core::types::{EvidenceItem, VerdictLabel};
use claimcheck_judge::JudgePolicy;

use crate::checker::ClaimChecker;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalCase {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub claim: String,
    pub expected: VerdictLabel,
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("case id must be a string or number, got {other}"))),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRef {
    pub chunk_id: String,
    pub doc_id: String,
    pub score: f32,
}

impl From<&EvidenceItem> for EvidenceRef {
    fn from(e: &EvidenceItem) -> Self {
        Self { chunk_id: e.chunk_id.clone(), doc_id: e.doc_id.clone(), score: e.score }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalResult {
    pub id: String,
    pub claim: String,
    pub expected: VerdictLabel,
    pub pred: VerdictLabel,
    pub is_correct: bool,
    pub citation_hit_rate: f64,
    pub flags: Vec<String>,
    pub judge_obj: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub top_evidence: Vec<EvidenceRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalSummary {
    pub variant: String,
    pub policy: JudgePolicy,
    pub n_tests: usize,
    pub n_failed: usize,
    pub accuracy: f64,
    pub avg_citation_hit_rate: f64,
    pub flag_rate: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EvalArtifact {
    pub summary: EvalSummary,
    pub results: Vec<EvalResult>,
}

/// Share of distinct cited chunk ids that were actually retrieved.
///
/// No citations scores `0.0`. Duplicate citations count once.
pub fn citation_hit_rate(citations: &[String], evidence_ids: &HashSet<&str>) -> f64 {
    let cited: HashSet<&str> = citations.iter().map(String::as_str).collect();
    if cited.is_empty() {
        return 0.0;
    }
    let hits = cited.iter().filter(|c| evidence_ids.contains(*c)).count();
    hits as f64 / cited.len() as f64
}

pub fn load_failure_set(path: &Path) -> Result<Vec<EvalCase>> {
    let cases: Vec<EvalCase> =
        read_jsonl_strict(path).with_context(|| format!("reading failure set {}", path.display()))?;
    tracing::info!(path = %path.display(), cases = cases.len(), "failure set loaded");
    Ok(cases)
}

pub struct EvaluationHarness<E, M>
where
    E: EvidenceSource,
    M: JudgeModel,
{
    checker: ClaimChecker<E, M>,
    progress: bool,
}

impl<E, M> EvaluationHarness<E, M>
where
    E: EvidenceSource,
    M: JudgeModel,
{
    pub fn new(checker: ClaimChecker<E, M>) -> Self {
        Self { checker, progress: false }
    }

    /// Show a progress bar while cases run.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Run every case under `policy`, in order.
    ///
    /// A case whose retrieval or judging fails with an upstream or parse error
    /// is recorded as failed and the run continues. Any other error aborts.
    pub fn evaluate(&self, policy: JudgePolicy, cases: &[EvalCase]) -> Result<(EvalSummary, Vec<EvalResult>)> {
        let pb = if self.progress { ProgressBar::new(cases.len() as u64) } else { ProgressBar::hidden() };
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} variant {msg} [{bar:40.cyan/blue}] {pos}/{len} cases")?
                .progress_chars("#>-"),
        );
        pb.set_message(policy.variant());

        let mut results = Vec::with_capacity(cases.len());
        for case in cases {
            results.push(self.evaluate_case(policy, case)?);
            pb.inc(1);
        }
        pb.finish_and_clear();

        let summary = summarize(policy, &results);
        tracing::info!(
            variant = %summary.variant,
            n = summary.n_tests,
            failed = summary.n_failed,
            accuracy = summary.accuracy,
            "variant evaluated"
        );
        Ok((summary, results))
    }

    fn evaluate_case(&self, policy: JudgePolicy, case: &EvalCase) -> Result<EvalResult> {
        let mut result = EvalResult {
            id: case.id.clone(),
            claim: case.claim.clone(),
            expected: case.expected,
            pred: VerdictLabel::Unknown,
            is_correct: false,
            citation_hit_rate: 0.0,
            flags: Vec::new(),
            judge_obj: Value::Null,
            error: None,
            top_evidence: Vec::new(),
        };

        let evidence = match self.checker.retrieve(&case.claim) {
            Ok(evidence) => evidence,
            Err(e) => return failed(result, e),
        };
        result.top_evidence = evidence.iter().map(EvidenceRef::from).collect();

        let judgement = match self.checker.judge(&case.claim, &evidence, policy) {
            Ok(j) => j,
            Err(e) => return failed(result, e),
        };
        let ids: HashSet<&str> = evidence.iter().map(|e| e.chunk_id.as_str()).collect();
        result.pred = judgement.verdict.verdict;
        result.is_correct = result.pred == case.expected;
        result.citation_hit_rate = citation_hit_rate(&judgement.verdict.citations, &ids);
        result.flags = judgement.flags;
        result.judge_obj = judgement.raw;
        Ok(result)
    }
}

fn failed(mut result: EvalResult, err: Error) -> Result<EvalResult> {
    if !err.is_per_claim() {
        return Err(err).with_context(|| format!("evaluating case {}", result.id));
    }
    tracing::warn!(case = %result.id, error = %err, "case failed");
    result.error = Some(err.to_string());
    Ok(result)
}

pub fn summarize(policy: JudgePolicy, results: &[EvalResult]) -> EvalSummary {
    let total = results.len();
    let denom = total.max(1) as f64;
    let correct = results.iter().filter(|r| r.is_correct).count();
    let flagged = results.iter().filter(|r| !r.flags.is_empty()).count();
    let hit_sum: f64 = results.iter().map(|r| r.citation_hit_rate).sum();
    EvalSummary {
        variant: policy.variant().to_string(),
        policy,
        n_tests: total,
        n_failed: results.iter().filter(|r| r.error.is_some()).count(),
        accuracy: correct as f64 / denom,
        avg_citation_hit_rate: hit_sum / denom,
        flag_rate: flagged as f64 / denom,
    }
}

/// UTC timestamp shared by all artifacts of one run.
pub fn artifact_timestamp() -> String {
    Utc::now().format("%Y%m%dT%H%M%S%6fZ").to_string()
}

/// Write `eval_<variant>_<timestamp>.json`. Never overwrites an existing file.
pub fn write_artifact(out_dir: &Path, timestamp: &str, summary: &EvalSummary, results: &[EvalResult]) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    let path = out_dir.join(format!("eval_{}_{timestamp}.json", summary.variant));
    let payload = serde_json::json!({ "summary": summary, "results": results });
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .with_context(|| format!("creating artifact {}", path.display()))?;
    file.write_all(serde_json::to_string_pretty(&payload)?.as_bytes())?;
    file.write_all(b"\n")?;
    tracing::info!(path = %path.display(), "artifact written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids<'a>(v: &[&'a str]) -> HashSet<&'a str> {
        v.iter().copied().collect()
    }

    #[test]
    fn hit_rate_cases() {
        assert_eq!(citation_hit_rate(&[], &ids(&["x"])), 0.0);
        assert_eq!(citation_hit_rate(&["x".into()], &ids(&["x"])), 1.0);
        assert_eq!(citation_hit_rate(&["x".into(), "y".into()], &ids(&["x"])), 0.5);
        assert_eq!(citation_hit_rate(&["x".into(), "x".into()], &ids(&["x"])), 1.0);
    }

    #[test]
    fn case_ids_accept_numbers() {
        let c: EvalCase = serde_json::from_str(r#"{"id": 7, "claim": "c", "expected": "Mixed"}"#).unwrap();
        assert_eq!(c.id, "7");
        assert_eq!(c.expected, VerdictLabel::Mixed);
    }

    #[test]
    fn empty_run_summarizes_to_zero() {
        let s = summarize(JudgePolicy::Strict, &[]);
        assert_eq!(s.variant, "B");
        assert_eq!(s.n_tests, 0);
        assert_eq!(s.accuracy, 0.0);
        assert_eq!(s.flag_rate, 0.0);
    }
}
