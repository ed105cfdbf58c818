use claimcheck_core::error::Result;
use claimcheck_core::traits::{EvidenceSource, JudgeModel};
use claimcheck_core::types::EvidenceItem;
use claimcheck_judge::{EvidenceJudge, JudgePolicy, Judgement};

#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub claim: String,
    pub evidence: Vec<EvidenceItem>,
    pub judgement: Judgement,
}

/// Retrieve top-k evidence for a claim, then judge it.
pub struct ClaimChecker<E, M>
where
    E: EvidenceSource,
    M: JudgeModel,
{
    source: E,
    judge: EvidenceJudge<M>,
    top_k: usize,
}

impl<E, M> ClaimChecker<E, M>
where
    E: EvidenceSource,
    M: JudgeModel,
{
    pub fn new(source: E, judge: EvidenceJudge<M>, top_k: usize) -> Self {
        Self { source, judge, top_k }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn retrieve(&self, claim: &str) -> Result<Vec<EvidenceItem>> {
        self.source.retrieve(claim, self.top_k)
    }

    pub fn judge(&self, claim: &str, evidence: &[EvidenceItem], policy: JudgePolicy) -> Result<Judgement> {
        self.judge.judge(claim, evidence, policy)
    }

    pub fn check(&self, claim: &str, policy: JudgePolicy) -> Result<CheckOutcome> {
        let evidence = self.retrieve(claim)?;
        let judgement = self.judge(claim, &evidence, policy)?;
        Ok(CheckOutcome { claim: claim.to_string(), evidence, judgement })
    }
}
