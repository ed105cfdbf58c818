//! Prompt construction for the evidence judge.

use claimcheck_core::types::EvidenceItem;

use crate::policy::JudgePolicy;

const NORMAL_RULES: &str = "RULES:
- Use ONLY the evidence below.
- If evidence is insufficient, verdict = \"Unknown\".
- No diagnosis, no dosage, no medical advice.
- Output JSON only (no markdown, no extra text).";

const STRICT_RULES: &str = "STRICT RULES:
- Use ONLY the evidence below.
- If the evidence does NOT explicitly discuss the claim topic/effect, verdict MUST be \"Unknown\".
- Never guess. Never generalize beyond the text.
- No diagnosis, no dosage, no medical advice.
- Output JSON only (no markdown, no extra text).";

const RESPONSE_SCHEMA: &str = r#"Return JSON:
{
  "verdict": "Supported" | "Mixed" | "NotSupported" | "Unknown",
  "short_reason": "1-2 evidence-based sentences",
  "citations": ["chunk_id1", "chunk_id2"],
  "confidence": 0.0
}"#;

/// One labeled block per evidence item, in retrieval order.
pub fn evidence_block(evidence: &[EvidenceItem]) -> String {
    let mut block = String::new();
    for e in evidence {
        block.push_str("\n---\n");
        block.push_str(&format!("CITATION: {} ({})\n", e.chunk_id, e.doc_id));
        block.push_str(&format!("TEXT:\n{}\n", e.text));
    }
    block
}

pub fn build_prompt(claim: &str, evidence: &[EvidenceItem], policy: JudgePolicy) -> String {
    let rules = match policy {
        JudgePolicy::Normal => NORMAL_RULES,
        JudgePolicy::Strict => STRICT_RULES,
    };
    format!(
        "You are an evidence judge for supplement claims.\n\n{rules}\n\nClaim:\n{claim}\n\nEvidence:\n{block}\n\n{RESPONSE_SCHEMA}",
        block = evidence_block(evidence)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, text: &str) -> EvidenceItem {
        EvidenceItem { rank: 1, score: 0.9, chunk_id: id.into(), doc_id: "vitd".into(), text: text.into() }
    }

    #[test]
    fn every_evidence_item_is_labeled() {
        let ev = vec![item("vitd::chunk_0", "Vitamin D aids calcium uptake."), item("vitd::chunk_1", "Sunlight exposure.")];
        let prompt = build_prompt("Vitamin D helps bones", &ev, JudgePolicy::Normal);
        assert!(prompt.contains("CITATION: vitd::chunk_0 (vitd)\nTEXT:\nVitamin D aids calcium uptake."));
        assert!(prompt.contains("CITATION: vitd::chunk_1 (vitd)"));
        assert!(prompt.contains("Claim:\nVitamin D helps bones"));
        assert!(prompt.contains("\"verdict\": \"Supported\" | \"Mixed\" | \"NotSupported\" | \"Unknown\""));
    }

    #[test]
    fn strict_policy_adds_explicit_topic_rule() {
        let ev = vec![item("vitd::chunk_0", "text")];
        let normal = build_prompt("c", &ev, JudgePolicy::Normal);
        let strict = build_prompt("c", &ev, JudgePolicy::Strict);
        assert!(!normal.contains("MUST be \"Unknown\""));
        assert!(strict.contains("MUST be \"Unknown\""));
        assert!(strict.contains("Never guess"));
        for p in [&normal, &strict] {
            assert!(p.contains("No diagnosis, no dosage, no medical advice."));
        }
    }
}
