use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use claimcheck_cli::{init_tracing, App};
use claimcheck_judge::{EvidenceJudge, JudgePolicy, OllamaJudge};
use claimcheck_pipeline::eval::{artifact_timestamp, load_failure_set, write_artifact};
use claimcheck_pipeline::{ClaimChecker, EvaluationHarness};

/// Run the failure set under each judge variant and save one artifact per variant.
#[derive(Parser)]
#[command(name = "claimcheck-eval", version)]
struct Args {
    /// Failure set JSONL (default: data.failure_set)
    #[arg(long)]
    failure_set: Option<PathBuf>,
    /// Output directory (default: data.eval_out_dir)
    #[arg(long)]
    out: Option<PathBuf>,
    /// Variants to run: A = normal, B = strict
    #[arg(long, value_delimiter = ',', default_value = "A,B")]
    variants: Vec<JudgePolicy>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let app = App::load()?;

    let failure_set = args.failure_set.unwrap_or_else(|| app.path(&app.settings.data.failure_set));
    let out_dir = args.out.unwrap_or_else(|| app.path(&app.settings.data.eval_out_dir));
    let cases = load_failure_set(&failure_set)?;
    println!("Loaded failure set: {} tests", cases.len());

    let rt = tokio::runtime::Runtime::new()?;
    let retriever = app.retriever(&rt)?;
    let judge = EvidenceJudge::new(OllamaJudge::new(&app.settings.judge)?);
    let harness = EvaluationHarness::new(ClaimChecker::new(retriever, judge, app.settings.retrieval.top_k)).with_progress(true);

    let timestamp = artifact_timestamp();
    for policy in args.variants {
        tracing::info!(variant = policy.variant(), cases = cases.len(), "evaluating variant");
        let (summary, results) = harness.evaluate(policy, &cases)?;
        let path = write_artifact(&out_dir, &timestamp, &summary, &results)?;
        println!("\nVariant {} ({policy})", summary.variant);
        println!("{}", serde_json::to_string_pretty(&summary)?);
        println!("Saved: {}", path.display());
    }
    Ok(())
}
