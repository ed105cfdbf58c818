use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::Path;

use claimcheck_cli::{init_tracing, App};
use claimcheck_core::traits::LabelReader;
use claimcheck_core::types::InputMode;
use claimcheck_judge::{EvidenceJudge, JudgePolicy, OllamaJudge, OllamaVision};
use claimcheck_pipeline::{ClaimChecker, RunHistory, RunRecord};

/// Check a supplement claim (typed, or read from a label photo) against the indexed evidence.
#[derive(Parser)]
#[command(name = "claimcheck", version)]
struct Args {
    /// Judge policy: A/normal or B/strict
    #[arg(long, default_value = "A")]
    policy: JudgePolicy,
    /// Do not record the run in the history database
    #[arg(long)]
    no_history: bool,
}

fn prompt_line(stdin: &mut impl BufRead, label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    stdin.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let app = App::load()?;
    let mut stdin = io::stdin().lock();

    println!("Choose input type:");
    println!("1) text (paste claim/label text)");
    println!("2) image (read label photo)");
    let mode = prompt_line(&mut stdin, "Enter 1 or 2: ")?;

    let (input_mode, claim) = if mode == "2" {
        let image = prompt_line(&mut stdin, "Image path: ")?;
        if image.is_empty() {
            println!("Empty input. Exit.");
            return Ok(());
        }
        let reader = OllamaVision::new(&app.settings.ocr)?;
        let text = reader
            .read_label(Path::new(&image))
            .with_context(|| format!("reading label text from {image}"))?;
        println!("\n[Label text]\n{text}");
        (InputMode::Image, text)
    } else {
        (InputMode::Text, prompt_line(&mut stdin, "Enter supplement label text / ad text: ")?)
    };

    if claim.is_empty() {
        println!("Empty input. Exit.");
        return Ok(());
    }

    let rt = tokio::runtime::Runtime::new()?;
    let retriever = app.retriever(&rt)?;
    let judge = EvidenceJudge::new(OllamaJudge::new(&app.settings.judge)?);
    let checker = ClaimChecker::new(retriever, judge, app.settings.retrieval.top_k);

    tracing::info!(mode = input_mode.as_str(), chars = claim.len(), "checking claim");
    let evidence = checker.retrieve(&claim)?;
    println!("\n[Top evidence]");
    for e in &evidence {
        println!("- score={:.4}  {}  ({})", e.score, e.chunk_id, e.doc_id);
    }

    let judgement = checker.judge(&claim, &evidence, args.policy)?;
    println!("\n[Judge output JSON] policy={}", args.policy);
    println!("{}", serde_json::to_string_pretty(&judgement.verdict)?);
    if !judgement.flags.is_empty() {
        println!("\n[Guardrail flags detected] {:?}", judgement.flags);
    }

    if !args.no_history {
        let db = app.path(&app.settings.data.history_db);
        let history = RunHistory::open(&db)?;
        let id = history.append(&RunRecord::now(
            input_mode,
            claim,
            checker.top_k(),
            evidence,
            judgement.raw,
            judgement.flags,
        ))?;
        tracing::info!(id, db = %db.display(), "run recorded");
        println!("\n[History] Saved to {}", db.display());
    }
    Ok(())
}
