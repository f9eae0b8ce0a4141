use anyhow::Context as _;
use clap::Parser;
use rdgen::codegen::Codegen;
use std::{fs, path::PathBuf, time::Instant};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The nonterminal parsed by the generated entry point.
    /// Defaults to the first rule in the grammar file.
    #[arg(short, long)]
    goal: Option<String>,

    /// Specify the path of generated .rs file.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// The path of grammar definition file.
    input: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    tracing::debug!("parsed CLI args = {:?}", args);

    process_file(&args)
        .with_context(|| anyhow::anyhow!("errored during processing {}", args.input.display()))?;

    Ok(())
}

fn process_file(args: &Args) -> anyhow::Result<()> {
    let in_file = fs::canonicalize(&args.input) //
        .context("failed to canonicalize the input file name")?;

    let out_file = args
        .output
        .clone()
        .unwrap_or_else(|| in_file.with_extension("rs"));
    let backup_file = out_file.with_extension("rs.bak");
    let expanded_file = out_file.with_extension("expanded");
    let plan_file = out_file.with_extension("plan");

    let s = Instant::now();
    let grammar = rdgen::syntax::parse_file(&in_file)?;
    tracing::info!("parse_file: {:?} elapsed", s.elapsed());

    let goal = match &args.goal {
        Some(goal) => goal.as_str(),
        None => grammar
            .first_nonterminal()
            .context("the grammar file defines no rules")?,
    };

    let s = Instant::now();
    let compiled = rdgen::compile(&grammar, goal)?;
    tracing::info!("compile: {:?} elapsed", s.elapsed());

    // dump results.
    if out_file.exists() {
        fs::copy(&out_file, &backup_file).with_context(|| {
            anyhow::anyhow!(
                "failed to backup the output file to {}",
                backup_file.display()
            )
        })?;
    }

    let codegen = Codegen::new(&compiled.plan);
    fs::write(&out_file, codegen.to_string()).with_context(|| {
        anyhow::anyhow!("failed to write generated parser to {}", out_file.display())
    })?;
    fs::write(&expanded_file, compiled.grammar.to_string()).with_context(|| {
        anyhow::anyhow!("failed to write the expanded grammar to {}", expanded_file.display())
    })?;
    fs::write(&plan_file, compiled.plan.to_string()).with_context(|| {
        anyhow::anyhow!("failed to write the parse plan to {}", plan_file.display())
    })?;

    Ok(())
}
