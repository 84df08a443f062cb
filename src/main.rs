use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::Value as JsonValue;

use rusty_cohort::data::fetch::DataladFetcher;
use rusty_cohort::{AlignOrder, Aligner, InferEngine, PairedDataset, Spec};

/// Infer and align the input and target configs of a dataset.
#[derive(Parser)]
#[command(name = "rusty-cohort")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Dataset root that patterns and table files resolve against
    #[arg(short, long)]
    base_dir: PathBuf,

    /// JSON file of the form {"x": <spec>, "y": <spec>}
    #[arg(short, long, conflicts_with_all = ["x", "y"])]
    spec: Option<PathBuf>,

    /// Input-side spec as inline JSON
    #[arg(long, requires = "y")]
    x: Option<String>,

    /// Target-side spec as inline JSON
    #[arg(long, requires = "x")]
    y: Option<String>,

    /// Fetch lazy files with `datalad get`
    #[arg(long)]
    datalad: bool,

    /// Reorder values to follow the sorted ids after alignment
    #[arg(long)]
    canonical_order: bool,

    /// Number of samples to materialise and print
    #[arg(short = 'n', long, default_value = "5")]
    show: usize,
}

fn read_specs(cli: &Cli) -> Result<(JsonValue, JsonValue)> {
    if let Some(path) = &cli.spec {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading spec file {}", path.display()))?;
        let mut root: JsonValue = serde_json::from_str(&text).context("parsing spec file")?;
        let x = root.get_mut("x").map(JsonValue::take).context("spec file has no 'x'")?;
        let y = root.get_mut("y").map(JsonValue::take).context("spec file has no 'y'")?;
        return Ok((x, y));
    }
    match (&cli.x, &cli.y) {
        (Some(x), Some(y)) => Ok((
            serde_json::from_str(x).context("parsing --x")?,
            serde_json::from_str(y).context("parsing --y")?,
        )),
        _ => bail!("pass either --spec or both --x and --y"),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let (x, y) = read_specs(&cli)?;
    let x = Spec::from_json(&x).context("classifying x spec")?;
    let y = Spec::from_json(&y).context("classifying y spec")?;

    let mut engine = InferEngine::new();
    if cli.datalad {
        engine = engine.with_fetcher(Arc::new(DataladFetcher::default()));
    }
    let order = if cli.canonical_order {
        AlignOrder::Canonical
    } else {
        AlignOrder::Preserve
    };

    let dataset = PairedDataset::build(&engine, &Aligner::new(order), &cli.base_dir, x, y)
        .context("building dataset")?;

    println!(
        "{} samples (x: {} config, y: {} config)",
        dataset.len(),
        dataset.x().kind(),
        dataset.y().kind()
    );
    for i in 0..dataset.len().min(cli.show) {
        let (x, y) = dataset
            .get(i)
            .with_context(|| format!("materialising sample {i}"))?;
        let id = dataset
            .ids()
            .and_then(|ids| ids.get(i))
            .map_or("-", String::as_str);
        println!("{i:>4}  {id:<16}  {}  ->  {}", x.describe(), y.describe());
    }
    Ok(())
}
