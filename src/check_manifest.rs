/*
cargo run --bin check_manifest -- \
    --json-dir data/bbn_jsons \
    --top 10 \
    --check-images
*/

use anyhow::{bail, Result};
use clap::Parser;
use log::warn;
use std::path::PathBuf;

use bbn_jsons::check::check_manifest;
use bbn_jsons::logging::init_logging;
use bbn_jsons::manifest::{CATEGORY_MAP_JSON, TEST_JSON, TRAIN_JSON, VALID_JSON};
use bbn_jsons::{LabelVocab, Manifest};

// CLI parameters
#[derive(Parser, Debug)]
#[command(version, about = "Summarise and sanity-check BBN manifests")]
struct Args {
    // Directory holding train/valid/test jsons and the category map
    #[arg(long)]
    json_dir: PathBuf,

    // How many of the most frequent labels to list per split
    #[arg(long, default_value_t = 5)]
    top: usize,

    // Also verify that every fpath exists
    #[arg(long, default_value_t = false)]
    check_images: bool,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_dir, "check_manifest")?;

    let vocab = LabelVocab::read_category_map(&args.json_dir.join(CATEGORY_MAP_JSON))?;
    println!("Category map: {} labels", vocab.len());

    let mut failed = 0usize;
    for name in [TRAIN_JSON, VALID_JSON, TEST_JSON] {
        let manifest = Manifest::read(&args.json_dir.join(name))?;
        let report = check_manifest(&manifest, &vocab, args.check_images);

        println!("\n=== {name} ===");
        println!("Annotations   : {}", report.annotations);
        println!("Classes used  : {}/{}", report.classes_used, manifest.num_classes);
        println!("Unseen labels : {}", report.unseen);
        if let Some(missing) = report.missing_images {
            println!("Missing images: {missing}");
        }
        for (label, count) in report.top(args.top) {
            println!("  {count:>6}  {label}");
        }

        for problem in &report.problems {
            warn!("{name}: {problem}");
        }
        if !report.is_ok() {
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{failed} manifest(s) failed the consistency check");
    }
    Ok(())
}
