/*
cargo run --release --bin create_jsons -- \
    data/VQA-Med-2020-Task1-VQAnswering-TrainingSet \
    data/VQA-Med-2020-Task1-VQAnswering-ValidationSet \
    data/ImageClef-2019-VQA-Med \
    data/VQA-Med-2021-Task1-New-ValidationSet \
    data/Task1-VQA-2021-TestSet-w-GroundTruth \
    data/bbn_jsons
*/

use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::PathBuf;

use bbn_jsons::logging::init_logging;
use bbn_jsons::{create_jsons, DatasetPaths};

// Create input jsons using train, validation and test sets for BBN Orchestra.
#[derive(Parser, Debug)]
#[command(version, about = "Create input jsons using train, validation and test sets for BBN Orchestra.")]
struct Cli {
    /// Path to the train2020 directory containing images folder and txt file
    train2020path: PathBuf,
    /// Path to the val2020 directory containing images folder and txt file
    val2020path: PathBuf,
    /// Path to the clef2019 directory containing images folder and combined csv
    clef2019path: PathBuf,
    /// Path to the val2021 directory containing images folder and txt file
    val2021path: PathBuf,
    /// Path to the test2021 directory containing images folder and reference answers
    test2021path: PathBuf,
    /// Output directory for the jsons
    jsonpath: PathBuf,

    /// Directory for the run log
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_path = init_logging(&cli.log_dir, "create_jsons")?;
    info!("Starting BBN json creation");

    let paths = DatasetPaths {
        train2020: cli.train2020path,
        val2020: cli.val2020path,
        clef2019: cli.clef2019path,
        val2021: cli.val2021path,
        test2021: cli.test2021path,
    };
    let summary = create_jsons(&paths, &cli.jsonpath)?;
    info!("All done successfully.");

    println!("\n=== BBN json summary ===");
    println!("Classes            : {}", summary.num_classes);
    println!("Train annotations  : {}", summary.train);
    println!("Valid annotations  : {}", summary.valid);
    println!("Test annotations   : {}", summary.test);
    println!("Unseen test labels : {}", summary.unseen);
    println!("Output dir         : {:?}", cli.jsonpath);
    println!("Log file           : {:?}", log_path);

    Ok(())
}
