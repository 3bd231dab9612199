use anyhow::{Context, Result};
use log::info;
use std::fs::create_dir_all;
use std::path::Path;

use crate::annotations::{update_annotations, MapMode};
use crate::filter::drop_binary;
use crate::manifest::{Manifest, TEST_JSON, TRAIN_JSON, VALID_JSON};
use crate::sources::{load_all, DatasetPaths, Source};
use crate::vocab::LabelVocab;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub num_classes: usize,
    pub train: usize,
    pub valid: usize,
    pub test: usize,
    pub unseen: usize,
}

// yes/no rows out, for the sources that ask for it
fn multiclass(mut source: Source) -> Source {
    if source.spec.drop_binary {
        let (rows, dropped) = drop_binary(source.rows);
        info!("Dropped {dropped} yes/no rows from {}", source.spec.name);
        source.rows = rows;
    }
    source
}

/// Build train/valid/test manifests plus the category map under `json_dir`.
pub fn create_jsons(paths: &DatasetPaths, json_dir: &Path) -> Result<RunSummary> {
    let sources = load_all(paths)?;
    let train2020 = multiclass(sources.train2020);
    let val2020 = multiclass(sources.val2020);
    let clef2019 = multiclass(sources.clef2019);
    let val2021 = multiclass(sources.val2021);
    let test2021 = multiclass(sources.test2021);

    create_dir_all(json_dir).with_context(|| format!("creating {}", json_dir.display()))?;

    info!("Creating train json for BBN ensemble training...");
    let vocab = LabelVocab::from_rows(&train2020.rows);
    info!("Vocabulary: {} labels from {}", vocab.len(), train2020.spec.name);
    vocab.write_category_map(json_dir)?;

    let mut annotations = Vec::new();
    for source in [&train2020, &val2020, &clef2019, &val2021] {
        update_annotations(
            &source.rows,
            &source.images_path(),
            &vocab,
            &mut annotations,
            source.spec.name,
            MapMode::Train,
        )?;
    }
    let train = Manifest::new(vocab.len(), annotations);

    // val2021 is also part of train above
    info!("Creating valid json for BBN...");
    let mut val_annotations = Vec::new();
    update_annotations(
        &val2021.rows,
        &val2021.images_path(),
        &vocab,
        &mut val_annotations,
        val2021.spec.name,
        MapMode::Train,
    )?;
    let valid = Manifest::new(vocab.len(), val_annotations);

    info!("Creating test json for BBN...");
    let mut test_annotations = Vec::new();
    let test_stats = update_annotations(
        &test2021.rows,
        &test2021.images_path(),
        &vocab,
        &mut test_annotations,
        test2021.spec.name,
        MapMode::Test,
    )?;
    let test = Manifest::new(vocab.len(), test_annotations);

    train.write(&json_dir.join(TRAIN_JSON))?;
    valid.write(&json_dir.join(VALID_JSON))?;
    test.write(&json_dir.join(TEST_JSON))?;

    Ok(RunSummary {
        num_classes: vocab.len(),
        train: train.annotations.len(),
        valid: valid.annotations.len(),
        test: test.annotations.len(),
        unseen: test_stats.unseen,
    })
}
