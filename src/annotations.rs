use anyhow::{ensure, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::Path;

use crate::sources::QaRow;
use crate::vocab::LabelVocab;

/// Category written for test answers outside the training vocabulary.
pub const UNSEEN_CATEGORY_ID: u32 = 9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryId {
    Known(u32),
    Unseen,
}

impl CategoryId {
    pub fn as_u32(self) -> u32 {
        match self {
            CategoryId::Known(id) => id,
            CategoryId::Unseen => UNSEEN_CATEGORY_ID,
        }
    }

    fn from_u64<E: de::Error>(v: u64) -> Result<Self, E> {
        match u32::try_from(v) {
            Ok(UNSEEN_CATEGORY_ID) => Ok(CategoryId::Unseen),
            Ok(id) => Ok(CategoryId::Known(id)),
            Err(_) => Err(E::custom(format!("category id {v} out of range"))),
        }
    }
}

// always an integer on the wire
impl Serialize for CategoryId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.as_u32())
    }
}

// older manifests carry the sentinel as the string "9999"
impl<'de> Deserialize<'de> for CategoryId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CategoryIdVisitor;

        impl<'de> Visitor<'de> for CategoryIdVisitor {
            type Value = CategoryId;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a category id as integer or numeric string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<CategoryId, E> {
                CategoryId::from_u64(v)
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<CategoryId, E> {
                let v = u64::try_from(v).map_err(|_| E::custom(format!("negative category id {v}")))?;
                CategoryId::from_u64(v)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<CategoryId, E> {
                let v: u64 = v
                    .trim()
                    .parse()
                    .map_err(|_| E::custom(format!("category id {v:?} is not numeric")))?;
                CategoryId::from_u64(v)
            }
        }

        deserializer.deserialize_any(CategoryIdVisitor)
    }
}

/// One BBN annotation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub category_id: CategoryId,
    pub image_id: String,
    pub fpath: String,
    pub image_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapMode {
    // unknown answers are dropped
    Train,
    // unknown answers get the sentinel id
    Test,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapStats {
    pub name: String,
    pub rows: usize,
    pub added: usize,
    pub skipped: usize,
    pub unseen: usize,
}

/// Map `rows` onto category ids and append the records to `annotations`.
pub fn update_annotations(
    rows: &[QaRow],
    images_dir: &Path,
    vocab: &LabelVocab,
    annotations: &mut Vec<Annotation>,
    name: &str,
    mode: MapMode,
) -> Result<MapStats> {
    if mode == MapMode::Test {
        ensure!(
            vocab.len() <= UNSEEN_CATEGORY_ID as usize,
            "{} labels in vocabulary, unseen id {} would collide with a real category",
            vocab.len(),
            UNSEEN_CATEGORY_ID
        );
    }

    info!("Update annotations with {name}...");
    let mut stats = MapStats {
        name: name.to_owned(),
        rows: rows.len(),
        ..MapStats::default()
    };

    let bar = ProgressBar::new(rows.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {pos}/{len} {msg}")?,
    );
    bar.set_message(name.to_owned());

    for row in rows {
        bar.inc(1);
        let category_id = match (vocab.id_of(&row.answer), mode) {
            (Some(id), _) => CategoryId::Known(id),
            (None, MapMode::Train) => {
                stats.skipped += 1;
                continue;
            }
            (None, MapMode::Test) => {
                stats.unseen += 1;
                CategoryId::Unseen
            }
        };

        let fpath = images_dir.join(format!("{}.jpg", row.image_id));
        annotations.push(Annotation {
            category_id,
            image_id: row.image_id.clone(),
            fpath: fpath.to_string_lossy().into_owned(),
            image_label: row.answer.clone(),
        });
        stats.added += 1;
    }
    bar.finish_and_clear();

    info!("Number of not seen labels: {}", stats.unseen);
    if stats.skipped > 0 {
        info!("Skipped {} {name} rows with answers outside the vocabulary", stats.skipped);
    }
    Ok(stats)
}
