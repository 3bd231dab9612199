//! Answer vocabulary: distinct training answers mapped to contiguous category ids.

use anyhow::{bail, Context, Result};
use log::info;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::manifest::CATEGORY_MAP_JSON;
use crate::sources::QaRow;

/// Label ↔ id mapping, built once and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelVocab {
    labels: Vec<String>,
    ids: HashMap<String, u32>,
}

impl LabelVocab {
    /// Distinct answers in first-seen order; id = position of first occurrence.
    /// Empty answers are not labels.
    pub fn from_rows(rows: &[QaRow]) -> Self {
        Self::from_labels(
            rows.iter()
                .map(|r| r.answer.as_str())
                .filter(|a| !a.is_empty()),
        )
    }

    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let mut vocab = Self::default();
        for label in labels {
            if vocab.ids.contains_key(label) {
                continue;
            }
            let id = vocab.labels.len() as u32;
            vocab.ids.insert(label.to_owned(), id);
            vocab.labels.push(label.to_owned());
        }
        vocab
    }

    pub fn id_of(&self, label: &str) -> Option<u32> {
        self.ids.get(label).copied()
    }

    pub fn label_of(&self, id: u32) -> Option<&str> {
        self.labels.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// id → label, the shape of `categoryid_to_actuallabel.json`.
    pub fn inverse(&self) -> BTreeMap<u32, &str> {
        self.labels
            .iter()
            .enumerate()
            .map(|(id, label)| (id as u32, label.as_str()))
            .collect()
    }

    pub fn write_category_map(&self, json_dir: &Path) -> Result<PathBuf> {
        let path = json_dir.join(CATEGORY_MAP_JSON);
        let file = File::create(&path).with_context(|| format!("writing {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.inverse())
            .with_context(|| format!("serialising {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("flushing {}", path.display()))?;
        info!("Wrote {} category labels → {:?}", self.len(), path);
        Ok(path)
    }

    /// Rebuild the vocabulary from a category map written by `write_category_map`.
    pub fn read_category_map(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let raw: BTreeMap<String, String> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing {}", path.display()))?;

        let mut by_id = BTreeMap::new();
        for (key, label) in raw {
            let id: u32 = key
                .parse()
                .with_context(|| format!("category id {key:?} in {} is not an integer", path.display()))?;
            by_id.insert(id, label);
        }

        let mut vocab = Self::default();
        for (expected, (id, label)) in by_id.into_iter().enumerate() {
            if id as usize != expected {
                bail!(
                    "Category ids in {} are not contiguous: expected {expected}, found {id}",
                    path.display()
                );
            }
            if vocab.ids.insert(label.clone(), id).is_some() {
                bail!("Label {label:?} appears twice in {}", path.display());
            }
            vocab.labels.push(label);
        }
        Ok(vocab)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_first_occurrence() {
        let rows = vec![
            QaRow::new("1", "q", "red"),
            QaRow::new("2", "q", "blue"),
            QaRow::new("3", "q", "red"),
            QaRow::new("4", "q", "green"),
        ];
        let vocab = LabelVocab::from_rows(&rows);
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.id_of("red"), Some(0));
        assert_eq!(vocab.id_of("blue"), Some(1));
        assert_eq!(vocab.id_of("green"), Some(2));
        assert_eq!(vocab.id_of("yellow"), None);
        assert_eq!(vocab.label_of(1), Some("blue"));
        assert_eq!(vocab.label_of(3), None);
    }

    #[test]
    fn empty_answer_gets_no_id() {
        let rows = vec![QaRow::new("1", "q", ""), QaRow::new("2", "q", "red")];
        let vocab = LabelVocab::from_rows(&rows);
        assert_eq!(vocab.len(), 1);
        assert_eq!(vocab.id_of("red"), Some(0));
        assert_eq!(vocab.id_of(""), None);
    }

    #[test]
    fn category_map_round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = LabelVocab::from_labels(["lung", "kidney", "liver"]);
        let path = vocab.write_category_map(dir.path()).unwrap();
        assert!(path.ends_with(CATEGORY_MAP_JSON));

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["0"], "lung");
        assert_eq!(raw["2"], "liver");

        assert_eq!(LabelVocab::read_category_map(&path).unwrap(), vocab);
    }

    #[test]
    fn gap_in_ids_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CATEGORY_MAP_JSON);
        std::fs::write(&path, r#"{"0": "lung", "2": "liver"}"#).unwrap();

        let err = LabelVocab::read_category_map(&path).unwrap_err();
        assert!(err.to_string().contains("not contiguous"));
    }
}
