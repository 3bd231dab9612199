//! Consistency report for written manifests.
//!
//! Checks that every known category id fits `num_classes`, that the label
//! stored on each annotation is the one the category map gives for its id,
//! and optionally that the referenced image files exist.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::annotations::CategoryId;
use crate::manifest::Manifest;
use crate::vocab::LabelVocab;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitReport {
    pub annotations: usize,
    pub classes_used: usize,
    pub unseen: usize,
    pub missing_images: Option<usize>,
    pub label_counts: Vec<(String, usize)>, // most frequent first
    pub problems: Vec<String>,
}

impl SplitReport {
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn top(&self, n: usize) -> &[(String, usize)] {
        &self.label_counts[..n.min(self.label_counts.len())]
    }
}

pub fn check_manifest(manifest: &Manifest, vocab: &LabelVocab, check_images: bool) -> SplitReport {
    let mut report = SplitReport {
        annotations: manifest.annotations.len(),
        ..SplitReport::default()
    };

    if manifest.num_classes != vocab.len() {
        report.problems.push(format!(
            "num_classes is {} but the category map has {} labels",
            manifest.num_classes,
            vocab.len()
        ));
    }

    let mut used = HashSet::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut missing = 0usize;

    for ann in &manifest.annotations {
        *counts.entry(ann.image_label.as_str()).or_default() += 1;
        if check_images && !Path::new(&ann.fpath).is_file() {
            missing += 1;
        }

        match ann.category_id {
            CategoryId::Unseen => report.unseen += 1,
            CategoryId::Known(id) => {
                used.insert(id);
                if id as usize >= manifest.num_classes {
                    report.problems.push(format!(
                        "{}: category {id} outside 0..{}",
                        ann.image_id, manifest.num_classes
                    ));
                    continue;
                }
                match vocab.label_of(id) {
                    Some(label) if label == ann.image_label => {}
                    Some(label) => report.problems.push(format!(
                        "{}: category {id} is {label:?} in the map but labelled {:?}",
                        ann.image_id, ann.image_label
                    )),
                    None => report
                        .problems
                        .push(format!("{}: category {id} missing from the map", ann.image_id)),
                }
            }
        }
    }

    report.classes_used = used.len();
    report.missing_images = check_images.then_some(missing);

    let mut label_counts: Vec<(String, usize)> =
        counts.into_iter().map(|(l, c)| (l.to_owned(), c)).collect();
    label_counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    report.label_counts = label_counts;

    report
}
