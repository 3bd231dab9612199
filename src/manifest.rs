use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::annotations::Annotation;

pub const TRAIN_JSON: &str = "train.json";
pub const VALID_JSON: &str = "valid.json";
pub const TEST_JSON: &str = "test.json";
pub const CATEGORY_MAP_JSON: &str = "categoryid_to_actuallabel.json";

/// Per-split BBN input: class count plus the annotation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub num_classes: usize,
    pub annotations: Vec<Annotation>,
}

impl Manifest {
    pub fn new(num_classes: usize, annotations: Vec<Annotation>) -> Self {
        Self {
            num_classes,
            annotations,
        }
    }

    // overwrites whatever is at `path`
    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("writing {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .with_context(|| format!("serialising {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("flushing {}", path.display()))?;
        info!("Wrote {} annotations → {:?}", self.annotations.len(), path);
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::CategoryId;

    #[test]
    fn written_shape_matches_bbn_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TEST_JSON);
        let manifest = Manifest::new(
            4,
            vec![Annotation {
                category_id: CategoryId::Unseen,
                image_id: "synpic1".into(),
                fpath: "imgs/synpic1.jpg".into(),
                image_label: "glioma".into(),
            }],
        );
        manifest.write(&path).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["num_classes"], 4);
        assert_eq!(raw["annotations"][0]["category_id"], 9999);
        assert_eq!(raw["annotations"][0]["fpath"], "imgs/synpic1.jpg");
        assert_eq!(raw["annotations"][0]["image_label"], "glioma");

        assert_eq!(Manifest::read(&path).unwrap(), manifest);
    }

    #[test]
    fn existing_file_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TRAIN_JSON);
        std::fs::write(&path, "stale").unwrap();

        Manifest::new(0, Vec::new()).write(&path).unwrap();
        assert_eq!(Manifest::read(&path).unwrap().annotations.len(), 0);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn full_device_fails_the_write() {
        let err = Manifest::new(0, Vec::new())
            .write(Path::new("/dev/full"))
            .unwrap_err();
        assert!(format!("{err:#}").contains("/dev/full"));
    }
}
