use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use log::{info, warn};
use std::path::{Path, PathBuf};

// One QA example, whatever the source file looked like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QaRow {
    pub image_id: String,
    pub question: Option<String>,
    pub answer: String,
    pub descriptions: Vec<String>, // descp/descp2 of the 2021 test reference file
}

impl QaRow {
    pub fn new(image_id: impl Into<String>, question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            image_id: image_id.into(),
            question: Some(question.into()),
            answer: answer.into(),
            descriptions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    // no header line, columns named positionally
    Headerless(&'static [&'static str]),
    // first line names the columns
    Header,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSpec {
    pub name: &'static str,
    pub qa_file: &'static str,
    pub images_dir: &'static str,
    pub layout: Layout,
    pub drop_binary: bool,
}

const QA_COLUMNS: &[&str] = &["imgid", "question", "answer"];
const REFERENCE_COLUMNS: &[&str] = &["imgid", "answer", "descp", "descp2"];

pub const TRAIN_2020: SourceSpec = SourceSpec {
    name: "train2020",
    qa_file: "VQAnswering_2020_Train_QA_pairs.txt",
    images_dir: "VQAnswering_2020_Train_images",
    layout: Layout::Headerless(QA_COLUMNS),
    drop_binary: true,
};

pub const VAL_2020: SourceSpec = SourceSpec {
    name: "val2020",
    qa_file: "VQAnswering_2020_Val_QA_Pairs.txt",
    images_dir: "VQAnswering_2020_Val_images",
    layout: Layout::Headerless(QA_COLUMNS),
    drop_binary: true,
};

pub const CLEF_2019: SourceSpec = SourceSpec {
    name: "clef2019",
    qa_file: "combined_train_val_test.csv",
    images_dir: "images",
    layout: Layout::Header,
    drop_binary: true,
};

pub const VAL_2021: SourceSpec = SourceSpec {
    name: "val2021",
    qa_file: "VQA-Med-2021-VQAnswering-Task1-New-ValidationSet.txt",
    images_dir: "ImageCLEF-2021-VQA-Med-New-Validation-Images",
    layout: Layout::Headerless(QA_COLUMNS),
    drop_binary: false,
};

pub const TEST_2021: SourceSpec = SourceSpec {
    name: "test 2021",
    qa_file: "Task1-VQA-2021-TestSet-ReferenceAnswers.txt",
    images_dir: "Task1-VQA-2021-TestSet-Images/VQA-500-Images",
    layout: Layout::Headerless(REFERENCE_COLUMNS),
    drop_binary: false,
};

/// The five dataset directories, in command-line order.
#[derive(Debug, Clone)]
pub struct DatasetPaths {
    pub train2020: PathBuf,
    pub val2020: PathBuf,
    pub clef2019: PathBuf,
    pub val2021: PathBuf,
    pub test2021: PathBuf,
}

/// A loaded table together with where it came from.
#[derive(Debug, Clone)]
pub struct Source {
    pub spec: SourceSpec,
    pub dir: PathBuf,
    pub rows: Vec<QaRow>,
}

impl Source {
    pub fn images_path(&self) -> PathBuf {
        self.dir.join(self.spec.images_dir)
    }
}

#[derive(Debug, Clone)]
pub struct Sources {
    pub train2020: Source,
    pub val2020: Source,
    pub clef2019: Source,
    pub val2021: Source,
    pub test2021: Source,
}

pub fn load_all(paths: &DatasetPaths) -> Result<Sources> {
    Ok(Sources {
        train2020: load_source(TRAIN_2020, &paths.train2020)?,
        val2020: load_source(VAL_2020, &paths.val2020)?,
        clef2019: load_source(CLEF_2019, &paths.clef2019)?,
        val2021: load_source(VAL_2021, &paths.val2021)?,
        test2021: load_source(TEST_2021, &paths.test2021)?,
    })
}

// column positions resolved once per file
struct Columns {
    imgid: usize,
    answer: usize,
    question: Option<usize>,
    descriptions: Vec<usize>,
}

impl Columns {
    fn resolve(names: &[&str], path: &Path) -> Result<Self> {
        let find = |name: &str| names.iter().position(|n| n.trim() == name);
        let Some(imgid) = find("imgid") else {
            bail!("Missing imgid column in {}", path.display());
        };
        let Some(answer) = find("answer") else {
            bail!("Missing answer column in {}", path.display());
        };
        Ok(Self {
            imgid,
            answer,
            question: find("question"),
            descriptions: ["descp", "descp2"].iter().filter_map(|&n| find(n)).collect(),
        })
    }

    fn row(&self, record: &StringRecord) -> Option<QaRow> {
        let image_id = record.get(self.imgid).filter(|s| !s.is_empty())?;
        // an empty answer is kept; it never matches a vocabulary label
        let answer = record.get(self.answer).unwrap_or("");
        Some(QaRow {
            image_id: image_id.to_owned(),
            question: self
                .question
                .and_then(|i| record.get(i))
                .map(str::to_owned),
            answer: answer.to_owned(),
            descriptions: self
                .descriptions
                .iter()
                .map(|&i| record.get(i).unwrap_or("").to_owned())
                .collect(),
        })
    }
}

/// Read `dir/<qa_file>` as a pipe-delimited table.
pub fn load_source(spec: SourceSpec, dir: &Path) -> Result<Source> {
    let path = dir.join(spec.qa_file);
    let rows = read_rows(&path, spec.layout)?;
    info!("Loaded {} rows for {} from {:?}", rows.len(), spec.name, path);
    Ok(Source {
        spec,
        dir: dir.to_path_buf(),
        rows,
    })
}

pub fn read_rows(path: &Path, layout: Layout) -> Result<Vec<QaRow>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(layout == Layout::Header)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let columns = match layout {
        Layout::Headerless(names) => Columns::resolve(names, path)?,
        Layout::Header => {
            let headers = reader
                .headers()
                .with_context(|| format!("reading header of {}", path.display()))?
                .clone();
            let names: Vec<&str> = headers.iter().collect();
            Columns::resolve(&names, path)?
        }
    };

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("parsing {}", path.display()))?;
        match columns.row(&record) {
            Some(row) => rows.push(row),
            None => warn!(
                "Skipping record {} of {:?}: empty imgid",
                line + 1,
                path
            ),
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn headerless_rows_use_assigned_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qa.txt");
        fs::write(&path, "synpic1|what organ?|lung\nsynpic2|is it normal?|yes\n").unwrap();

        let rows = read_rows(&path, Layout::Headerless(QA_COLUMNS)).unwrap();
        assert_eq!(
            rows,
            vec![
                QaRow::new("synpic1", "what organ?", "lung"),
                QaRow::new("synpic2", "is it normal?", "yes"),
            ]
        );
    }

    #[test]
    fn header_source_is_looked_up_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("combined.csv");
        fs::write(
            &path,
            "category|imgid|question|answer\nplane|synpic9|which plane?|axial\n",
        )
        .unwrap();

        let rows = read_rows(&path, Layout::Header).unwrap();
        assert_eq!(rows, vec![QaRow::new("synpic9", "which plane?", "axial")]);
    }

    #[test]
    fn reference_answers_keep_descriptions_and_no_question() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.txt");
        fs::write(&path, "synpic5|glioma|brain tumour|primary\nsynpic6|fracture\n").unwrap();

        let rows = read_rows(&path, Layout::Headerless(REFERENCE_COLUMNS)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].question, None);
        assert_eq!(rows[0].answer, "glioma");
        assert_eq!(rows[0].descriptions, vec!["brain tumour", "primary"]);
        assert_eq!(rows[1].descriptions, vec!["", ""]);
    }

    #[test]
    fn empty_answer_is_kept_and_empty_imgid_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qa.txt");
        fs::write(&path, "synpic1|q|\n|q|cyst\nsynpic3|q|cyst\n").unwrap();

        let rows = read_rows(&path, Layout::Headerless(QA_COLUMNS)).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].image_id, "synpic1");
        assert_eq!(rows[0].answer, "");
        assert_eq!(rows[1].image_id, "synpic3");
    }

    #[test]
    fn header_without_answer_column_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("combined.csv");
        fs::write(&path, "imgid|question\nsynpic1|q\n").unwrap();

        let err = read_rows(&path, Layout::Header).unwrap_err();
        assert!(err.to_string().contains("Missing answer column"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_source(TRAIN_2020, dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains(TRAIN_2020.qa_file));
    }

    #[test]
    fn images_path_joins_source_dir() {
        let source = Source {
            spec: TEST_2021,
            dir: PathBuf::from("/data/test2021"),
            rows: Vec::new(),
        };
        assert_eq!(
            source.images_path(),
            PathBuf::from("/data/test2021/Task1-VQA-2021-TestSet-Images/VQA-500-Images")
        );
    }
}
