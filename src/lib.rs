// Shared pieces of the VQA-Med → BBN json conversion.
//
// load → drop yes/no → vocabulary → map rows → write manifests

pub mod annotations;
pub mod check;
pub mod filter;
pub mod logging;
pub mod manifest;
pub mod pipeline;
pub mod sources;
pub mod vocab;

pub use annotations::{update_annotations, Annotation, CategoryId, MapMode, MapStats};
pub use manifest::Manifest;
pub use pipeline::{create_jsons, RunSummary};
pub use sources::{DatasetPaths, QaRow};
pub use vocab::LabelVocab;
