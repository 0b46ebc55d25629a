//! Document requirement resolution
//!
//! A stage's required set is the template's `requiredDocuments` plus any
//! ad-hoc `additionalDocuments`, deduplicated. Matching against uploads is by
//! exact, case-sensitive name.

use std::collections::{BTreeSet, HashSet};

use crate::model::StageProgress;

/// Full set of required document names for a stage
pub fn required_documents(progress: &StageProgress) -> BTreeSet<String> {
    required_in_order(progress)
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Names of documents uploaded for a stage
pub fn uploaded_documents(progress: &StageProgress) -> HashSet<&str> {
    progress
        .uploaded_documents
        .iter()
        .filter_map(|d| d.name())
        .collect()
}

/// True when every required document has been uploaded (vacuously true when
/// nothing is required)
pub fn is_document_set_satisfied(progress: &StageProgress) -> bool {
    let uploaded = uploaded_documents(progress);
    required_in_order(progress)
        .iter()
        .all(|name| uploaded.contains(name))
}

/// Required documents not yet uploaded, base requirements first
pub fn missing_documents(progress: &StageProgress) -> Vec<String> {
    let uploaded = uploaded_documents(progress);
    required_in_order(progress)
        .into_iter()
        .filter(|name| !uploaded.contains(name))
        .map(str::to_string)
        .collect()
}

fn required_in_order(progress: &StageProgress) -> Vec<&str> {
    let mut seen = HashSet::new();
    progress
        .base_requirements()
        .iter()
        .map(String::as_str)
        .chain(
            progress
                .additional_documents
                .iter()
                .map(|d| d.document_name.as_str()),
        )
        .filter(|name| seen.insert(*name))
        .collect()
}
