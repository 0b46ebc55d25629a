//! Guarded auxiliary stage edits
//!
//! Date window, recruiter assignment and ad-hoc document requirements. Each
//! builder checks its preconditions and returns the request to submit; a
//! stage whose progress is `approved` rejects every edit.

use chrono::NaiveDate;
use thiserror::Error;

use crate::api::types::{
    AddStageDocument, DeleteStageDocument, UpdateStageDates, UpdateStageRecruiters,
};
use crate::model::StageProgress;

/// Client-side rejection of a stage edit
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("Stage {0} is approved and can no longer be edited")]
    StageApproved(String),

    #[error("End date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("Select at least one recruiter")]
    NoRecruiterSelected,

    #[error("Document name is required")]
    BlankDocumentName,

    #[error("Document {0} is not an additional requirement of this stage")]
    UnknownDocument(String),

    #[error("No edit in progress")]
    NoEditInProgress,
}

/// Approved stage history is immutable
pub fn ensure_editable(progress: &StageProgress) -> Result<(), EditError> {
    if progress.is_approved() {
        return Err(EditError::StageApproved(progress.stage_id.clone()));
    }
    Ok(())
}

/// Start/end window of a stage; either bound may be open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn from_progress(progress: &StageProgress) -> Self {
        Self::new(progress.start_date, progress.end_date)
    }

    /// Whether a date picker should offer `date` as the end date
    pub fn is_selectable_end(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |start| date >= start)
    }

    /// Whether a date picker should offer `date` as the start date
    pub fn is_selectable_start(&self, date: NaiveDate) -> bool {
        self.end.map_or(true, |end| date <= end)
    }

    pub fn validate(&self) -> Result<(), EditError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if end < start => Err(EditError::EndBeforeStart { start, end }),
            _ => Ok(()),
        }
    }
}

pub fn date_window_request(
    job_id: &str,
    progress: &StageProgress,
    window: DateWindow,
) -> Result<UpdateStageDates, EditError> {
    ensure_editable(progress)?;
    window.validate()?;
    Ok(UpdateStageDates {
        job_id: job_id.to_string(),
        stage_id: progress.stage_id.clone(),
        start_date: window.start,
        end_date: window.end,
    })
}

/// Recruiter ids are trimmed and deduplicated, keeping first occurrence
pub fn recruiter_request(
    job_id: &str,
    progress: &StageProgress,
    recruiter_ids: &[String],
) -> Result<UpdateStageRecruiters, EditError> {
    ensure_editable(progress)?;

    let mut ids: Vec<String> = Vec::with_capacity(recruiter_ids.len());
    for id in recruiter_ids.iter().map(|id| id.trim()) {
        if !id.is_empty() && !ids.iter().any(|existing| existing == id) {
            ids.push(id.to_string());
        }
    }
    if ids.is_empty() {
        return Err(EditError::NoRecruiterSelected);
    }

    Ok(UpdateStageRecruiters {
        job_id: job_id.to_string(),
        stage_id: progress.stage_id.clone(),
        recruiter_ids: ids,
    })
}

pub fn add_document_request(
    job_id: &str,
    progress: &StageProgress,
    document_name: &str,
) -> Result<AddStageDocument, EditError> {
    ensure_editable(progress)?;
    let document_name = document_name.trim();
    if document_name.is_empty() {
        return Err(EditError::BlankDocumentName);
    }
    Ok(AddStageDocument {
        job_id: job_id.to_string(),
        stage_id: progress.stage_id.clone(),
        document_name: document_name.to_string(),
    })
}

pub fn remove_document_request(
    job_id: &str,
    progress: &StageProgress,
    document_id: &str,
) -> Result<DeleteStageDocument, EditError> {
    ensure_editable(progress)?;
    let document = progress
        .additional_document(document_id)
        .ok_or_else(|| EditError::UnknownDocument(document_id.to_string()))?;
    Ok(DeleteStageDocument {
        job_id: job_id.to_string(),
        document_id: document.id.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AdditionalDocument, StageStatus};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn progress(status: StageStatus) -> StageProgress {
        let mut sp = StageProgress::new("s1", "Screening");
        sp.stage_status = status;
        sp.additional_documents.push(AdditionalDocument {
            id: "d1".to_string(),
            document_name: "Visa".to_string(),
        });
        sp
    }

    #[test]
    fn test_approved_stage_blocks_every_edit() {
        let sp = progress(StageStatus::Approved);
        let blocked = EditError::StageApproved("s1".to_string());

        assert_eq!(date_window_request("j", &sp, DateWindow::default()).unwrap_err(), blocked);
        assert_eq!(recruiter_request("j", &sp, &["r1".to_string()]).unwrap_err(), blocked);
        assert_eq!(add_document_request("j", &sp, "Visa").unwrap_err(), blocked);
        assert_eq!(remove_document_request("j", &sp, "d1").unwrap_err(), blocked);
    }

    #[test]
    fn test_date_window_rules() {
        let window = DateWindow::new(Some(date(10)), None);
        assert!(window.is_selectable_end(date(10)));
        assert!(!window.is_selectable_end(date(9)));
        assert!(DateWindow::new(None, Some(date(5))).is_selectable_start(date(5)));

        let sp = progress(StageStatus::Pending);
        let err = date_window_request("j", &sp, DateWindow::new(Some(date(10)), Some(date(3))));
        assert_eq!(
            err.unwrap_err(),
            EditError::EndBeforeStart {
                start: date(10),
                end: date(3)
            }
        );

        let req = date_window_request("j", &sp, DateWindow::new(Some(date(3)), Some(date(3)))).unwrap();
        assert_eq!(req.stage_id, "s1");
        assert_eq!(req.end_date, Some(date(3)));
    }

    #[test]
    fn test_recruiter_ids_cleaned() {
        let sp = progress(StageStatus::Pending);
        let ids = vec![" r1 ".to_string(), "r2".to_string(), "r1".to_string(), "".to_string()];
        let req = recruiter_request("j", &sp, &ids).unwrap();
        assert_eq!(req.recruiter_ids, vec!["r1", "r2"]);

        let err = recruiter_request("j", &sp, &["  ".to_string()]).unwrap_err();
        assert_eq!(err, EditError::NoRecruiterSelected);
    }

    #[test]
    fn test_document_requests() {
        let sp = progress(StageStatus::Rejected);
        assert_eq!(add_document_request("j", &sp, " \t").unwrap_err(), EditError::BlankDocumentName);
        assert_eq!(add_document_request("j", &sp, " Visa ").unwrap().document_name, "Visa");

        assert_eq!(remove_document_request("j", &sp, "d1").unwrap().document_id, "d1");
        assert_eq!(
            remove_document_request("j", &sp, "d2").unwrap_err(),
            EditError::UnknownDocument("d2".to_string())
        );
    }
}
