//! Recruiter session over one job's pipeline
//!
//! Holds the last fetched [`PipelineState`] plus the transient inputs of an
//! interaction (selected candidate, comments, an edit being prepared). Every
//! mutation validates locally, submits once, and only after the API confirms
//! success refetches the state and clears the transient inputs. A failed
//! submission leaves everything as it was so the recruiter can retry.
//!
//! Operations take `&mut self`, so a second submission cannot start while
//! one is in flight.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use hrp_common::api::PipelineApi;
use hrp_common::board::{Board, BoardQuery};
use hrp_common::config::SessionConfig;
use hrp_common::edits::{
    add_document_request, date_window_request, ensure_editable, recruiter_request,
    remove_document_request, DateWindow, EditError,
};
use hrp_common::model::{Candidate, PipelineState, StageProgress};
use hrp_common::{build_transition_payload, can_move_candidate, Eligibility};
use hrp_common::{Error, Result, ValidationError};

/// Candidate (and the stage they were selected in) targeted by move/finish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub candidate_id: String,
    pub stage_id: String,
}

/// Stage edit being prepared, not yet submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingEdit {
    Dates {
        candidate_id: String,
        stage_id: String,
        window: DateWindow,
    },
    Recruiters {
        candidate_id: String,
        stage_id: String,
        recruiter_ids: Vec<String>,
    },
}

pub struct PipelineSession<A: PipelineApi> {
    api: A,
    job_id: String,
    refresh: SessionConfig,
    state: Option<PipelineState>,
    selected: Option<Selection>,
    comments: String,
    pending_edit: Option<PendingEdit>,
}

impl<A: PipelineApi> PipelineSession<A> {
    pub fn new(api: A, job_id: impl Into<String>, refresh: SessionConfig) -> Self {
        Self {
            api,
            job_id: job_id.into(),
            refresh: refresh.normalized(),
            state: None,
            selected: None,
            comments: String::new(),
            pending_edit: None,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Fetch the job's pipeline state, replacing any cached copy
    pub async fn load(&mut self) -> Result<&PipelineState> {
        let state = self.api.fetch_pipeline_state(&self.job_id).await?;
        Ok(self.state.insert(state))
    }

    /// Last fetched state; `None` before [`load`](Self::load) or after a
    /// failed refetch
    pub fn state(&self) -> Option<&PipelineState> {
        self.state.as_ref()
    }

    fn loaded(&self) -> Result<&PipelineState> {
        self.state
            .as_ref()
            .ok_or_else(|| Error::NotFound(format!("pipeline state for job {}", self.job_id)))
    }

    pub fn candidate(&self, candidate_id: &str) -> Result<&Candidate> {
        self.loaded()?
            .candidate(candidate_id)
            .ok_or_else(|| Error::NotFound(format!("candidate {}", candidate_id)))
    }

    fn progress(&self, candidate_id: &str, stage_id: &str) -> Result<&StageProgress> {
        self.candidate(candidate_id)?
            .progress_for(stage_id)
            .ok_or_else(|| {
                Error::NotFound(format!(
                    "stage {} progress for candidate {}",
                    stage_id, candidate_id
                ))
            })
    }

    pub fn board(&self, query: &BoardQuery) -> Result<Board> {
        Ok(Board::build(self.loaded()?, query))
    }

    pub fn eligibility(&self, candidate_id: &str, stage_id: &str) -> Result<Eligibility> {
        Ok(can_move_candidate(self.candidate(candidate_id)?, stage_id))
    }

    // ------------------------------------------------------------------
    // Move / finish
    // ------------------------------------------------------------------

    /// Select a candidate in their current stage
    pub fn select_candidate(&mut self, candidate_id: &str) -> Result<()> {
        let stage_id = self.candidate(candidate_id)?.current_stage_id.clone();
        debug!(candidate_id = %candidate_id, stage_id = %stage_id, "Candidate selected");
        self.selected = Some(Selection {
            candidate_id: candidate_id.to_string(),
            stage_id,
        });
        Ok(())
    }

    pub fn selected(&self) -> Option<&Selection> {
        self.selected.as_ref()
    }

    pub fn set_comments(&mut self, comments: impl Into<String>) {
        self.comments = comments.into();
    }

    pub fn comments(&self) -> &str {
        &self.comments
    }

    /// Move the selected candidate to `next_stage_id`, or to the default
    /// successor of their stage when none is given
    pub async fn move_selected(&mut self, next_stage_id: Option<&str>) -> Result<()> {
        let (selection, candidate) = self.selected_candidate()?;
        let next_stage_id = match next_stage_id {
            Some(id) => id.to_string(),
            None => self
                .loaded()?
                .timeline_for(candidate)
                .default_next_stage(&selection.stage_id)
                .map(|s| s.stage_id.clone())
                .ok_or_else(|| ValidationError::NoNextStage(selection.stage_id.clone()))?,
        };

        let payload = build_transition_payload(
            self.loaded()?,
            &self.job_id,
            candidate,
            &selection.stage_id,
            Some(&next_stage_id),
            &self.comments,
        )?;

        self.api.move_candidate(&payload).await?;
        info!(
            job_id = %self.job_id,
            candidate_id = %selection.candidate_id,
            from = %selection.stage_id,
            to = %next_stage_id,
            "Candidate moved"
        );

        self.after_move().await
    }

    /// Complete the pipeline for the selected candidate; only from the last
    /// stage of their timeline
    pub async fn finish_selected(&mut self) -> Result<()> {
        let (selection, candidate) = self.selected_candidate()?;
        if !self.loaded()?.timeline_for(candidate).is_last(&selection.stage_id) {
            return Err(ValidationError::NotLastStage(selection.stage_id.clone()).into());
        }

        let payload = build_transition_payload(
            self.loaded()?,
            &self.job_id,
            candidate,
            &selection.stage_id,
            None,
            &self.comments,
        )?;

        self.api.move_candidate(&payload).await?;
        info!(
            job_id = %self.job_id,
            candidate_id = %selection.candidate_id,
            stage_id = %selection.stage_id,
            "Candidate finished pipeline"
        );

        self.after_move().await
    }

    /// Selected candidate, re-checked for eligibility against fresh state
    fn selected_candidate(&self) -> Result<(Selection, &Candidate)> {
        let selection = self
            .selected
            .clone()
            .ok_or(ValidationError::NoCandidateSelected)?;
        let candidate = self.candidate(&selection.candidate_id)?;

        let eligibility = can_move_candidate(candidate, &selection.stage_id);
        if !eligibility.movable {
            warn!(
                candidate_id = %selection.candidate_id,
                stage_id = %selection.stage_id,
                reason = %eligibility.reason.message(),
                "Move rejected, candidate not eligible"
            );
            return Err(Error::NotEligible(eligibility.reason));
        }

        Ok((selection, candidate))
    }

    // ------------------------------------------------------------------
    // Stage dates
    // ------------------------------------------------------------------

    pub fn begin_date_edit(&mut self, candidate_id: &str, stage_id: &str) -> Result<()> {
        let progress = self.progress(candidate_id, stage_id)?;
        ensure_editable(progress)?;
        let window = DateWindow::from_progress(progress);
        self.pending_edit = Some(PendingEdit::Dates {
            candidate_id: candidate_id.to_string(),
            stage_id: stage_id.to_string(),
            window,
        });
        Ok(())
    }

    /// Replace the window of the date edit in progress. An end before the
    /// start is rejected and the previous window kept.
    pub fn set_dates(&mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
        match &mut self.pending_edit {
            Some(PendingEdit::Dates { window, .. }) => {
                let proposed = DateWindow::new(start, end);
                proposed.validate()?;
                *window = proposed;
                Ok(())
            }
            _ => Err(EditError::NoEditInProgress.into()),
        }
    }

    pub async fn confirm_date_edit(&mut self) -> Result<()> {
        let Some(PendingEdit::Dates {
            candidate_id,
            stage_id,
            window,
        }) = self.pending_edit.clone()
        else {
            return Err(EditError::NoEditInProgress.into());
        };

        let request =
            date_window_request(&self.job_id, self.progress(&candidate_id, &stage_id)?, window)?;
        self.api.update_stage_dates(&request).await?;
        info!(
            job_id = %self.job_id,
            stage_id = %stage_id,
            start = ?window.start,
            end = ?window.end,
            "Stage dates updated"
        );

        self.after_edit(true).await
    }

    // ------------------------------------------------------------------
    // Stage recruiters
    // ------------------------------------------------------------------

    /// Start editing a stage's recruiters, seeded with the ones scheduled
    /// on the work order
    pub fn begin_recruiter_edit(&mut self, candidate_id: &str, stage_id: &str) -> Result<()> {
        ensure_editable(self.progress(candidate_id, stage_id)?)?;
        let recruiter_ids = self.loaded()?.scheduled_recruiters(stage_id).to_vec();
        self.pending_edit = Some(PendingEdit::Recruiters {
            candidate_id: candidate_id.to_string(),
            stage_id: stage_id.to_string(),
            recruiter_ids,
        });
        Ok(())
    }

    pub fn set_recruiters(&mut self, ids: Vec<String>) -> Result<()> {
        match &mut self.pending_edit {
            Some(PendingEdit::Recruiters { recruiter_ids, .. }) => {
                *recruiter_ids = ids;
                Ok(())
            }
            _ => Err(EditError::NoEditInProgress.into()),
        }
    }

    pub async fn confirm_recruiter_edit(&mut self) -> Result<()> {
        let Some(PendingEdit::Recruiters {
            candidate_id,
            stage_id,
            recruiter_ids,
        }) = self.pending_edit.clone()
        else {
            return Err(EditError::NoEditInProgress.into());
        };

        let request = recruiter_request(
            &self.job_id,
            self.progress(&candidate_id, &stage_id)?,
            &recruiter_ids,
        )?;
        self.api.update_stage_recruiters(&request).await?;
        info!(
            job_id = %self.job_id,
            stage_id = %stage_id,
            recruiters = request.recruiter_ids.len(),
            "Stage recruiters updated"
        );

        self.after_edit(true).await
    }

    pub fn pending_edit(&self) -> Option<&PendingEdit> {
        self.pending_edit.as_ref()
    }

    pub fn cancel_edit(&mut self) {
        if self.pending_edit.take().is_some() {
            debug!("Stage edit cancelled");
        }
    }

    // ------------------------------------------------------------------
    // Additional documents
    // ------------------------------------------------------------------

    pub async fn add_document(
        &mut self,
        candidate_id: &str,
        stage_id: &str,
        document_name: &str,
    ) -> Result<()> {
        let request =
            add_document_request(&self.job_id, self.progress(candidate_id, stage_id)?, document_name)?;
        self.api.add_stage_document(&request).await?;
        info!(
            job_id = %self.job_id,
            stage_id = %stage_id,
            document = %request.document_name,
            "Stage document requirement added"
        );

        self.after_edit(false).await
    }

    pub async fn remove_document(
        &mut self,
        candidate_id: &str,
        stage_id: &str,
        document_id: &str,
    ) -> Result<()> {
        let request =
            remove_document_request(&self.job_id, self.progress(candidate_id, stage_id)?, document_id)?;
        self.api.delete_stage_document(&request).await?;
        info!(
            job_id = %self.job_id,
            stage_id = %stage_id,
            document_id = %document_id,
            "Stage document requirement removed"
        );

        self.after_edit(false).await
    }

    // ------------------------------------------------------------------
    // Post-write refresh
    // ------------------------------------------------------------------

    async fn after_move(&mut self) -> Result<()> {
        let result = self.refetch(self.refresh.refetch_after_move).await;
        self.selected = None;
        self.comments.clear();
        result
    }

    async fn after_edit(&mut self, clear_pending: bool) -> Result<()> {
        let result = self.refetch(self.refresh.refetch_after_edit).await;
        if clear_pending {
            self.pending_edit = None;
        }
        result
    }

    /// On failure the cached state is dropped: the write already happened,
    /// so the old copy is known to be stale
    async fn refetch(&mut self, times: u32) -> Result<()> {
        for attempt in 1..=times {
            match self.api.fetch_pipeline_state(&self.job_id).await {
                Ok(state) => self.state = Some(state),
                Err(e) => {
                    warn!(
                        job_id = %self.job_id,
                        attempt,
                        error = %e,
                        "Refetch after write failed, discarding cached state"
                    );
                    self.state = None;
                    return Err(e);
                }
            }
        }
        debug!(job_id = %self.job_id, times, "Pipeline state refreshed");
        Ok(())
    }
}
