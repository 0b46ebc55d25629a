//! Board projection: candidates grouped by active stage
//!
//! Columns follow the default timeline order; candidates sitting in a stage
//! the timeline does not know get trailing columns in first-seen order.
//! Search and pagination apply to the card list before grouping.

use serde::{Deserialize, Serialize};

use crate::approval::{level_progress, LevelProgress};
use crate::documents::missing_documents;
use crate::eligibility::{can_move_candidate, Eligibility};
use crate::model::{Candidate, PipelineState};
use crate::pagination::{calculate_pagination, PAGE_SIZE};

/// Board filters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardQuery {
    /// Only show this stage's column
    #[serde(default)]
    pub stage: Option<String>,
    /// Case-insensitive match on name, email or skills
    #[serde(default)]
    pub search: Option<String>,
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: usize,
}

fn default_page() -> usize {
    1
}

/// One candidate as shown on the board
#[derive(Debug, Clone, Serialize)]
pub struct CandidateCard {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub skills: Vec<String>,
    pub stage_id: String,
    pub tagged: bool,
    pub eligibility: Eligibility,
    pub status_message: String,
    pub missing_documents: Vec<String>,
    pub approval_levels: Vec<LevelProgress>,
    /// Default successor stage, `None` on the last stage
    pub next_stage_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub stage_id: String,
    pub stage_name: String,
    pub stage_order: Option<u32>,
    /// Matching candidates in this stage across all pages
    pub total: usize,
    pub cards: Vec<CandidateCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Board {
    pub columns: Vec<BoardColumn>,
    pub total_results: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

impl CandidateCard {
    pub fn build(state: &PipelineState, candidate: &Candidate) -> Self {
        let stage_id = candidate.current_stage_id.clone();
        let eligibility = can_move_candidate(candidate, &stage_id);
        let progress = candidate.progress_for(&stage_id);

        Self {
            user_id: candidate.user_id.clone(),
            name: candidate.name.clone(),
            email: candidate.email.clone(),
            skills: candidate.skills.clone(),
            tagged: candidate.address().is_tagged(),
            status_message: eligibility.reason.message(),
            eligibility,
            missing_documents: progress.map(missing_documents).unwrap_or_default(),
            approval_levels: progress.map(level_progress).unwrap_or_default(),
            next_stage_id: state
                .timeline_for(candidate)
                .default_next_stage(&stage_id)
                .map(|s| s.stage_id.clone()),
            stage_id,
        }
    }
}

impl Board {
    pub fn build(state: &PipelineState, query: &BoardQuery) -> Self {
        let stage_filter = query.stage.as_deref().filter(|s| !s.is_empty());
        let search = query.search.as_deref().unwrap_or("");

        let timeline = state.default_timeline();
        let mut columns: Vec<BoardColumn> = timeline
            .stages()
            .iter()
            .map(|s| BoardColumn {
                stage_id: s.stage_id.clone(),
                stage_name: s.stage_name.clone(),
                stage_order: Some(s.stage_order),
                total: 0,
                cards: Vec::new(),
            })
            .collect();

        let mut matching: Vec<(usize, &Candidate)> = Vec::new();
        for candidate in &state.candidates {
            if stage_filter.is_some_and(|s| s != candidate.current_stage_id) {
                continue;
            }
            if !candidate.matches_search(search) {
                continue;
            }
            let column = match columns
                .iter()
                .position(|c| c.stage_id == candidate.current_stage_id)
            {
                Some(index) => index,
                None => {
                    let stage_name = candidate
                        .current_progress()
                        .map(|sp| sp.stage_name.clone())
                        .unwrap_or_default();
                    columns.push(BoardColumn {
                        stage_id: candidate.current_stage_id.clone(),
                        stage_name,
                        stage_order: None,
                        total: 0,
                        cards: Vec::new(),
                    });
                    columns.len() - 1
                }
            };
            columns[column].total += 1;
            matching.push((column, candidate));
        }

        // Page over cards in column order so a page reads left to right
        matching.sort_by_key(|(column, _)| *column);
        let p = calculate_pagination(matching.len(), query.page);
        for (column, candidate) in &matching[p.range(matching.len())] {
            columns[*column]
                .cards
                .push(CandidateCard::build(state, candidate));
        }

        if let Some(stage) = stage_filter {
            columns.retain(|c| c.stage_id == stage);
        }

        tracing::debug!(
            candidates = state.candidates.len(),
            matching = matching.len(),
            page = p.page,
            "Built pipeline board"
        );

        Self {
            columns,
            total_results: matching.len(),
            page: p.page,
            page_size: PAGE_SIZE,
            total_pages: p.total_pages,
        }
    }

    pub fn card(&self, user_id: &str) -> Option<&CandidateCard> {
        self.columns
            .iter()
            .flat_map(|c| c.cards.iter())
            .find(|card| card.user_id == user_id)
    }
}
