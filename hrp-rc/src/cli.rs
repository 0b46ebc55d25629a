//! Command-line interface
//!
//! Argument definitions plus execution of the job commands against a
//! [`PipelineSession`]. Output is plain text meant for a terminal.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use hrp_common::api::PipelineApi;
use hrp_common::approval::level_progress;
use hrp_common::board::{Board, BoardQuery};
use hrp_common::config::ConfigOverrides;
use hrp_common::documents::missing_documents;
use hrp_common::model::Candidate;
use hrp_common::{can_move_candidate, Result};

use crate::session::{PendingEdit, PipelineSession};

/// Recruiter console for the hiring pipeline
#[derive(Parser, Debug)]
#[command(name = "hrp-rc")]
#[command(about = "Recruiter console for hiring pipeline stage progression")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Upstream pipeline API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Bearer token for the upstream API
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Log level filter (overrides config and RUST_LOG)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(flatten)]
    Job(JobCommand),

    /// Serve the pipeline board over HTTP
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "HRP_BOARD_PORT")]
        port: Option<u16>,
    },
}

/// Commands that operate on one job's pipeline
#[derive(Subcommand, Debug, Clone)]
pub enum JobCommand {
    /// Show candidates grouped by stage
    Board {
        job_id: String,
        /// Only show this stage
        #[arg(long)]
        stage: Option<String>,
        /// Filter by name, email or skill
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Show whether a candidate can leave a stage and why
    Status {
        job_id: String,
        candidate_id: String,
        /// Stage to check (defaults to the candidate's current stage)
        #[arg(long)]
        stage: Option<String>,
    },

    /// Move a candidate out of their current stage
    Move {
        job_id: String,
        candidate_id: String,
        #[arg(short, long)]
        comments: String,
        /// Target stage (defaults to the next stage in order)
        #[arg(long)]
        next: Option<String>,
    },

    /// Complete the pipeline for a candidate in the last stage
    Finish {
        job_id: String,
        candidate_id: String,
        #[arg(short, long)]
        comments: String,
    },

    /// Change a stage's start and/or end date (YYYY-MM-DD)
    SetDates {
        job_id: String,
        candidate_id: String,
        stage_id: String,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Remove the start date
        #[arg(long, conflicts_with = "start")]
        clear_start: bool,
        /// Remove the end date
        #[arg(long, conflicts_with = "end")]
        clear_end: bool,
    },

    /// Replace the recruiters assigned to a stage
    SetRecruiters {
        job_id: String,
        candidate_id: String,
        stage_id: String,
        #[arg(required = true)]
        recruiter_ids: Vec<String>,
    },

    /// Require an additional document at a stage
    AddDoc {
        job_id: String,
        candidate_id: String,
        stage_id: String,
        document_name: String,
    },

    /// Drop an additional document requirement
    RemoveDoc {
        job_id: String,
        candidate_id: String,
        stage_id: String,
        document_id: String,
    },
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        let port = match &self.command {
            Command::Serve { port } => *port,
            Command::Job(_) => None,
        };
        ConfigOverrides {
            config_path: self.config.clone(),
            api_url: self.api_url.clone(),
            token: self.token.clone(),
            port,
        }
    }
}

impl JobCommand {
    pub fn job_id(&self) -> &str {
        match self {
            JobCommand::Board { job_id, .. }
            | JobCommand::Status { job_id, .. }
            | JobCommand::Move { job_id, .. }
            | JobCommand::Finish { job_id, .. }
            | JobCommand::SetDates { job_id, .. }
            | JobCommand::SetRecruiters { job_id, .. }
            | JobCommand::AddDoc { job_id, .. }
            | JobCommand::RemoveDoc { job_id, .. } => job_id,
        }
    }
}

/// Load the session's job and run `command`, returning the text to print
pub async fn execute<A: PipelineApi>(
    session: &mut PipelineSession<A>,
    command: &JobCommand,
) -> Result<String> {
    session.load().await?;

    match command {
        JobCommand::Board {
            stage,
            search,
            page,
            ..
        } => {
            let board = session.board(&BoardQuery {
                stage: stage.clone(),
                search: search.clone(),
                page: *page,
            })?;
            Ok(render_board(&board))
        }

        JobCommand::Status {
            candidate_id,
            stage,
            ..
        } => {
            let candidate = session.candidate(candidate_id)?;
            let stage_id = stage
                .clone()
                .unwrap_or_else(|| candidate.current_stage_id.clone());
            Ok(render_status(candidate, &stage_id))
        }

        JobCommand::Move {
            candidate_id,
            comments,
            next,
            ..
        } => {
            session.select_candidate(candidate_id)?;
            session.set_comments(comments.as_str());
            session.move_selected(next.as_deref()).await?;
            let now_in = session.candidate(candidate_id)?.current_stage_id.clone();
            Ok(format!("Moved {}; current stage is now {}", candidate_id, now_in))
        }

        JobCommand::Finish {
            candidate_id,
            comments,
            ..
        } => {
            session.select_candidate(candidate_id)?;
            session.set_comments(comments.as_str());
            session.finish_selected().await?;
            Ok(format!("Finished pipeline for {}", candidate_id))
        }

        JobCommand::SetDates {
            candidate_id,
            stage_id,
            start,
            end,
            clear_start,
            clear_end,
            ..
        } => {
            session.begin_date_edit(candidate_id, stage_id)?;
            // Unspecified bounds keep their current value
            let current = match session.pending_edit() {
                Some(PendingEdit::Dates { window, .. }) => *window,
                _ => Default::default(),
            };
            let start = if *clear_start { None } else { start.or(current.start) };
            let end = if *clear_end { None } else { end.or(current.end) };
            session.set_dates(start, end)?;
            session.confirm_date_edit().await?;
            Ok(format!("Updated dates of stage {}", stage_id))
        }

        JobCommand::SetRecruiters {
            candidate_id,
            stage_id,
            recruiter_ids,
            ..
        } => {
            session.begin_recruiter_edit(candidate_id, stage_id)?;
            session.set_recruiters(recruiter_ids.clone())?;
            session.confirm_recruiter_edit().await?;
            Ok(format!("Updated recruiters of stage {}", stage_id))
        }

        JobCommand::AddDoc {
            candidate_id,
            stage_id,
            document_name,
            ..
        } => {
            session
                .add_document(candidate_id, stage_id, document_name)
                .await?;
            Ok(format!(
                "Stage {} now requires \"{}\"",
                stage_id,
                document_name.trim()
            ))
        }

        JobCommand::RemoveDoc {
            candidate_id,
            stage_id,
            document_id,
            ..
        } => {
            session
                .remove_document(candidate_id, stage_id, document_id)
                .await?;
            Ok(format!(
                "Removed document {} from stage {}",
                document_id, stage_id
            ))
        }
    }
}

pub fn render_board(board: &Board) -> String {
    let mut out = String::new();
    for column in &board.columns {
        let name = if column.stage_name.is_empty() {
            column.stage_id.as_str()
        } else {
            column.stage_name.as_str()
        };
        let _ = writeln!(out, "== {} ({}) ==", name, column.total);
        for card in &column.cards {
            let marker = if card.eligibility.movable { '+' } else { '-' };
            let _ = writeln!(
                out,
                "  {} {:<12} {:<24} {}",
                marker, card.user_id, card.name, card.status_message
            );
        }
    }
    let _ = write!(
        out,
        "Page {}/{} ({} candidates)",
        board.page,
        board.total_pages.max(1),
        board.total_results
    );
    out
}

pub fn render_status(candidate: &Candidate, stage_id: &str) -> String {
    let eligibility = can_move_candidate(candidate, stage_id);
    let mut out = format!("{} ({}) at stage {}\n", candidate.name, candidate.user_id, stage_id);
    let _ = writeln!(out, "Status: {}", eligibility.reason.message());

    if let Some(progress) = candidate.progress_for(stage_id) {
        let missing = missing_documents(progress);
        if !missing.is_empty() {
            let _ = writeln!(out, "Missing documents: {}", missing.join(", "));
        }
        for level in level_progress(progress) {
            let _ = writeln!(
                out,
                "Approval level {} {}: {}/{}{}",
                level.level_order,
                level.level_name,
                level.approved_count,
                level.total_count,
                if level.complete { " (complete)" } else { "" }
            );
        }
    }
    out.trim_end().to_string()
}
