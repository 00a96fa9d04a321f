use crate::infra::{build_engine, resolve_data_dir, Engine};
use clap::Args;
use layup_list::catalog::CourseId;
use layup_list::config::AppConfig;
use layup_list::error::AppError;
use layup_list::ranking::{Ranking, RankingMode};
use layup_list::telemetry::{self, LogTarget};
use layup_list::terms::Term;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// Ordering to print: `best` or `layups`
    pub(crate) mode: String,
    /// Term such as 16W (defaults to APP_CURRENT_TERM)
    #[arg(long)]
    pub(crate) term: Option<String>,
    /// Only include courses carrying this distribution tag
    #[arg(long)]
    pub(crate) dist: Option<String>,
    /// Print at most this many courses
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    /// Directory holding courses.csv and the optional reference CSVs
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct MediansArgs {
    /// Course id as listed in courses.csv
    pub(crate) course: u64,
    /// Directory holding courses.csv and the optional reference CSVs
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RankedLine {
    pub(crate) rank: usize,
    pub(crate) id: CourseId,
    pub(crate) name: String,
    pub(crate) title: String,
    pub(crate) quality_score: i64,
    pub(crate) difficulty_score: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct RankReport {
    pub(crate) term: Term,
    pub(crate) sort: RankingMode,
    pub(crate) course_type: &'static str,
    pub(crate) total: usize,
    pub(crate) courses: Vec<RankedLine>,
}

fn prepare(data_dir: Option<PathBuf>) -> Result<(AppConfig, Engine), AppError> {
    let config = AppConfig::load()?;
    telemetry::init_with_target(&config.telemetry, LogTarget::Stderr)?;
    let data_dir = resolve_data_dir(&config, data_dir);
    let engine = build_engine(&config, data_dir.as_deref())?;
    Ok((config, engine))
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let mode: RankingMode = args.mode.parse()?;
    let (config, engine) = prepare(args.data_dir)?;
    let term = match args.term.as_deref() {
        Some(raw) => raw.parse::<Term>()?,
        None => config.engine.current_term,
    };

    let ranking = engine.rankings().rank(&term, mode, args.dist.as_deref())?;
    let report = rank_report(&ranking, args.limit);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub(crate) fn run_medians(args: MediansArgs) -> Result<(), AppError> {
    let (_, engine) = prepare(args.data_dir)?;
    let medians = engine.medians().summarize(CourseId(args.course))?;
    println!("{}", serde_json::to_string_pretty(&medians)?);
    Ok(())
}

pub(crate) fn rank_report(ranking: &Ranking, limit: Option<usize>) -> RankReport {
    let courses = ranking
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .enumerate()
        .map(|(index, entry)| RankedLine {
            rank: index + 1,
            id: entry.course.id,
            name: entry.course.short_name(),
            title: entry.course.title.clone(),
            quality_score: entry.score.quality,
            difficulty_score: entry.score.difficulty,
        })
        .collect();

    RankReport {
        term: ranking.term,
        sort: ranking.mode,
        course_type: ranking.mode.label(),
        total: ranking.len(),
        courses,
    }
}
