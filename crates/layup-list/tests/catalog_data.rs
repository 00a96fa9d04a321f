use std::path::PathBuf;
use std::sync::Arc;

use layup_list::catalog::{CourseId, UserId};
use layup_list::config::EngineConfig;
use layup_list::ranking::{Paginator, RankedCourse, RankingMode};
use layup_list::store::{load_catalog_dir, InMemoryCatalog, InMemoryVoteStore};
use layup_list::terms::Term;
use layup_list::LayupEngine;

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

fn loaded_engine() -> LayupEngine<InMemoryVoteStore, InMemoryCatalog> {
    let snapshot = load_catalog_dir(&data_dir()).expect("sample data loads");
    let (catalog, seeds) = snapshot.into_catalog();
    let engine = LayupEngine::new(
        Arc::new(InMemoryVoteStore::default()),
        Arc::new(catalog),
        &EngineConfig::default(),
    );
    let applied = engine.replay(&seeds).expect("replay succeeds");
    assert_eq!(applied, seeds.len(), "every sample vote is valid");
    engine
}

fn ids<'a>(courses: impl IntoIterator<Item = &'a RankedCourse>) -> Vec<u64> {
    courses.into_iter().map(|entry| entry.course.id.0).collect()
}

#[test]
fn best_classes_sort_by_quality_then_difficulty_then_id() {
    let engine = loaded_engine();
    let term: Term = "16W".parse().expect("term");

    let ranking = engine
        .rankings()
        .rank(&term, RankingMode::Best, None)
        .expect("ranking");

    assert_eq!(ids(&ranking), vec![3, 4, 1, 6, 2, 5, 8]);
}

#[test]
fn layups_sort_by_difficulty_first() {
    let engine = loaded_engine();
    let term = engine.current_term();

    let ranking = engine
        .rankings()
        .rank(&term, RankingMode::Layups, None)
        .expect("ranking");

    assert_eq!(ids(&ranking), vec![6, 3, 4, 2, 5, 1, 8]);
}

#[test]
fn distrib_filter_and_paging_narrow_the_list() {
    let engine = loaded_engine();
    let term = engine.current_term();

    let social = engine
        .rankings()
        .rank(&term, RankingMode::Best, Some("soc"))
        .expect("ranking");
    assert_eq!(ids(&social), vec![3, 8]);

    let ranking = engine
        .rankings()
        .rank(&term, RankingMode::Best, None)
        .expect("ranking");
    let paginator = Paginator::new(3);
    let last = paginator.window(ranking.len(), Some("99"));
    assert_eq!((last.number, last.num_pages), (3, 3));
    assert_eq!(ids(ranking.page(&last)), vec![8]);
}

#[test]
fn spring_only_courses_are_ranked_in_spring() {
    let engine = loaded_engine();
    let spring: Term = "16S".parse().expect("term");

    let ranking = engine
        .rankings()
        .rank(&spring, RankingMode::Best, Some("ART"))
        .expect("ranking");
    assert_eq!(ids(&ranking), vec![7]);
}

#[test]
fn medians_group_by_term_newest_first() {
    let engine = loaded_engine();

    let summary = engine.medians().summarize(CourseId(1)).expect("medians");
    let terms: Vec<String> = summary.iter().map(|entry| entry.term.to_string()).collect();
    assert_eq!(terms, vec!["16W", "15F"]);
    assert_eq!(summary[0].avg_numeric_value, 10.0);
    assert_eq!(summary[1].avg_numeric_value, 10.75);
    assert_eq!(summary[1].courses.len(), 2);

    let skipped = engine.medians().summarize(CourseId(8)).expect("medians");
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].courses.len(), 1);
}

#[test]
fn course_detail_includes_scores_and_similar_courses() {
    let engine = loaded_engine();

    let detail = engine
        .courses()
        .detail(CourseId(1), Some(UserId(1)))
        .expect("detail");

    assert_eq!(detail.score.quality, 1);
    assert_eq!(detail.score.difficulty, -1);
    assert_eq!(detail.last_offered.map(|term| term.to_string()).as_deref(), Some("16S"));
    let targets: Vec<u64> = detail
        .recommendations
        .iter()
        .map(|recommendation| recommendation.target_id.0)
        .collect();
    assert_eq!(targets, vec![2, 5]);

    let votes = detail.votes.expect("viewer votes");
    assert_eq!((votes.quality, votes.difficulty), (Some(1), Some(-1)));
}
