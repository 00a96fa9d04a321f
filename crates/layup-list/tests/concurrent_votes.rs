use std::sync::Arc;

use layup_list::catalog::{Course, CourseId, UserId};
use layup_list::store::{InMemoryCatalog, InMemoryVoteStore, VoteRepository};
use layup_list::votes::{RetryPolicy, VoteCategory, VotePolicy, VoteService};

const COURSE: CourseId = CourseId(7);

fn course(id: CourseId) -> Course {
    Course {
        id,
        department: "GOVT".to_string(),
        number: id.0.to_string(),
        title: "American Political System".to_string(),
        distribs: vec!["SOC".to_string()],
        offered: vec!["16W".parse().expect("valid term")],
    }
}

fn service_with_students(
    students: u64,
) -> (
    Arc<VoteService<InMemoryVoteStore, InMemoryCatalog>>,
    Arc<InMemoryVoteStore>,
) {
    let mut catalog = InMemoryCatalog::default()
        .with_course(course(COURSE))
        .with_course(course(CourseId(8)));
    for id in 1..=students {
        catalog = catalog.with_student(UserId(id));
    }

    let store = Arc::new(InMemoryVoteStore::with_shards(4));
    let service = VoteService::new(
        store.clone(),
        Arc::new(catalog),
        VotePolicy::default(),
        RetryPolicy {
            max_attempts: 64,
            base_backoff_ms: 0,
        },
    );
    (Arc::new(service), store)
}

#[test]
fn distinct_users_voting_at_once_all_count() {
    let (service, store) = service_with_students(32);

    std::thread::scope(|scope| {
        for id in 1..=32 {
            let service = service.clone();
            scope.spawn(move || {
                service
                    .cast(UserId(id), COURSE, VoteCategory::Quality, 1)
                    .expect("cast succeeds");
            });
        }
    });

    assert_eq!(store.score(COURSE).expect("score").quality, 32);
    assert_eq!(
        store
            .live_vote_sum(COURSE, VoteCategory::Quality)
            .expect("sum"),
        32
    );
}

#[test]
fn repeated_submissions_for_one_key_keep_the_score_consistent() {
    let (service, store) = service_with_students(1);

    std::thread::scope(|scope| {
        for round in 0..16 {
            let service = service.clone();
            scope.spawn(move || {
                let value = if round % 3 == 0 { -1 } else { 1 };
                service
                    .cast(UserId(1), COURSE, VoteCategory::Difficulty, value)
                    .expect("cast succeeds");
            });
        }
    });

    let score = store.score(COURSE).expect("score").difficulty;
    let live = store
        .live_vote_sum(COURSE, VoteCategory::Difficulty)
        .expect("sum");
    assert_eq!(score, live);
    assert!((-1..=1).contains(&score));

    let vote = service
        .votes_for(COURSE, UserId(1))
        .expect("votes")
        .difficulty;
    assert_eq!(vote.map(i64::from).unwrap_or(0), score);
}

#[test]
fn votes_on_other_courses_do_not_leak() {
    let (service, store) = service_with_students(8);

    std::thread::scope(|scope| {
        for id in 1..=8 {
            let service = service.clone();
            scope.spawn(move || {
                let target = if id % 2 == 0 { COURSE } else { CourseId(8) };
                service
                    .cast(UserId(id), target, VoteCategory::Quality, -1)
                    .expect("cast succeeds");
            });
        }
    });

    let scores = store
        .scores(&[COURSE, CourseId(8)])
        .expect("scores");
    assert_eq!(scores[&COURSE].quality, -4);
    assert_eq!(scores[&CourseId(8)].quality, -4);
    assert_eq!(scores[&COURSE].difficulty, 0);
}
