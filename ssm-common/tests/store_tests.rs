//! Behavioral tests for the keyed student store
//!
//! Tests cover:
//! - Not-found faults for every operation on absent ids
//! - add_score vs modify_score/delete_score asymmetry on absent courses
//! - Re-adding a record clears prior scores
//! - Score round trips
//! - Concurrent add_score calls lose no updates
//! - Deletion removes scores together with the record

use std::sync::Arc;

use ssm_common::{Error, Student, StudentStore, StudentUpdate, Track};

fn student(id: i64) -> Student {
    Student::new(id, "wei", "male", "28", Track::Undergraduate)
}

#[tokio::test]
async fn test_absent_id_faults_every_operation() {
    let store = StudentStore::new();
    store.add(student(1)).await;

    for id in [0, 2, -7, i64::MAX] {
        assert!(matches!(store.query(id).await, Err(Error::StudentNotFound(x)) if x == id));
        assert!(matches!(
            store.modify(id, StudentUpdate::default()).await,
            Err(Error::StudentNotFound(x)) if x == id
        ));
        assert!(matches!(
            store.add_score(id, "math", 1.0).await,
            Err(Error::StudentNotFound(x)) if x == id
        ));
        assert!(matches!(
            store.delete_score(id, "math").await,
            Err(Error::StudentNotFound(x)) if x == id
        ));
        assert!(matches!(
            store.modify_score(id, "math", 1.0).await,
            Err(Error::StudentNotFound(x)) if x == id
        ));
        assert!(matches!(
            store.query_score(id, "math").await,
            Err(Error::StudentNotFound(x)) if x == id
        ));
        assert!(matches!(store.delete(id).await, Err(Error::StudentNotFound(x)) if x == id));
    }

    // The present record is untouched by all of the above
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_absent_course_asymmetry() {
    let store = StudentStore::new();
    store.add(student(1)).await;

    assert!(matches!(
        store.delete_score(1, "physics").await,
        Err(Error::ScoreNotFound { id: 1, .. })
    ));
    assert!(matches!(
        store.modify_score(1, "physics", 60.0).await,
        Err(Error::ScoreNotFound { id: 1, .. })
    ));
    assert!(matches!(
        store.query_score(1, "physics").await,
        Err(Error::ScoreNotFound { id: 1, .. })
    ));

    // add_score creates the entry instead of faulting
    store.add_score(1, "physics", 60.0).await.unwrap();
    assert_eq!(store.query_score(1, "physics").await.unwrap(), 60.0);
}

#[tokio::test]
async fn test_readd_same_record_clears_scores() {
    let store = StudentStore::new();
    store.add(student(1)).await;
    store.add_score(1, "math", 90.0).await.unwrap();
    store.add_score(1, "english", 85.0).await.unwrap();

    store.add(student(1)).await;

    let record = store.query(1).await.unwrap();
    assert_eq!(record, student(1));
    assert!(record.scores.is_empty());
    assert!(matches!(
        store.query_score(1, "math").await,
        Err(Error::ScoreNotFound { .. })
    ));
}

#[tokio::test]
async fn test_add_with_prepopulated_scores_keeps_them() {
    let store = StudentStore::new();
    let mut record = student(5);
    record.scores.insert("art".to_string(), 77.0);

    store.add(record).await;
    assert_eq!(store.query_score(5, "art").await.unwrap(), 77.0);
}

#[tokio::test]
async fn test_score_round_trip() {
    let store = StudentStore::new();
    store.add(student(1)).await;

    store.add_score(1, "math", 88.5).await.unwrap();
    assert_eq!(store.query_score(1, "math").await.unwrap(), 88.5);

    store.modify_score(1, "math", 91.0).await.unwrap();
    assert_eq!(store.query_score(1, "math").await.unwrap(), 91.0);

    store.delete_score(1, "math").await.unwrap();
    assert!(matches!(
        store.query_score(1, "math").await,
        Err(Error::ScoreNotFound { id: 1, ref course }) if course == "math"
    ));

    // The mapping stays present (empty) after the last score is removed
    assert!(store.query(1).await.unwrap().scores.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_add_score_loses_no_updates() {
    const COURSES: usize = 200;

    let store = Arc::new(StudentStore::new());
    store.add(student(1)).await;

    let mut handles = Vec::with_capacity(COURSES);
    for i in 0..COURSES {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.add_score(1, &format!("course-{}", i), i as f64).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let record = store.query(1).await.unwrap();
    assert_eq!(record.scores.len(), COURSES);
    for i in 0..COURSES {
        assert_eq!(record.scores.get(&format!("course-{}", i)), Some(&(i as f64)));
    }
}

#[tokio::test]
async fn test_delete_removes_scores_atomically() {
    let store = StudentStore::new();
    store.add(student(1)).await;
    store.add_score(1, "math", 90.0).await.unwrap();

    store.delete(1).await.unwrap();

    assert!(matches!(store.query(1).await, Err(Error::StudentNotFound(1))));
    for course in ["math", "anything"] {
        assert!(matches!(
            store.query_score(1, course).await,
            Err(Error::StudentNotFound(1))
        ));
    }

    // Re-creating the id starts from an empty score mapping
    store.add(student(1)).await;
    assert!(store.query(1).await.unwrap().scores.is_empty());
}
