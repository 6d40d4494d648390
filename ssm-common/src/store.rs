//! Keyed student store
//!
//! Sole owner of the identifier -> record mapping. Every operation holds the
//! store-wide lock for its full duration and never awaits anything else while
//! holding it, so a long import cannot stall request traffic.

use std::collections::HashMap;

use tokio::sync::Mutex;
use tracing::debug;

use crate::model::{Student, StudentId, StudentUpdate};
use crate::{Error, Result};

/// In-memory student table guarded by a single exclusive lock
///
/// Construct one per process (or per test) and share it through an `Arc`.
#[derive(Debug, Default)]
pub struct StudentStore {
    students: Mutex<HashMap<StudentId, Student>>,
}

impl StudentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the record, replacing any existing record at the same id.
    ///
    /// Replacement is silent and takes the caller's scores as given, so a
    /// fresh record wipes whatever scores the previous one held.
    pub async fn add(&self, student: Student) {
        let mut students = self.students.lock().await;
        let id = student.id;
        if students.insert(id, student).is_some() {
            debug!(student_id = id, "Replaced existing student record");
        }
    }

    /// Remove the record and all of its scores
    pub async fn delete(&self, id: StudentId) -> Result<()> {
        let mut students = self.students.lock().await;
        students
            .remove(&id)
            .map(|_| ())
            .ok_or(Error::StudentNotFound(id))
    }

    /// Overwrite the identity fields present in `update`; scores are untouched
    pub async fn modify(&self, id: StudentId, update: StudentUpdate) -> Result<()> {
        let mut students = self.students.lock().await;
        let student = students.get_mut(&id).ok_or(Error::StudentNotFound(id))?;
        update.apply_to(student);
        Ok(())
    }

    /// Set `scores[course] = value`, creating or overwriting the entry
    pub async fn add_score(&self, id: StudentId, course: &str, value: f64) -> Result<()> {
        let mut students = self.students.lock().await;
        let student = students.get_mut(&id).ok_or(Error::StudentNotFound(id))?;
        student.scores.insert(course.to_string(), value);
        Ok(())
    }

    pub async fn delete_score(&self, id: StudentId, course: &str) -> Result<()> {
        let mut students = self.students.lock().await;
        let student = students.get_mut(&id).ok_or(Error::StudentNotFound(id))?;
        student
            .scores
            .remove(course)
            .map(|_| ())
            .ok_or_else(|| score_not_found(id, course))
    }

    /// Overwrite an existing score. Unlike [`add_score`](Self::add_score),
    /// the course must already be recorded.
    pub async fn modify_score(&self, id: StudentId, course: &str, value: f64) -> Result<()> {
        let mut students = self.students.lock().await;
        let student = students.get_mut(&id).ok_or(Error::StudentNotFound(id))?;
        let slot = student
            .scores
            .get_mut(course)
            .ok_or_else(|| score_not_found(id, course))?;
        *slot = value;
        Ok(())
    }

    /// Snapshot of the full record
    pub async fn query(&self, id: StudentId) -> Result<Student> {
        let students = self.students.lock().await;
        students.get(&id).cloned().ok_or(Error::StudentNotFound(id))
    }

    pub async fn query_score(&self, id: StudentId, course: &str) -> Result<f64> {
        let students = self.students.lock().await;
        let student = students.get(&id).ok_or(Error::StudentNotFound(id))?;
        student
            .scores
            .get(course)
            .copied()
            .ok_or_else(|| score_not_found(id, course))
    }

    pub async fn contains(&self, id: StudentId) -> bool {
        self.students.lock().await.contains_key(&id)
    }

    pub async fn len(&self) -> usize {
        self.students.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.students.lock().await.is_empty()
    }
}

fn score_not_found(id: StudentId, course: &str) -> Error {
    Error::ScoreNotFound {
        id,
        course: course.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Track;

    fn wei() -> Student {
        Student::new(1, "wei", "male", "28", Track::Undergraduate)
    }

    fn hao() -> Student {
        Student::new(2, "hao", "female", "27", Track::Graduate)
    }

    #[tokio::test]
    async fn test_add_and_query() {
        let store = StudentStore::new();
        store.add(wei()).await;
        store.add(hao()).await;

        let student = store.query(1).await.unwrap();
        assert_eq!(student.name, "wei");
        assert_eq!(student.class, "28");
        assert_eq!(student.track, Track::Undergraduate);

        let student = store.query(2).await.unwrap();
        assert_eq!(student.gender, "female");
        assert_eq!(student.track, Track::Graduate);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_delete_student() {
        let store = StudentStore::new();
        store.add(wei()).await;
        store.add(hao()).await;

        store.delete(1).await.unwrap();
        assert!(matches!(store.query(1).await, Err(Error::StudentNotFound(1))));

        let err = store.delete(3).await.unwrap_err();
        assert_eq!(err.to_string(), "student with id 3 not found");

        store.delete(2).await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_modify_student_keeps_absent_fields() {
        let store = StudentStore::new();
        store.add(wei()).await;
        store.add_score(1, "math", 90.0).await.unwrap();

        let update = StudentUpdate {
            name: Some("wei modified".to_string()),
            class: Some("28 modified".to_string()),
            gender: None,
        };
        store.modify(1, update).await.unwrap();

        let student = store.query(1).await.unwrap();
        assert_eq!(student.name, "wei modified");
        assert_eq!(student.gender, "male");
        assert_eq!(student.class, "28 modified");
        assert_eq!(student.scores.get("math"), Some(&90.0));

        let err = store.modify(3, StudentUpdate::default()).await.unwrap_err();
        assert!(matches!(err, Error::StudentNotFound(3)));
    }

    #[tokio::test]
    async fn test_add_score_overwrites() {
        let store = StudentStore::new();
        store.add(wei()).await;

        store.add_score(1, "math", 90.0).await.unwrap();
        store.add_score(1, "math", 95.5).await.unwrap();

        assert_eq!(store.query_score(1, "math").await.unwrap(), 95.5);
        assert_eq!(store.query(1).await.unwrap().scores.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_score_missing_course() {
        let store = StudentStore::new();
        store.add(wei()).await;

        let err = store.delete_score(1, "history").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "score for course history not found for student with id 1"
        );
    }

    #[tokio::test]
    async fn test_modify_score_requires_existing_course() {
        let store = StudentStore::new();
        store.add(wei()).await;

        let err = store.modify_score(1, "math", 80.0).await.unwrap_err();
        assert!(matches!(err, Error::ScoreNotFound { id: 1, ref course } if course == "math"));

        store.add_score(1, "math", 70.0).await.unwrap();
        store.modify_score(1, "math", 80.0).await.unwrap();
        assert_eq!(store.query_score(1, "math").await.unwrap(), 80.0);
    }
}
