//! Student record model
//!
//! One record type carries an explicit [`Track`] tag; undergraduates and
//! graduates share every field and all behavior.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Primary key of a student record
pub type StudentId = i64;

/// Academic track of a student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Undergraduate,
    Graduate,
}

impl Track {
    /// Classify an import row discriminator.
    ///
    /// Surrounding whitespace is ignored; the match itself is exact and
    /// case-sensitive. Returns `None` for anything else.
    pub fn from_discriminator(value: &str) -> Option<Track> {
        match value.trim() {
            "undergraduate" => Some(Track::Undergraduate),
            "graduate" => Some(Track::Graduate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Track::Undergraduate => "undergraduate",
            Track::Graduate => "graduate",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A student and their per-course scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub gender: String,
    pub class: String,
    pub track: Track,
    /// Course name -> score. Always present, empty until a score is added.
    #[serde(default)]
    pub scores: BTreeMap<String, f64>,
}

impl Student {
    /// Create a record with no scores
    pub fn new(
        id: StudentId,
        name: impl Into<String>,
        gender: impl Into<String>,
        class: impl Into<String>,
        track: Track,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            gender: gender.into(),
            class: class.into(),
            track,
            scores: BTreeMap::new(),
        }
    }
}

/// Create payload for POST /undergraduates and POST /graduates
///
/// The track is taken from the route, not the body. Absent fields take
/// their zero value.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NewStudent {
    pub id: StudentId,
    pub name: String,
    pub gender: String,
    pub class: String,
}

impl NewStudent {
    pub fn into_student(self, track: Track) -> Student {
        Student::new(self.id, self.name, self.gender, self.class, track)
    }
}

/// Partial update of a student's identity fields
///
/// Absent fields are left untouched. Unknown keys are rejected at
/// deserialization time.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StudentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
}

impl StudentUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.gender.is_none() && self.class.is_none()
    }

    /// Overwrite the fields present in this update
    pub fn apply_to(self, student: &mut Student) {
        if let Some(name) = self.name {
            student.name = name;
        }
        if let Some(gender) = self.gender {
            student.gender = gender;
        }
        if let Some(class) = self.class {
            student.class = class;
        }
    }
}

/// Score payload for POST/PUT /students/:id/scores
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoreEntry {
    pub course_name: String,
    pub score: f64,
}
