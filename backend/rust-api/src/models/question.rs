use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub const MIN_DIFFICULTY: f64 = 1.0;
pub const MAX_DIFFICULTY: f64 = 10.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: String,
    pub skill: String,
    pub difficulty: f64,
    pub prompt: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
    #[serde(default = "default_points")]
    pub points: u32,
    #[serde(default = "default_time_limit")]
    pub time_limit_seconds: u32,
}

fn default_points() -> u32 {
    10
}

fn default_time_limit() -> u32 {
    120
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice {
        options: Vec<String>,
        correct_option: usize,
    },
    Code {
        #[serde(default)]
        starter_code: Option<String>,
    },
    OpenEnded,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice { .. } => "multiple_choice",
            QuestionKind::Code { .. } => "code",
            QuestionKind::OpenEnded => "open_ended",
        }
    }
}

/// Candidate-facing projection of a question. Never carries the answer key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: String,
    pub skill: String,
    pub difficulty: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starter_code: Option<String>,
    pub points: u32,
    pub time_limit_seconds: u32,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        let (options, starter_code) = match &question.kind {
            QuestionKind::MultipleChoice { options, .. } => (Some(options.clone()), None),
            QuestionKind::Code { starter_code } => (None, starter_code.clone()),
            QuestionKind::OpenEnded => (None, None),
        };

        Self {
            id: question.id.clone(),
            skill: question.skill.clone(),
            difficulty: question.difficulty,
            kind: question.kind.as_str().to_string(),
            prompt: question.prompt.clone(),
            options,
            starter_code,
            points: question.points,
            time_limit_seconds: question.time_limit_seconds,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read question catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse question catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Question catalog is empty")]
    Empty,
    #[error("Duplicate question id '{id}' for skill '{skill}'")]
    DuplicateId { skill: String, id: String },
    #[error("Question '{id}' has difficulty {difficulty} outside [1, 10]")]
    DifficultyOutOfRange { id: String, difficulty: f64 },
    #[error("Question '{id}' has an invalid answer key: {reason}")]
    InvalidAnswerKey { id: String, reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillSummary {
    pub skill: String,
    pub question_count: usize,
    pub min_difficulty: f64,
    pub max_difficulty: f64,
}

/// Read-only table of questions keyed by skill. Order within a skill is the
/// order in which questions were supplied and is significant for selection.
#[derive(Debug, Clone, Default)]
pub struct QuestionCatalog {
    by_skill: HashMap<String, Vec<Question>>,
}

impl QuestionCatalog {
    pub fn from_questions(questions: Vec<Question>) -> Result<Self, CatalogError> {
        if questions.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut by_skill: HashMap<String, Vec<Question>> = HashMap::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();

        for question in questions {
            validate_question(&question)?;

            if !seen.insert((question.skill.clone(), question.id.clone())) {
                return Err(CatalogError::DuplicateId {
                    skill: question.skill,
                    id: question.id,
                });
            }

            by_skill
                .entry(question.skill.clone())
                .or_default()
                .push(question);
        }

        Ok(Self { by_skill })
    }

    /// Loads a catalog from a JSON array of questions.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let questions: Vec<Question> = serde_json::from_str(&raw)?;
        let catalog = Self::from_questions(questions)?;

        tracing::info!(
            "Question catalog loaded from {}: {} skills, {} questions",
            path.as_ref().display(),
            catalog.by_skill.len(),
            catalog.len()
        );

        Ok(catalog)
    }

    pub fn questions_for(&self, skill: &str) -> &[Question] {
        self.by_skill
            .get(skill)
            .map(|questions| questions.as_slice())
            .unwrap_or(&[])
    }

    pub fn find(&self, skill: &str, question_id: &str) -> Option<&Question> {
        self.questions_for(skill)
            .iter()
            .find(|question| question.id == question_id)
    }

    pub fn has_skill(&self, skill: &str) -> bool {
        !self.questions_for(skill).is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_skill.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn skills(&self) -> Vec<SkillSummary> {
        let mut summaries: Vec<SkillSummary> = self
            .by_skill
            .iter()
            .map(|(skill, questions)| SkillSummary {
                skill: skill.clone(),
                question_count: questions.len(),
                min_difficulty: questions
                    .iter()
                    .map(|q| q.difficulty)
                    .fold(MAX_DIFFICULTY, f64::min),
                max_difficulty: questions
                    .iter()
                    .map(|q| q.difficulty)
                    .fold(MIN_DIFFICULTY, f64::max),
            })
            .collect();

        summaries.sort_by(|a, b| a.skill.cmp(&b.skill));
        summaries
    }
}

fn validate_question(question: &Question) -> Result<(), CatalogError> {
    if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&question.difficulty) {
        return Err(CatalogError::DifficultyOutOfRange {
            id: question.id.clone(),
            difficulty: question.difficulty,
        });
    }

    if let QuestionKind::MultipleChoice {
        options,
        correct_option,
    } = &question.kind
    {
        if options.len() < 2 {
            return Err(CatalogError::InvalidAnswerKey {
                id: question.id.clone(),
                reason: "multiple-choice questions need at least two options".to_string(),
            });
        }
        if *correct_option >= options.len() {
            return Err(CatalogError::InvalidAnswerKey {
                id: question.id.clone(),
                reason: format!(
                    "correct option {} out of range for {} options",
                    correct_option,
                    options.len()
                ),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mc(id: &str, skill: &str, difficulty: f64) -> Question {
        Question {
            id: id.to_string(),
            skill: skill.to_string(),
            difficulty,
            prompt: format!("Question {}", id),
            kind: QuestionKind::MultipleChoice {
                options: vec!["a".to_string(), "b".to_string()],
                correct_option: 1,
            },
            points: 10,
            time_limit_seconds: 60,
        }
    }

    #[test]
    fn groups_by_skill_preserving_order() {
        let catalog = QuestionCatalog::from_questions(vec![
            mc("r1", "rust", 3.0),
            mc("g1", "go", 5.0),
            mc("r2", "rust", 7.0),
        ])
        .unwrap();

        let ids: Vec<&str> = catalog
            .questions_for("rust")
            .iter()
            .map(|q| q.id.as_str())
            .collect();
        assert_eq!(ids, vec!["r1", "r2"]);
        assert_eq!(catalog.len(), 3);
        assert!(catalog.questions_for("python").is_empty());
    }

    #[test]
    fn rejects_duplicate_ids_within_skill() {
        let err = QuestionCatalog::from_questions(vec![mc("q1", "rust", 3.0), mc("q1", "rust", 4.0)])
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId { .. }));
    }

    #[test]
    fn rejects_out_of_range_difficulty() {
        let err = QuestionCatalog::from_questions(vec![mc("q1", "rust", 11.0)]).unwrap_err();
        assert!(matches!(err, CatalogError::DifficultyOutOfRange { .. }));
    }

    #[test]
    fn rejects_answer_key_out_of_range() {
        let mut question = mc("q1", "rust", 3.0);
        question.kind = QuestionKind::MultipleChoice {
            options: vec!["a".to_string(), "b".to_string()],
            correct_option: 2,
        };
        let err = QuestionCatalog::from_questions(vec![question]).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidAnswerKey { .. }));
    }

    #[test]
    fn rejects_empty_catalog() {
        assert!(matches!(
            QuestionCatalog::from_questions(Vec::new()),
            Err(CatalogError::Empty)
        ));
    }

    #[test]
    fn view_hides_answer_key() {
        let view = QuestionView::from(&mc("q1", "rust", 3.0));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["type"], "multiple_choice");
        assert_eq!(json["options"].as_array().unwrap().len(), 2);
        assert!(json.get("correct_option").is_none());
    }

    #[test]
    fn parses_tagged_question_kinds() {
        let raw = r#"[
            {"id": "c1", "skill": "rust", "difficulty": 6, "prompt": "Write a parser", "type": "code"},
            {"id": "o1", "skill": "rust", "difficulty": 4, "prompt": "Explain borrowing", "type": "open_ended", "points": 20}
        ]"#;
        let questions: Vec<Question> = serde_json::from_str(raw).unwrap();
        assert_eq!(questions[0].kind, QuestionKind::Code { starter_code: None });
        assert_eq!(questions[1].kind, QuestionKind::OpenEnded);
        assert_eq!(questions[1].points, 20);
        assert_eq!(questions[0].time_limit_seconds, 120);
    }

    #[test]
    fn skill_summaries_are_sorted() {
        let catalog = QuestionCatalog::from_questions(vec![
            mc("r1", "rust", 3.0),
            mc("g1", "go", 5.0),
            mc("r2", "rust", 7.0),
        ])
        .unwrap();

        let skills = catalog.skills();
        assert_eq!(skills[0].skill, "go");
        assert_eq!(skills[1].question_count, 2);
        assert_eq!(skills[1].min_difficulty, 3.0);
        assert_eq!(skills[1].max_difficulty, 7.0);
    }
}
