pub mod assessment;
pub mod question;

pub use assessment::{
    AssessmentSession, AssessmentStatus, AssessmentSummary, CreateAssessmentRequest,
    CreateAssessmentResponse, SubmitResponseRequest, SubmitResponseResponse,
};
pub use question::{Question, QuestionCatalog, QuestionKind, QuestionView, SkillSummary};
