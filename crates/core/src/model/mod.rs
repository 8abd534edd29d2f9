mod answer;
mod ids;
mod palette;
mod question;
mod result;
mod subject;

pub use answer::{AnswerError, AnswerSlot, AnswerStore};
pub use ids::{AttemptId, ParseIdError, QuestionId, StudentId, TestId};
pub use palette::{palette_state, PaletteState};
pub use question::{PaperError, Question, QuestionError, QuestionOption, TestPaper};
pub use result::{ResultError, SubjectBreakdown, TestResult};
pub use subject::Subject;
