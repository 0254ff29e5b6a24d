mod course;
mod ids;
mod progress;
mod quiz;
mod score;

pub use course::{Course, CourseError, Level, Module};
pub use ids::{CourseId, ModuleId, ParseIdError, QuestionId, QuizId};
pub use progress::UserProgress;
pub use quiz::{Quiz, QuizError, QuizQuestion};
pub use score::{Score, ScoreError, completion_percent};
