//! Taking a module's quiz from start to a recorded completion.

use tracing::debug;

use hack_core::model::{CourseId, ModuleId};
use hack_core::{ModuleCompletion, QuizRunner};

use crate::error::QuizFlowError;
use crate::progress_store::ProgressStore;

/// One run through a module's quiz.
///
/// The result is applied to the store at most once.
#[derive(Debug, Clone)]
pub struct QuizAttempt {
    course_id: CourseId,
    module_id: ModuleId,
    runner: QuizRunner,
    applied: Option<ModuleCompletion>,
}

impl QuizAttempt {
    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    #[must_use]
    pub fn module_id(&self) -> &ModuleId {
        &self.module_id
    }

    #[must_use]
    pub fn runner(&self) -> &QuizRunner {
        &self.runner
    }

    /// Mutable runner for answering questions. Ignored once applied.
    pub fn runner_mut(&mut self) -> &mut QuizRunner {
        &mut self.runner
    }

    /// Completion recorded by `ProgressStore::finish_quiz`, if any.
    #[must_use]
    pub fn completion(&self) -> Option<&ModuleCompletion> {
        self.applied.as_ref()
    }

    #[must_use]
    pub fn is_applied(&self) -> bool {
        self.applied.is_some()
    }
}

impl ProgressStore {
    /// Open the quiz of a module in an unlocked course.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::UnknownCourse`, `QuizFlowError::UnknownModule`,
    /// or `QuizFlowError::CourseLocked`.
    pub fn start_quiz(&self, course_id: &str, module_id: &str) -> Result<QuizAttempt, QuizFlowError> {
        let course = self
            .state()
            .course(course_id)
            .ok_or_else(|| QuizFlowError::UnknownCourse(course_id.to_owned()))?;
        if !course.is_unlocked() {
            return Err(QuizFlowError::CourseLocked(course_id.to_owned()));
        }
        let module = course
            .module(module_id)
            .ok_or_else(|| QuizFlowError::UnknownModule {
                course: course_id.to_owned(),
                module: module_id.to_owned(),
            })?;

        let runner = QuizRunner::new(module.quiz().clone())?;
        debug!(course = course_id, module = module_id, "quiz started");
        Ok(QuizAttempt {
            course_id: course.id().clone(),
            module_id: module.id().clone(),
            runner,
            applied: None,
        })
    }

    /// Record a finished attempt's score against its module.
    ///
    /// # Errors
    ///
    /// Returns `QuizFlowError::NotFinished` before the last answer is in,
    /// `QuizFlowError::AlreadyApplied` on a second call, or
    /// `QuizFlowError::Store` if the completion is refused.
    pub async fn finish_quiz(
        &mut self,
        attempt: &mut QuizAttempt,
    ) -> Result<ModuleCompletion, QuizFlowError> {
        if attempt.applied.is_some() {
            return Err(QuizFlowError::AlreadyApplied);
        }
        let result = attempt.runner.result().ok_or(QuizFlowError::NotFinished)?;

        let completion = self
            .complete_module(
                attempt.course_id.as_str(),
                attempt.module_id.as_str(),
                result.score,
            )
            .await?;
        attempt.applied = Some(completion.clone());
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use hack_core::Catalog;
    use hack_core::time::fixed_clock;
    use storage::repository::InMemoryRepository;

    fn store() -> ProgressStore {
        ProgressStore::new(
            Catalog::builtin().unwrap(),
            Arc::new(InMemoryRepository::new()),
            fixed_clock(),
        )
    }

    fn answer_all(attempt: &mut QuizAttempt, right: usize) {
        let runner = attempt.runner_mut();
        let total = runner.total_questions();
        for index in 0..total {
            let question = &runner.quiz().questions()[index];
            let correct = question.correct_answer();
            let pick = if index < right {
                correct
            } else {
                (correct + 1) % question.options().len()
            };
            runner.select_option(pick).unwrap();
            runner.submit_answer().unwrap();
            runner.advance().unwrap();
        }
    }

    #[tokio::test]
    async fn passing_attempt_is_applied_once() {
        let mut store = store();
        let mut attempt = store.start_quiz("html", "html-1").unwrap();
        answer_all(&mut attempt, 4);

        let completion = store.finish_quiz(&mut attempt).await.unwrap();
        assert_eq!(completion.score.value(), 80);
        assert!(completion.passed);
        assert_eq!(completion.diamonds_awarded, 5);
        assert_eq!(attempt.completion(), Some(&completion));

        assert!(matches!(
            store.finish_quiz(&mut attempt).await,
            Err(QuizFlowError::AlreadyApplied)
        ));
        assert_eq!(store.state().diamonds(), 30);
    }

    #[tokio::test]
    async fn unfinished_attempt_is_not_applied() {
        let mut store = store();
        let mut attempt = store.start_quiz("css", "css-1").unwrap();
        assert!(matches!(
            store.finish_quiz(&mut attempt).await,
            Err(QuizFlowError::NotFinished)
        ));
        assert!(!attempt.is_applied());
        assert!(!store.state().progress().is_completed("css", "css-1"));
    }

    #[tokio::test]
    async fn failed_then_passed_pays_on_the_pass() {
        let mut store = store();

        let mut first = store.start_quiz("js", "js-1").unwrap();
        answer_all(&mut first, 2);
        let failed = store.finish_quiz(&mut first).await.unwrap();
        assert!(!failed.passed);
        assert_eq!(failed.diamonds_awarded, 0);
        assert_eq!(store.state().course("js").unwrap().progress(), 100);

        let mut second = store.start_quiz("js", "js-1").unwrap();
        answer_all(&mut second, 5);
        let passed = store.finish_quiz(&mut second).await.unwrap();
        assert_eq!(passed.diamonds_awarded, 5);
        assert!(!passed.first_completion);
        assert_eq!(store.state().diamonds(), 30);
    }

    #[test]
    fn locked_or_unknown_targets_cannot_start() {
        let store = store();
        assert!(matches!(
            store.start_quiz("java", "java-1"),
            Err(QuizFlowError::CourseLocked(_))
        ));
        assert!(matches!(
            store.start_quiz("rust", "rust-1"),
            Err(QuizFlowError::UnknownCourse(_))
        ));
        assert!(matches!(
            store.start_quiz("html", "html-9"),
            Err(QuizFlowError::UnknownModule { .. })
        ));
    }
}
