use std::collections::HashSet;
use thiserror::Error;

use crate::model::{Course, CourseError, CourseId, Module, ModuleId, Score, UserProgress};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Rejected reward/unlock operations. State is unchanged whenever one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RewardError {
    #[error("unknown course: {0}")]
    UnknownCourse(String),

    #[error("unknown module {module} in course {course}")]
    UnknownModule { course: String, module: String },

    #[error("course {0} is already unlocked")]
    AlreadyUnlocked(String),

    #[error("not enough diamonds: need {required}, have {available}")]
    InsufficientDiamonds { required: u32, available: u32 },

    #[error("adding {amount} diamonds to {balance} would overflow")]
    BalanceOverflow { balance: u32, amount: u32 },
}

/// Disagreement between `UserProgress` and the per-course mirror fields.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConsistencyError {
    #[error(transparent)]
    Course(#[from] CourseError),

    #[error("course id {0} appears more than once")]
    DuplicateCourse(CourseId),

    #[error("progress references unknown course {0}")]
    UnknownCourse(CourseId),

    #[error("course {0} appears more than once in the unlocked list")]
    DuplicateUnlock(CourseId),

    #[error("course {course}: unlocked flag is {flag} but unlocked list says {listed}")]
    UnlockMismatch {
        course: CourseId,
        flag: bool,
        listed: bool,
    },

    #[error("progress references unknown module {module} in course {course}")]
    UnknownModule { course: CourseId, module: ModuleId },

    #[error("module {module} is listed more than once as completed in course {course}")]
    DuplicateCompletion { course: CourseId, module: ModuleId },

    #[error("module {module} in course {course}: completed flag disagrees with progress")]
    CompletionMismatch { course: CourseId, module: ModuleId },

    #[error("module {module} in course {course}: score disagrees with progress")]
    ScoreMismatch { course: CourseId, module: ModuleId },

    #[error("module {module} in course {course} was rewarded but never completed")]
    RewardWithoutCompletion { course: CourseId, module: ModuleId },

    #[error("course {course}: stored progress {stored}% but computed {computed}%")]
    ProgressMismatch {
        course: CourseId,
        stored: u8,
        computed: u8,
    },
}

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Result of a successful `unlock_course`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseUnlock {
    pub course_id: CourseId,
    pub spent: u32,
    pub balance: u32,
}

/// Result of a successful `complete_module`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleCompletion {
    pub course_id: CourseId,
    pub module_id: ModuleId,
    pub score: Score,
    pub passed: bool,
    /// Diamonds credited by this call; zero on failing scores and on repeat passes.
    pub diamonds_awarded: u32,
    /// False if the module was already in the completed list.
    pub first_completion: bool,
    /// Course progress after the completion.
    pub progress: u8,
}

//
// ─── GAME STATE ────────────────────────────────────────────────────────────────
//

/// Course list and user progress, mutated only through the reward/unlock
/// operations below so the two copies stay in agreement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    courses: Vec<Course>,
    progress: UserProgress,
}

impl GameState {
    pub(crate) fn assemble(courses: Vec<Course>, progress: UserProgress) -> Self {
        Self { courses, progress }
    }

    /// Rebuild state from persisted parts, rejecting anything inconsistent.
    ///
    /// # Errors
    ///
    /// Returns `ConsistencyError` if a course is malformed or the mirrors disagree.
    pub fn from_parts(
        courses: Vec<Course>,
        progress: UserProgress,
    ) -> Result<Self, ConsistencyError> {
        let mut state = Self { courses, progress };
        state.verify()?;
        state.backfill_rewards();
        Ok(state)
    }

    /// Every completed module whose recorded score passes has already been
    /// paid, whether or not the loaded ledger says so.
    fn backfill_rewards(&mut self) {
        for course in &self.courses {
            for module in course.modules() {
                let threshold = module.quiz().passing_score();
                let passed = module.is_completed()
                    && module.score().is_some_and(|score| score.passes(threshold));
                if passed {
                    self.progress.record_reward(course.id(), module.id());
                }
            }
        }
    }

    #[must_use]
    pub fn into_parts(self) -> (Vec<Course>, UserProgress) {
        (self.courses, self.progress)
    }

    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    #[must_use]
    pub fn course(&self, course_id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id() == course_id)
    }

    #[must_use]
    pub fn module(&self, course_id: &str, module_id: &str) -> Option<&Module> {
        self.course(course_id).and_then(|c| c.module(module_id))
    }

    #[must_use]
    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    #[must_use]
    pub fn diamonds(&self) -> u32 {
        self.progress.diamonds()
    }

    #[must_use]
    pub fn is_unlocked(&self, course_id: &str) -> bool {
        self.course(course_id).is_some_and(Course::is_unlocked)
    }

    /// True if the balance covers the course's unlock cost.
    #[must_use]
    pub fn can_afford(&self, course_id: &str) -> bool {
        self.course(course_id)
            .is_some_and(|c| self.progress.diamonds() >= c.required_diamonds())
    }

    /// Credit diamonds to both the balance and the lifetime counter.
    ///
    /// # Errors
    ///
    /// Returns `RewardError::BalanceOverflow` if either counter would overflow.
    pub fn add_diamonds(&mut self, amount: u32) -> Result<u32, RewardError> {
        let balance = self.progress.diamonds();
        let new_balance = balance
            .checked_add(amount)
            .ok_or(RewardError::BalanceOverflow { balance, amount })?;
        let earned = self.progress.total_diamonds_earned();
        let new_earned = earned
            .checked_add(amount)
            .ok_or(RewardError::BalanceOverflow {
                balance: earned,
                amount,
            })?;

        self.progress.set_diamonds(new_balance);
        self.progress.set_total_earned(new_earned);
        Ok(new_balance)
    }

    /// Debit diamonds if the balance covers `amount`.
    ///
    /// # Errors
    ///
    /// Returns `RewardError::InsufficientDiamonds` and leaves the balance alone
    /// when `amount` exceeds it.
    pub fn spend_diamonds(&mut self, amount: u32) -> Result<u32, RewardError> {
        let available = self.progress.diamonds();
        if available < amount {
            return Err(RewardError::InsufficientDiamonds {
                required: amount,
                available,
            });
        }
        let balance = available - amount;
        self.progress.set_diamonds(balance);
        Ok(balance)
    }

    /// Pay a course's unlock cost and unlock it, or do neither.
    ///
    /// # Errors
    ///
    /// Returns `RewardError::UnknownCourse`, `RewardError::AlreadyUnlocked`, or
    /// `RewardError::InsufficientDiamonds`.
    pub fn unlock_course(&mut self, course_id: &str) -> Result<CourseUnlock, RewardError> {
        let index = self.course_index(course_id)?;
        let course = &self.courses[index];
        if course.is_unlocked() {
            return Err(RewardError::AlreadyUnlocked(course_id.to_owned()));
        }
        let cost = course.required_diamonds();
        let id = course.id().clone();

        let balance = self.spend_diamonds(cost)?;
        self.courses[index].mark_unlocked();
        self.progress.push_unlocked(id.clone());

        Ok(CourseUnlock {
            course_id: id,
            spent: cost,
            balance,
        })
    }

    /// Record a quiz score for a module and pay the reward on the first pass.
    ///
    /// The module is marked completed whatever the score. Its id enters the
    /// completed list at most once, the stored score is overwritten, and
    /// course progress is recomputed.
    ///
    /// # Errors
    ///
    /// Returns `RewardError::UnknownCourse` / `RewardError::UnknownModule` for
    /// bad ids, or `RewardError::BalanceOverflow` if the reward cannot be credited.
    pub fn complete_module(
        &mut self,
        course_id: &str,
        module_id: &str,
        score: Score,
    ) -> Result<ModuleCompletion, RewardError> {
        let index = self.course_index(course_id)?;
        let course = &self.courses[index];
        let module = course
            .module(module_id)
            .ok_or_else(|| RewardError::UnknownModule {
                course: course_id.to_owned(),
                module: module_id.to_owned(),
            })?;
        let course_key = course.id().clone();
        let module_key = module.id().clone();
        let passed = score.passes(module.quiz().passing_score());
        let reward = module.quiz().diamonds_reward();

        // Crediting is the only step that can fail, so it runs first.
        let diamonds_awarded = if passed && !self.progress.is_rewarded(course_id, module_id) {
            self.add_diamonds(reward)?;
            self.progress.record_reward(&course_key, &module_key);
            reward
        } else {
            0
        };

        if let Some(module) = self.courses[index].module_mut(module_id) {
            module.mark_completed(score);
        }
        let first_completion = self
            .progress
            .record_completion(&course_key, &module_key, score);
        let progress = self.courses[index].refresh_progress();

        Ok(ModuleCompletion {
            course_id: course_key,
            module_id: module_key,
            score,
            passed,
            diamonds_awarded,
            first_completion,
            progress,
        })
    }

    /// Recompute and store `round(100 * completed / total)` for a course.
    ///
    /// # Errors
    ///
    /// Returns `RewardError::UnknownCourse` for bad ids.
    pub fn update_course_progress(&mut self, course_id: &str) -> Result<u8, RewardError> {
        let index = self.course_index(course_id)?;
        Ok(self.courses[index].refresh_progress())
    }

    /// Check that the course mirrors agree with `UserProgress`.
    ///
    /// # Errors
    ///
    /// Returns the first `ConsistencyError` found.
    pub fn verify(&self) -> Result<(), ConsistencyError> {
        let mut course_ids = HashSet::with_capacity(self.courses.len());
        for course in &self.courses {
            course.validate()?;
            if !course_ids.insert(course.id().as_str()) {
                return Err(ConsistencyError::DuplicateCourse(course.id().clone()));
            }
            self.verify_course(course)?;
        }

        let mut unlocked = HashSet::with_capacity(self.progress.courses_unlocked().len());
        for id in self.progress.courses_unlocked() {
            if !course_ids.contains(id.as_str()) {
                return Err(ConsistencyError::UnknownCourse(id.clone()));
            }
            if !unlocked.insert(id.as_str()) {
                return Err(ConsistencyError::DuplicateUnlock(id.clone()));
            }
        }

        let progress_keys = self
            .progress
            .modules_completed()
            .keys()
            .chain(self.progress.quiz_scores().keys())
            .chain(self.progress.modules_rewarded().keys());
        for id in progress_keys {
            if !course_ids.contains(id.as_str()) {
                return Err(ConsistencyError::UnknownCourse(id.clone()));
            }
        }
        Ok(())
    }

    fn verify_course(&self, course: &Course) -> Result<(), ConsistencyError> {
        let id = course.id().as_str();
        let listed = self.progress.is_unlocked(id);
        if listed != course.is_unlocked() {
            return Err(ConsistencyError::UnlockMismatch {
                course: course.id().clone(),
                flag: course.is_unlocked(),
                listed,
            });
        }

        let unknown = |module: &ModuleId| ConsistencyError::UnknownModule {
            course: course.id().clone(),
            module: module.clone(),
        };

        let mut completed = HashSet::new();
        for module_id in self.progress.completed_modules(id) {
            if course.module(module_id.as_str()).is_none() {
                return Err(unknown(module_id));
            }
            if !completed.insert(module_id.as_str()) {
                return Err(ConsistencyError::DuplicateCompletion {
                    course: course.id().clone(),
                    module: module_id.clone(),
                });
            }
        }
        let scored = self.progress.quiz_scores().get(id).into_iter().flat_map(|m| m.keys());
        let rewarded = self.progress.modules_rewarded().get(id).into_iter().flatten();
        for module_id in scored.chain(rewarded) {
            if course.module(module_id.as_str()).is_none() {
                return Err(unknown(module_id));
            }
        }

        for module in course.modules() {
            let module_id = module.id().as_str();
            if completed.contains(module_id) != module.is_completed() {
                return Err(ConsistencyError::CompletionMismatch {
                    course: course.id().clone(),
                    module: module.id().clone(),
                });
            }
            if self.progress.score(id, module_id) != module.score() {
                return Err(ConsistencyError::ScoreMismatch {
                    course: course.id().clone(),
                    module: module.id().clone(),
                });
            }
            if self.progress.is_rewarded(id, module_id) && !module.is_completed() {
                return Err(ConsistencyError::RewardWithoutCompletion {
                    course: course.id().clone(),
                    module: module.id().clone(),
                });
            }
        }

        let computed = course.computed_progress();
        if course.progress() != computed {
            return Err(ConsistencyError::ProgressMismatch {
                course: course.id().clone(),
                stored: course.progress(),
                computed,
            });
        }
        Ok(())
    }

    fn course_index(&self, course_id: &str) -> Result<usize, RewardError> {
        self.courses
            .iter()
            .position(|c| c.id() == course_id)
            .ok_or_else(|| RewardError::UnknownCourse(course_id.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn fresh() -> GameState {
        Catalog::builtin().unwrap().initial_state()
    }

    fn score(value: u8) -> Score {
        Score::new(value).unwrap()
    }

    #[test]
    fn new_user_starts_with_defaults() {
        let state = fresh();
        assert_eq!(state.diamonds(), 25);
        let unlocked: Vec<&str> = state
            .progress()
            .courses_unlocked()
            .iter()
            .map(CourseId::as_str)
            .collect();
        assert_eq!(unlocked, ["html", "css", "js"]);
        state.verify().unwrap();
    }

    #[test]
    fn spend_then_add_restores_balance() {
        let mut state = fresh();
        for amount in [0, 1, 7, 25] {
            let before = state.diamonds();
            state.spend_diamonds(amount).unwrap();
            state.add_diamonds(amount).unwrap();
            assert_eq!(state.diamonds(), before);
        }
    }

    #[test]
    fn overspending_is_rejected_without_change() {
        let mut state = fresh();
        let err = state.spend_diamonds(26).unwrap_err();
        assert_eq!(
            err,
            RewardError::InsufficientDiamonds {
                required: 26,
                available: 25
            }
        );
        assert_eq!(state.diamonds(), 25);
    }

    #[test]
    fn add_counts_towards_lifetime_total() {
        let mut state = fresh();
        state.add_diamonds(10).unwrap();
        state.spend_diamonds(30).unwrap();
        assert_eq!(state.diamonds(), 5);
        assert_eq!(state.progress().total_diamonds_earned(), 10);
    }

    #[test]
    fn overflowing_credit_is_rejected() {
        let mut state = fresh();
        let err = state.add_diamonds(u32::MAX).unwrap_err();
        assert!(matches!(err, RewardError::BalanceOverflow { .. }));
        assert_eq!(state.diamonds(), 25);
        assert_eq!(state.progress().total_diamonds_earned(), 0);
    }

    #[test]
    fn unlock_without_funds_changes_nothing() {
        let mut state = fresh();
        let before = state.clone();
        let err = state.unlock_course("java").unwrap_err();
        assert_eq!(
            err,
            RewardError::InsufficientDiamonds {
                required: 30,
                available: 25
            }
        );
        assert_eq!(state, before);
        assert!(!state.is_unlocked("java"));
    }

    #[test]
    fn unlock_deducts_exactly_once() {
        let mut state = fresh();
        state.add_diamonds(5).unwrap();
        let unlock = state.unlock_course("java").unwrap();
        assert_eq!(unlock.spent, 30);
        assert_eq!(unlock.balance, 0);
        assert!(state.is_unlocked("java"));
        assert!(state.progress().is_unlocked("java"));

        state.add_diamonds(100).unwrap();
        assert_eq!(
            state.unlock_course("java").unwrap_err(),
            RewardError::AlreadyUnlocked("java".into())
        );
        assert_eq!(state.diamonds(), 100);
        state.verify().unwrap();
    }

    #[test]
    fn unlock_unknown_course_fails() {
        let mut state = fresh();
        assert_eq!(
            state.unlock_course("cobol").unwrap_err(),
            RewardError::UnknownCourse("cobol".into())
        );
    }

    #[test]
    fn passing_first_module_pays_and_updates_progress() {
        let mut state = fresh();
        assert_eq!(state.course("html").unwrap().progress(), 0);

        let done = state.complete_module("html", "html-1", score(80)).unwrap();
        assert!(done.passed);
        assert!(done.first_completion);
        assert_eq!(done.diamonds_awarded, 5);
        assert_eq!(done.progress, 20);

        assert_eq!(state.diamonds(), 30);
        assert!(state.progress().is_completed("html", "html-1"));
        assert_eq!(state.course("html").unwrap().progress(), 20);
        assert_eq!(state.module("html", "html-1").unwrap().score(), Some(score(80)));
        state.verify().unwrap();
    }

    #[test]
    fn repeat_completion_neither_duplicates_nor_repays() {
        let mut state = fresh();
        state.complete_module("html", "html-1", score(80)).unwrap();
        let again = state.complete_module("html", "html-1", score(100)).unwrap();

        assert!(!again.first_completion);
        assert_eq!(again.diamonds_awarded, 0);
        assert_eq!(state.diamonds(), 30);
        assert_eq!(state.progress().completed_modules("html").len(), 1);
        assert_eq!(state.progress().score("html", "html-1"), Some(score(100)));
    }

    #[test]
    fn failing_then_passing_pays_on_the_pass() {
        let mut state = fresh();
        let failed = state.complete_module("html", "html-2", score(40)).unwrap();
        assert!(!failed.passed);
        assert_eq!(failed.diamonds_awarded, 0);
        assert!(state.module("html", "html-2").unwrap().is_completed());

        let passed = state.complete_module("html", "html-2", score(70)).unwrap();
        assert_eq!(passed.diamonds_awarded, 5);
        assert_eq!(state.diamonds(), 30);

        state.complete_module("html", "html-2", score(10)).unwrap();
        state.complete_module("html", "html-2", score(90)).unwrap();
        assert_eq!(state.diamonds(), 30);
        assert_eq!(state.progress().total_diamonds_earned(), 5);
    }

    #[test]
    fn restoring_without_ledger_keeps_passed_rewards_paid() {
        let mut state = fresh();
        state.complete_module("html", "html-1", score(80)).unwrap();
        state.complete_module("html", "html-2", score(40)).unwrap();

        let (courses, progress) = state.into_parts();
        let mut json = serde_json::to_value(&progress).unwrap();
        json.as_object_mut().unwrap().remove("modulesRewarded");
        let progress: UserProgress = serde_json::from_value(json).unwrap();
        assert!(progress.modules_rewarded().is_empty());

        let mut restored = GameState::from_parts(courses, progress).unwrap();
        assert!(restored.progress().is_rewarded("html", "html-1"));
        assert!(!restored.progress().is_rewarded("html", "html-2"));

        let before = restored.diamonds();
        let again = restored.complete_module("html", "html-1", score(80)).unwrap();
        assert_eq!(again.diamonds_awarded, 0);
        assert_eq!(restored.diamonds(), before);

        let late = restored.complete_module("html", "html-2", score(100)).unwrap();
        assert_eq!(late.diamonds_awarded, 5);
    }

    #[test]
    fn complete_unknown_module_fails_cleanly() {
        let mut state = fresh();
        let before = state.clone();
        let err = state.complete_module("html", "html-99", score(100)).unwrap_err();
        assert!(matches!(err, RewardError::UnknownModule { .. }));
        assert_eq!(state, before);
    }

    #[test]
    fn two_of_five_modules_is_forty_percent() {
        let mut state = fresh();
        state.complete_module("html", "html-1", score(100)).unwrap();
        state.complete_module("html", "html-3", score(0)).unwrap();
        assert_eq!(state.update_course_progress("html").unwrap(), 40);
        assert_eq!(state.course("html").unwrap().progress(), 40);
    }

    #[test]
    fn empty_course_progress_is_zero() {
        let mut state = fresh();
        assert_eq!(state.update_course_progress("kotlin").unwrap(), 0);
    }

    #[test]
    fn verify_detects_unlock_mismatch() {
        let state = fresh();
        let (courses, _) = state.into_parts();
        let progress = UserProgress::new(25, vec![CourseId::new("html").unwrap()]);
        let err = GameState::from_parts(courses, progress).unwrap_err();
        assert!(matches!(err, ConsistencyError::UnlockMismatch { .. }));
    }

    #[test]
    fn verify_detects_unknown_course_in_progress() {
        let state = fresh();
        let (courses, mut progress) = state.into_parts();
        progress.push_unlocked(CourseId::new("cobol").unwrap());
        let err = GameState::from_parts(courses, progress).unwrap_err();
        assert_eq!(
            err,
            ConsistencyError::UnknownCourse(CourseId::new("cobol").unwrap())
        );
    }

    #[test]
    fn verify_detects_completion_without_flag() {
        let state = fresh();
        let (courses, mut progress) = state.into_parts();
        progress.record_completion(
            &CourseId::new("html").unwrap(),
            &ModuleId::new("html-1").unwrap(),
            score(90),
        );
        let err = GameState::from_parts(courses, progress).unwrap_err();
        assert!(matches!(err, ConsistencyError::CompletionMismatch { .. }));
    }
}
