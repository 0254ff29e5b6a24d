use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::ids::{CourseId, ModuleId};
use crate::model::score::Score;

/// Cross-session record of what the user has earned, unlocked and completed.
///
/// This is the canonical copy of the user's state; the per-course flags on
/// [`crate::model::Course`] mirror it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    diamonds: u32,
    courses_unlocked: Vec<CourseId>,
    modules_completed: BTreeMap<CourseId, Vec<ModuleId>>,
    quiz_scores: BTreeMap<CourseId, BTreeMap<ModuleId, Score>>,
    total_diamonds_earned: u32,
    // Absent in older snapshots; `GameState::from_parts` refills it from passing scores.
    #[serde(default)]
    modules_rewarded: BTreeMap<CourseId, Vec<ModuleId>>,
}

impl UserProgress {
    #[must_use]
    pub fn new(diamonds: u32, courses_unlocked: Vec<CourseId>) -> Self {
        Self {
            diamonds,
            courses_unlocked,
            modules_completed: BTreeMap::new(),
            quiz_scores: BTreeMap::new(),
            total_diamonds_earned: 0,
            modules_rewarded: BTreeMap::new(),
        }
    }

    /// Current spendable balance.
    #[must_use]
    pub fn diamonds(&self) -> u32 {
        self.diamonds
    }

    /// Lifetime diamonds credited, never decremented by spending.
    #[must_use]
    pub fn total_diamonds_earned(&self) -> u32 {
        self.total_diamonds_earned
    }

    #[must_use]
    pub fn courses_unlocked(&self) -> &[CourseId] {
        &self.courses_unlocked
    }

    #[must_use]
    pub fn is_unlocked(&self, course_id: &str) -> bool {
        self.courses_unlocked.iter().any(|id| id == course_id)
    }

    #[must_use]
    pub fn modules_completed(&self) -> &BTreeMap<CourseId, Vec<ModuleId>> {
        &self.modules_completed
    }

    #[must_use]
    pub fn completed_modules(&self, course_id: &str) -> &[ModuleId] {
        match self.modules_completed.get(course_id) {
            Some(ids) => ids,
            None => &[],
        }
    }

    #[must_use]
    pub fn is_completed(&self, course_id: &str, module_id: &str) -> bool {
        self.completed_modules(course_id)
            .iter()
            .any(|id| id == module_id)
    }

    #[must_use]
    pub fn quiz_scores(&self) -> &BTreeMap<CourseId, BTreeMap<ModuleId, Score>> {
        &self.quiz_scores
    }

    #[must_use]
    pub fn score(&self, course_id: &str, module_id: &str) -> Option<Score> {
        self.quiz_scores
            .get(course_id)
            .and_then(|scores| scores.get(module_id))
            .copied()
    }

    #[must_use]
    pub fn modules_rewarded(&self) -> &BTreeMap<CourseId, Vec<ModuleId>> {
        &self.modules_rewarded
    }

    /// True once the quiz reward for this module has been paid out.
    #[must_use]
    pub fn is_rewarded(&self, course_id: &str, module_id: &str) -> bool {
        self.modules_rewarded
            .get(course_id)
            .is_some_and(|ids| ids.iter().any(|id| id == module_id))
    }

    pub(crate) fn set_diamonds(&mut self, diamonds: u32) {
        self.diamonds = diamonds;
    }

    pub(crate) fn set_total_earned(&mut self, total: u32) {
        self.total_diamonds_earned = total;
    }

    pub(crate) fn push_unlocked(&mut self, course_id: CourseId) {
        if !self.is_unlocked(course_id.as_str()) {
            self.courses_unlocked.push(course_id);
        }
    }

    /// Records a completion; returns true if the module was not yet in the list.
    pub(crate) fn record_completion(
        &mut self,
        course_id: &CourseId,
        module_id: &ModuleId,
        score: Score,
    ) -> bool {
        let completed = self.modules_completed.entry(course_id.clone()).or_default();
        let first = !completed.contains(module_id);
        if first {
            completed.push(module_id.clone());
        }
        self.quiz_scores
            .entry(course_id.clone())
            .or_default()
            .insert(module_id.clone(), score);
        first
    }

    pub(crate) fn record_reward(&mut self, course_id: &CourseId, module_id: &ModuleId) {
        let rewarded = self.modules_rewarded.entry(course_id.clone()).or_default();
        if !rewarded.contains(module_id) {
            rewarded.push(module_id.clone());
        }
    }
}
