use hack_core::GameState;
use hack_core::model::{Course, ModuleId};

use crate::views::ViewError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleRowVm {
    pub number: usize,
    pub id: ModuleId,
    pub title: String,
    pub description: String,
    pub quiz_title: String,
    pub question_count: usize,
    pub passing_score: u8,
    pub reward: u32,
    pub completed: bool,
    pub score: Option<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseDetailVm {
    pub name: String,
    pub icon: String,
    pub level_label: String,
    pub progress: u8,
    pub completed: usize,
    pub total: usize,
    pub modules: Vec<ModuleRowVm>,
    /// Shown once every module is done.
    pub completion_banner: Option<String>,
}

/// Build the course page for an unlocked course.
///
/// # Errors
///
/// Returns `ViewError::UnknownCourse` or `ViewError::CourseLocked`.
pub fn map_course_detail(state: &GameState, course_id: &str) -> Result<CourseDetailVm, ViewError> {
    let course = unlocked_course(state, course_id)?;
    let completion_banner = (course.progress() == 100).then(|| {
        format!(
            "Course Completed! You've completed all modules in {}.",
            course.name()
        )
    });

    Ok(CourseDetailVm {
        name: course.name().to_owned(),
        icon: course.icon().to_owned(),
        level_label: course.level().to_string(),
        progress: course.progress(),
        completed: course.completed_count(),
        total: course.modules().len(),
        modules: course
            .modules()
            .iter()
            .enumerate()
            .map(|(index, module)| ModuleRowVm {
                number: index + 1,
                id: module.id().clone(),
                title: module.title().to_owned(),
                description: module.description().to_owned(),
                quiz_title: module.quiz().title().to_owned(),
                question_count: module.quiz().questions().len(),
                passing_score: module.quiz().passing_score().value(),
                reward: module.quiz().diamonds_reward(),
                completed: module.is_completed(),
                score: module.score().map(|s| s.value()),
            })
            .collect(),
        completion_banner,
    })
}

pub(crate) fn unlocked_course<'a>(
    state: &'a GameState,
    course_id: &str,
) -> Result<&'a Course, ViewError> {
    let course = state
        .course(course_id)
        .ok_or_else(|| ViewError::UnknownCourse(course_id.to_owned()))?;
    if !course.is_unlocked() {
        return Err(ViewError::CourseLocked(course_id.to_owned()));
    }
    Ok(course)
}
