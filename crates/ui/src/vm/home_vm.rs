use hack_core::model::{Course, CourseId};
use services::ProgressStore;

use crate::vm::time_fmt::format_datetime;

/// One tile in the course grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseCardVm {
    pub id: CourseId,
    pub name: String,
    pub icon: String,
    pub level_label: String,
    pub color: String,
    pub module_count: usize,
    pub completed_count: usize,
    pub progress: u8,
    pub unlocked: bool,
    pub unlock_cost: u32,
    pub affordable: bool,
    /// Diamonds still missing to unlock; zero when affordable or unlocked.
    pub shortfall: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HomeVm {
    pub diamonds: u32,
    pub total_earned: u32,
    pub last_saved: Option<String>,
    pub courses: Vec<CourseCardVm>,
}

impl HomeVm {
    #[must_use]
    pub fn unlocked_count(&self) -> usize {
        self.courses.iter().filter(|c| c.unlocked).count()
    }
}

#[must_use]
pub fn map_home(store: &ProgressStore) -> HomeVm {
    let state = store.state();
    let diamonds = state.diamonds();
    HomeVm {
        diamonds,
        total_earned: state.progress().total_diamonds_earned(),
        last_saved: store.last_saved().map(format_datetime),
        courses: state
            .courses()
            .iter()
            .map(|course| map_course_card(course, diamonds))
            .collect(),
    }
}

fn map_course_card(course: &Course, diamonds: u32) -> CourseCardVm {
    let cost = course.required_diamonds();
    let unlocked = course.is_unlocked();
    CourseCardVm {
        id: course.id().clone(),
        name: course.name().to_owned(),
        icon: course.icon().to_owned(),
        level_label: course.level().as_str().to_ascii_uppercase(),
        color: course.color().to_owned(),
        module_count: course.modules().len(),
        completed_count: course.completed_count(),
        progress: course.progress(),
        unlocked,
        unlock_cost: cost,
        affordable: diamonds >= cost,
        shortfall: if unlocked { 0 } else { cost.saturating_sub(diamonds) },
    }
}
