mod course_vm;
mod home_vm;
mod module_vm;
mod quiz_vm;
mod time_fmt;

pub use course_vm::{CourseDetailVm, ModuleRowVm, map_course_detail};
pub use home_vm::{CourseCardVm, HomeVm, map_home};
pub use module_vm::{ContentBlock, ModuleDetailVm, QuizSummaryVm, content_blocks, map_module_detail};
pub use quiz_vm::{
    OptionMark, QuizFeedbackVm, QuizOptionVm, QuizQuestionVm, QuizResultVm, QuizScreen, QuizVm,
    map_quiz, map_quiz_attempt,
};
pub use time_fmt::format_datetime;
