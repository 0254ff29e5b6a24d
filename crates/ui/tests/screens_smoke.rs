use std::sync::Arc;

use hack_core::Catalog;
use hack_core::time::fixed_clock;
use services::ProgressStore;
use storage::repository::InMemoryRepository;
use ui::ViewError;
use ui::vm::{QuizScreen, map_course_detail, map_home, map_quiz_attempt};

#[tokio::test]
async fn quiz_screens_follow_an_attempt_to_the_payout() {
    let mut store = ProgressStore::new(
        Catalog::builtin().unwrap(),
        Arc::new(InMemoryRepository::new()),
        fixed_clock(),
    );

    let mut attempt = store.start_quiz("html", "html-1").unwrap();
    while !attempt.runner().is_finished() {
        let runner = attempt.runner_mut();
        let correct = runner.current_question().unwrap().correct_answer();
        runner.select_option(correct).unwrap();
        runner.submit_answer().unwrap();
        runner.advance().unwrap();
    }
    store.finish_quiz(&mut attempt).await.unwrap();

    let QuizScreen::Result(result) = map_quiz_attempt(&attempt).screen else {
        panic!("expected the result screen");
    };
    assert!(result.passed);
    assert!(result.detail.contains("+5"));

    let home = map_home(&store);
    assert_eq!(home.diamonds, 30);
    assert_eq!(home.courses[0].progress, 20);

    let course = map_course_detail(store.state(), "html").unwrap();
    assert_eq!(course.modules[0].score, Some(100));
    assert_eq!(
        map_course_detail(store.state(), "cpp").unwrap_err(),
        ViewError::CourseLocked("cpp".into())
    );
    assert_eq!(
        ViewError::CourseLocked("cpp".into()).message(),
        "Unlock this course with diamonds first."
    );
}
