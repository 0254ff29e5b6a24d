//! Plain-text rendering of the view models for terminal front-ends.

use std::fmt;

use crate::vm::{
    ContentBlock, CourseDetailVm, HomeVm, ModuleDetailVm, OptionMark, QuizScreen, QuizVm,
};

const BAR_WIDTH: usize = 20;

fn bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

impl fmt::Display for HomeVm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Diamonds: {} (earned {} total)",
            self.diamonds, self.total_earned
        )?;
        if let Some(saved) = &self.last_saved {
            writeln!(f, "Last saved: {saved}")?;
        }
        writeln!(f)?;
        for course in &self.courses {
            write!(f, "{} {:<12} {:<12} ", course.icon, course.name, course.level_label)?;
            if course.unlocked {
                writeln!(
                    f,
                    "{} {:>3}%  {}/{} modules",
                    bar(course.progress),
                    course.progress,
                    course.completed_count,
                    course.module_count
                )?;
            } else if course.affordable {
                writeln!(f, "locked, unlock for {} diamonds", course.unlock_cost)?;
            } else {
                writeln!(
                    f,
                    "locked, needs {} diamonds ({} more)",
                    course.unlock_cost, course.shortfall
                )?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for CourseDetailVm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} ({})", self.icon, self.name, self.level_label)?;
        writeln!(
            f,
            "Course Progress {} {}%  {}/{} modules",
            bar(self.progress),
            self.progress,
            self.completed,
            self.total
        )?;
        if self.modules.is_empty() {
            writeln!(f, "\nNo modules yet.")?;
        }
        for row in &self.modules {
            let status = if row.completed { "done" } else { "todo" };
            writeln!(f, "\n{}. [{status}] {}  ({})", row.number, row.title, row.id)?;
            writeln!(f, "   {}", row.description)?;
            writeln!(
                f,
                "   {}: {} questions, pass at {}%, +{} diamonds",
                row.quiz_title, row.question_count, row.passing_score, row.reward
            )?;
            if let Some(score) = row.score {
                writeln!(f, "   Your score: {score}%")?;
            }
        }
        if let Some(banner) = &self.completion_banner {
            writeln!(f, "\n{banner}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ModuleDetailVm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} / {}", self.course_name, self.title)?;
        writeln!(f, "{}\n", self.description)?;
        for block in &self.blocks {
            match block {
                ContentBlock::Heading { text, .. } => writeln!(f, "{}\n", text.to_uppercase())?,
                ContentBlock::Paragraph(text) => writeln!(f, "{text}\n")?,
                ContentBlock::ListItem(text) => writeln!(f, "  * {text}")?,
                ContentBlock::Code(code) => {
                    for line in code.lines() {
                        writeln!(f, "    {line}")?;
                    }
                    writeln!(f)?;
                }
            }
        }
        if let Some(url) = &self.video_url {
            writeln!(f, "\nVideo: {url}")?;
        }
        writeln!(
            f,
            "\nQuiz: {} ({} questions, pass at {}%, +{} diamonds)",
            self.quiz.title, self.quiz.question_count, self.quiz.passing_score, self.quiz.reward
        )?;
        if let Some(score) = self.score {
            writeln!(f, "Best recorded score: {score}%")?;
        }
        Ok(())
    }
}

impl fmt::Display for QuizVm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.screen {
            QuizScreen::Question(q) => {
                writeln!(f, "{}  {}", self.title, q.position_label)?;
                writeln!(f, "{}\n", bar(q.progress_percent))?;
                writeln!(f, "{}", q.text)?;
                for option in &q.options {
                    let marker = match option.mark {
                        OptionMark::Plain => ' ',
                        OptionMark::Selected => '>',
                        OptionMark::Correct => '+',
                        OptionMark::Incorrect => 'x',
                    };
                    writeln!(f, " {marker} {}) {}", option.index + 1, option.label)?;
                }
                if let Some(feedback) = &q.feedback {
                    writeln!(f, "\n{}", feedback.headline)?;
                    writeln!(f, "{}", feedback.explanation)?;
                }
                writeln!(f, "\nCurrent Score: {}", self.running_score)
            }
            QuizScreen::Result(result) => {
                writeln!(f, "{}", result.headline)?;
                writeln!(f, "{}%", result.score)?;
                writeln!(f, "{}", result.detail)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use hack_core::Catalog;
    use hack_core::QuizRunner;

    use crate::vm::{map_course_detail, map_module_detail, map_quiz};

    #[test]
    fn course_page_lists_each_module() {
        let state = Catalog::builtin().unwrap().initial_state();
        let text = map_course_detail(&state, "html").unwrap().to_string();
        assert!(text.contains("Course Progress [--------------------] 0%"));
        assert!(text.contains("1. [todo]"));
        assert!(text.contains("5. [todo]"));
        assert!(text.contains("pass at 70%, +5 diamonds"));
    }

    #[test]
    fn module_page_renders_bullets_and_video() {
        let state = Catalog::builtin().unwrap().initial_state();
        let text = map_module_detail(&state, "html", "html-1")
            .unwrap()
            .to_string();
        assert!(text.contains("  * Tags and elements"));
        assert!(text.contains("Video: https://example.com/html-basics"));
    }

    #[test]
    fn quiz_question_shows_position_and_score() {
        let state = Catalog::builtin().unwrap().initial_state();
        let quiz = state.module("css", "css-1").unwrap().quiz().clone();
        let runner = QuizRunner::new(quiz).unwrap();
        let text = map_quiz(&runner, None).to_string();
        assert!(text.contains("Question 1 of 5"));
        assert!(text.contains(" 1) "));
        assert!(text.contains("Current Score: 0 / 5"));
    }

    #[test]
    fn progress_bar_scales_with_percent() {
        assert_eq!(super::bar(0), format!("[{}]", "-".repeat(20)));
        assert_eq!(super::bar(40), format!("[{}{}]", "#".repeat(8), "-".repeat(12)));
        assert_eq!(super::bar(100), format!("[{}]", "#".repeat(20)));
    }
}
