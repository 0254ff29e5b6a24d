use hack_core::model::completion_percent;
use hack_core::{ModuleCompletion, QuizResult, QuizRunner};
use services::QuizAttempt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionMark {
    Plain,
    Selected,
    Correct,
    Incorrect,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizOptionVm {
    pub index: usize,
    pub label: String,
    pub mark: OptionMark,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizFeedbackVm {
    pub correct: bool,
    pub headline: &'static str,
    pub explanation: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizQuestionVm {
    pub position_label: String,
    pub progress_percent: u8,
    pub text: String,
    pub options: Vec<QuizOptionVm>,
    pub feedback: Option<QuizFeedbackVm>,
    pub can_submit: bool,
    /// Label of the button that leaves the feedback screen.
    pub next_label: Option<&'static str>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizResultVm {
    pub passed: bool,
    pub score: u8,
    pub headline: &'static str,
    pub detail: String,
    pub action_label: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizScreen {
    Question(QuizQuestionVm),
    Result(QuizResultVm),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizVm {
    pub title: String,
    pub running_score: String,
    pub screen: QuizScreen,
}

/// Screen for an attempt, using the recorded completion for the payout line
/// once the result has been applied.
#[must_use]
pub fn map_quiz_attempt(attempt: &QuizAttempt) -> QuizVm {
    map_quiz(attempt.runner(), attempt.completion())
}

#[must_use]
pub fn map_quiz(runner: &QuizRunner, completion: Option<&ModuleCompletion>) -> QuizVm {
    let screen = match runner.result() {
        Some(result) => QuizScreen::Result(map_result(&result, completion)),
        None => QuizScreen::Question(map_question(runner)),
    };
    QuizVm {
        title: runner.quiz().title().to_owned(),
        running_score: format!("{} / {}", runner.correct_count(), runner.total_questions()),
        screen,
    }
}

fn map_question(runner: &QuizRunner) -> QuizQuestionVm {
    let total = runner.total_questions();
    let index = runner.current_index().unwrap_or(0);
    let selected = runner.selected_option();
    let feedback_shown = runner.is_showing_feedback();

    let (text, options, explanation, correct_answer) = match runner.current_question() {
        Some(q) => (
            q.text().to_owned(),
            q.options().to_vec(),
            q.explanation().to_owned(),
            q.correct_answer(),
        ),
        None => (String::new(), Vec::new(), String::new(), 0),
    };

    let options = options
        .into_iter()
        .enumerate()
        .map(|(i, label)| {
            let is_selected = selected == Some(i);
            let mark = if feedback_shown && i == correct_answer {
                OptionMark::Correct
            } else if feedback_shown && is_selected {
                OptionMark::Incorrect
            } else if is_selected {
                OptionMark::Selected
            } else {
                OptionMark::Plain
            };
            QuizOptionVm { index: i, label, mark }
        })
        .collect();

    let feedback = runner.last_answer_correct().map(|correct| QuizFeedbackVm {
        correct,
        headline: if correct { "Correct!" } else { "Incorrect" },
        explanation,
    });
    let next_label = feedback_shown.then(|| {
        if runner.is_last_question() {
            "Finish Quiz"
        } else {
            "Next Question"
        }
    });

    QuizQuestionVm {
        position_label: format!("Question {} of {}", index + 1, total),
        progress_percent: completion_percent(index + 1, total),
        text,
        options,
        feedback,
        can_submit: !feedback_shown && selected.is_some(),
        next_label,
    }
}

fn map_result(result: &QuizResult, completion: Option<&ModuleCompletion>) -> QuizResultVm {
    if result.passed {
        let earned = completion.map_or(result.diamonds_reward, |c| c.diamonds_awarded);
        let detail = if earned > 0 {
            format!("Excellent work! You've earned +{earned} diamonds.")
        } else {
            "Excellent work! The reward for this module was already collected.".to_owned()
        };
        QuizResultVm {
            passed: true,
            score: result.score.value(),
            headline: "Quiz Passed!",
            detail,
            action_label: "Continue",
        }
    } else {
        QuizResultVm {
            passed: false,
            score: result.score.value(),
            headline: "Keep Practicing",
            detail: format!(
                "You need {}% to pass. Try again!",
                result.passing_score.value()
            ),
            action_label: "Retry Quiz",
        }
    }
}
