use hack_core::GameState;
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::views::ViewError;
use crate::vm::course_vm::unlocked_course;

/// A displayable chunk of lesson text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentBlock {
    Heading { level: u8, text: String },
    Paragraph(String),
    ListItem(String),
    Code(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizSummaryVm {
    pub title: String,
    pub description: String,
    pub question_count: usize,
    pub passing_score: u8,
    pub reward: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleDetailVm {
    pub course_name: String,
    pub title: String,
    pub description: String,
    pub blocks: Vec<ContentBlock>,
    pub video_url: Option<String>,
    pub quiz: QuizSummaryVm,
    pub completed: bool,
    pub score: Option<u8>,
}

/// Build the lesson page for a module in an unlocked course.
///
/// # Errors
///
/// Returns `ViewError::UnknownCourse`, `ViewError::CourseLocked`, or
/// `ViewError::UnknownModule`.
pub fn map_module_detail(
    state: &GameState,
    course_id: &str,
    module_id: &str,
) -> Result<ModuleDetailVm, ViewError> {
    let course = unlocked_course(state, course_id)?;
    let module = course
        .module(module_id)
        .ok_or_else(|| ViewError::UnknownModule {
            course: course_id.to_owned(),
            module: module_id.to_owned(),
        })?;
    let quiz = module.quiz();

    Ok(ModuleDetailVm {
        course_name: course.name().to_owned(),
        title: module.title().to_owned(),
        description: module.description().to_owned(),
        blocks: content_blocks(module.content()),
        video_url: module.video_url().map(ToString::to_string),
        quiz: QuizSummaryVm {
            title: quiz.title().to_owned(),
            description: quiz.description().to_owned(),
            question_count: quiz.questions().len(),
            passing_score: quiz.passing_score().value(),
            reward: quiz.diamonds_reward(),
        },
        completed: module.is_completed(),
        score: module.score().map(|s| s.value()),
    })
}

/// Split Markdown lesson text into headings, paragraphs, list items and code.
///
/// Nested lists are flattened into consecutive items.
#[must_use]
pub fn content_blocks(markdown: &str) -> Vec<ContentBlock> {
    enum Open {
        Heading(u8),
        Paragraph,
        Item,
        Code,
    }

    let mut blocks = Vec::new();
    let mut open: Option<Open> = None;
    let mut text = String::new();
    let mut item_depth = 0_usize;

    let flush = |open: Option<Open>, text: &mut String, blocks: &mut Vec<ContentBlock>| {
        let body = std::mem::take(text);
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return;
        }
        let block = match open {
            Some(Open::Heading(level)) => ContentBlock::Heading {
                level,
                text: trimmed.to_owned(),
            },
            Some(Open::Item) => ContentBlock::ListItem(trimmed.to_owned()),
            Some(Open::Code) => ContentBlock::Code(body.trim_end().to_owned()),
            Some(Open::Paragraph) | None => ContentBlock::Paragraph(trimmed.to_owned()),
        };
        blocks.push(block);
    };

    for event in Parser::new_ext(markdown, Options::empty()) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                flush(open.take(), &mut text, &mut blocks);
                open = Some(Open::Heading(level as u8));
            }
            Event::Start(Tag::Paragraph) if item_depth == 0 => {
                flush(open.take(), &mut text, &mut blocks);
                open = Some(Open::Paragraph);
            }
            Event::Start(Tag::Item) => {
                flush(open.take(), &mut text, &mut blocks);
                item_depth += 1;
                open = Some(Open::Item);
            }
            Event::Start(Tag::CodeBlock(_)) => {
                flush(open.take(), &mut text, &mut blocks);
                open = Some(Open::Code);
            }
            Event::End(TagEnd::Item) => {
                flush(open.take(), &mut text, &mut blocks);
                item_depth = item_depth.saturating_sub(1);
                if item_depth > 0 {
                    open = Some(Open::Item);
                }
            }
            Event::End(TagEnd::Heading(_) | TagEnd::CodeBlock) => {
                flush(open.take(), &mut text, &mut blocks);
            }
            Event::End(TagEnd::Paragraph) if item_depth == 0 => {
                flush(open.take(), &mut text, &mut blocks);
            }
            Event::Text(chunk) | Event::Code(chunk) => text.push_str(&chunk),
            Event::SoftBreak => text.push(' '),
            Event::HardBreak => text.push('\n'),
            _ => {}
        }
    }
    flush(open.take(), &mut text, &mut blocks);
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use hack_core::Catalog;

    #[test]
    fn lesson_text_splits_into_paragraphs_and_items() {
        let blocks = content_blocks(
            "Intro line\nwraps here.\n\nKey concepts:\n- Tags\n- Attributes\n\nClosing words.",
        );
        assert_eq!(
            blocks,
            vec![
                ContentBlock::Paragraph("Intro line wraps here.".into()),
                ContentBlock::Paragraph("Key concepts:".into()),
                ContentBlock::ListItem("Tags".into()),
                ContentBlock::ListItem("Attributes".into()),
                ContentBlock::Paragraph("Closing words.".into()),
            ]
        );
    }

    #[test]
    fn headings_and_code_blocks_are_kept() {
        let blocks = content_blocks("## Selectors\n\n```\np { color: red; }\n```\n");
        assert_eq!(
            blocks,
            vec![
                ContentBlock::Heading {
                    level: 2,
                    text: "Selectors".into()
                },
                ContentBlock::Code("p { color: red; }".into()),
            ]
        );
    }

    #[test]
    fn nested_items_are_flattened() {
        let blocks = content_blocks("- outer\n  - inner\n- last\n");
        assert_eq!(
            blocks,
            vec![
                ContentBlock::ListItem("outer".into()),
                ContentBlock::ListItem("inner".into()),
                ContentBlock::ListItem("last".into()),
            ]
        );
    }

    #[test]
    fn module_page_carries_video_and_quiz_terms() {
        let state = Catalog::builtin().unwrap().initial_state();
        let vm = map_module_detail(&state, "html", "html-1").unwrap();
        assert_eq!(vm.course_name, state.course("html").unwrap().name());
        assert_eq!(
            vm.video_url.as_deref(),
            Some("https://example.com/html-basics")
        );
        assert_eq!(vm.quiz.question_count, 5);
        assert_eq!(vm.quiz.passing_score, 70);
        assert!(vm.blocks.contains(&ContentBlock::ListItem("Tags and elements".into())));
        assert!(!vm.completed);
    }

    #[test]
    fn missing_module_is_refused() {
        let state = Catalog::builtin().unwrap().initial_state();
        assert!(matches!(
            map_module_detail(&state, "html", "html-42"),
            Err(ViewError::UnknownModule { .. })
        ));
        assert!(matches!(
            map_module_detail(&state, "kotlin", "kotlin-1"),
            Err(ViewError::CourseLocked(_))
        ));
    }
}
