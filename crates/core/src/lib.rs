#![forbid(unsafe_code)]

pub mod catalog;
pub mod game;
pub mod model;
pub mod quiz_runner;
pub mod time;

pub use catalog::{Catalog, CatalogError};
pub use game::{ConsistencyError, CourseUnlock, GameState, ModuleCompletion, RewardError};
pub use quiz_runner::{Advance, QuizPhase, QuizResult, QuizRunError, QuizRunner};
pub use time::Clock;
