#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod progress_store;
pub mod quiz_flow;

pub use hack_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, ProgressStoreError, QuizFlowError};
pub use progress_store::{LoadOutcome, ProgressStore, SaveOutcome};
pub use quiz_flow::QuizAttempt;
