pub mod exercise_ctx;
pub mod submission;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use exercise_ctx::ExerciseCtx;
pub use submission::{SubmissionController, SubmissionState, Transition, Trigger};
pub use view::SessionView;
