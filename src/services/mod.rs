pub mod step_list;

pub use step_list::StepList;
