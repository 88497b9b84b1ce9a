pub mod job_form;
pub mod navigation;
pub mod screens;
pub mod state;
