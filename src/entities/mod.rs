pub mod cost_code;
pub mod project;
pub mod rule_of_credit;
pub mod sub_job;
pub mod work_item;

pub use cost_code::Discipline;
