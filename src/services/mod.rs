// Core services
pub mod cost_codes;
pub mod projects;
pub mod rules_of_credit;
pub mod sub_jobs;
pub mod work_items;

// Aggregation and reporting
pub mod analytics;
