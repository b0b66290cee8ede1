pub mod analytics;
pub mod common;
pub mod cost_codes;
pub mod projects;
pub mod rules_of_credit;
pub mod sub_jobs;
pub mod work_items;

use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub projects: Arc<crate::services::projects::ProjectService>,
    pub sub_jobs: Arc<crate::services::sub_jobs::SubJobService>,
    pub rules_of_credit: Arc<crate::services::rules_of_credit::RuleOfCreditService>,
    pub cost_codes: Arc<crate::services::cost_codes::CostCodeService>,
    pub work_items: Arc<crate::services::work_items::WorkItemService>,
    pub analytics: Arc<crate::services::analytics::AnalyticsService>,
}

impl AppServices {
    /// Build the services container shared by all HTTP handlers.
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        let projects = Arc::new(crate::services::projects::ProjectService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let sub_jobs = Arc::new(crate::services::sub_jobs::SubJobService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let rules_of_credit = Arc::new(
            crate::services::rules_of_credit::RuleOfCreditService::new(
                db_pool.clone(),
                event_sender.clone(),
            ),
        );
        let cost_codes = Arc::new(crate::services::cost_codes::CostCodeService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let work_items = Arc::new(crate::services::work_items::WorkItemService::new(
            db_pool.clone(),
            event_sender,
        ));
        let analytics = Arc::new(crate::services::analytics::AnalyticsService::new(db_pool));

        Self {
            projects,
            sub_jobs,
            rules_of_credit,
            cost_codes,
            work_items,
            analytics,
        }
    }
}
