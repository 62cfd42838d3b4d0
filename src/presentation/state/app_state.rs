use std::sync::Arc;

use crate::application::services::{StatusService, SubmissionService};

#[derive(Clone)]
pub struct AppState {
    pub submission_service: Arc<SubmissionService>,
    pub status_service: Arc<StatusService>,
}
