use std::sync::Arc;

use crate::application::chat::ChatService;
use crate::application::dashboard::DashboardService;
use crate::application::generation::GenerationService;

#[derive(Clone)]
pub struct ApiState {
    pub generation: Arc<GenerationService>,
    pub chat: Arc<ChatService>,
    pub dashboard: DashboardService,
}
