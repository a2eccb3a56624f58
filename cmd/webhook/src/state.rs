use dtw_mutator::config::MutatorConfig;
use dtw_mutator::review::Reviewer;

use std::sync::Arc;

#[derive(Clone)]
pub struct WebhookState {
    pub reviewer: Arc<Reviewer>,
}

impl WebhookState {
    pub fn new(config: MutatorConfig) -> Self {
        Self {
            reviewer: Arc::new(Reviewer::new(Arc::new(config))),
        }
    }
}
