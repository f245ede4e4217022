// Application state module
// Everything a request needs, built once at startup and shared read-only

use std::sync::Arc;

use super::types::Config;
use crate::handler::PageRoutes;
use crate::render::TemplateSet;
use crate::routing::RoutePattern;
use crate::storage::PageStore;

/// Page storage and templates the handlers work against
pub struct Wiki {
    pub store: PageStore,
    pub templates: TemplateSet,
}

/// Application state
pub struct AppState {
    pub config: Config,
    pub wiki: Wiki,
    pub routes: PageRoutes,
}

impl AppState {
    /// Assemble state from loaded configuration and parsed templates.
    ///
    /// Compiling the route pattern is the only fallible step left here.
    pub fn new(config: Config, templates: TemplateSet) -> Result<Self, regex::Error> {
        let pattern = Arc::new(RoutePattern::new()?);
        let store = PageStore::new(&config.storage.data_dir);

        Ok(Self {
            wiki: Wiki { store, templates },
            routes: PageRoutes::new(pattern),
            config,
        })
    }
}
