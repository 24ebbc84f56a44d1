use std::sync::Arc;

use crate::config::Config;
use crate::endpoint::EndpointTable;
use crate::redirect::RedirectDispatcher;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub endpoints: EndpointTable,
    pub redirects: RedirectDispatcher,
}
