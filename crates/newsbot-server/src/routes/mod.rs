// Export route modules
pub mod chat;
pub mod health;
pub mod news;
pub mod summarize;

#[cfg(test)]
pub(crate) mod test_support;

use axum::Router;

use crate::state::AppState;

pub fn configure(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(news::routes())
        .merge(chat::routes(state.clone()))
        .merge(summarize::routes(state))
}
