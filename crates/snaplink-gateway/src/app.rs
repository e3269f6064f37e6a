use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    create_url_handler, get_url_handler, health_handler, list_owner_urls_handler,
    redirect_handler, resolve_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        let mut router: Router<AppState> = Router::new().route("/health", get(health_handler));

        if state.owns_mappings() {
            router = router
                .nest(
                    "/v1",
                    Router::new()
                        .route("/urls", post(create_url_handler))
                        .route("/urls/{code}", get(get_url_handler))
                        .route("/owners/{owner_ref}/urls", get(list_owner_urls_handler)),
                )
                .route("/resolve/{code}", get(resolve_handler));
        }

        router
            .route("/{code}", get(redirect_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
