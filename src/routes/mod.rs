//! HTTP routing
//!
//! Thin handlers over the service layer; the wizard's step-to-step
//! continuation (the original redirect chain) is expressed as `next`
//! URLs in step responses.

pub mod animals;
pub mod dose_groups;
pub mod export;
pub mod health;
pub mod metadata;
pub mod outcomes;
pub mod studies;
pub mod vocabularies;

use axum::{
    routing::{delete, get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::services::AppState;

/// Build the application router
pub fn create_router(state: AppState, metrics_handle: PrometheusHandle) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    let api_routes = Router::new()
        // Health endpoints
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        // Controlled vocabularies consumed by forms
        .route("/vocabularies", get(vocabularies::list))
        // Wizard step 1: the study
        .route("/studies", post(studies::create_study))
        .route("/studies", get(studies::list_studies))
        .route("/studies/{study_id}", get(studies::get_study))
        .route("/studies/{study_id}", delete(studies::delete_study))
        // Wizard step 2: animal models
        .route("/studies/{study_id}/animals", post(animals::create_animal_model))
        // Wizard step 3: dose groups, with the selection step for outcomes
        .route("/animals/{animal_id}/dose-groups", post(dose_groups::create_dose_group))
        .route(
            "/animals/{animal_id}/dose-groups/select",
            get(dose_groups::select_dose_for_outcome),
        )
        // Wizard step 4: outcomes
        .route("/dose-groups/{dose_id}/outcomes", post(outcomes::create_outcome))
        // Generic metadata attachment
        .route(
            "/entities/{entity_type}/{entity_id}/metadata",
            post(metadata::add_metadata),
        )
        // Export renderings
        .route("/studies/{study_id}/export", get(export::export_study))
        .route("/studies/{study_id}/long-format", get(export::study_long_format))
        .with_state(state);

    let metrics_route =
        Router::new().route("/metrics", get(move || async move { metrics_handle.render() }));

    Router::new()
        .merge(api_routes)
        .merge(metrics_route)
        .layer(TraceLayer::new_for_http())
        .layer(propagate_id)
        .layer(request_id)
        .layer(cors)
}
