use actix_web::{web, HttpResponse, Responder};
use rand_core::OsRng;
use validator::Validate;
use crate::core::{aggregate_results, consensus_status, filter_restaurants, member_progress, voted_only, DeckBuilder};
use crate::models::{
    CreateSessionRequest, DeckResponse, ErrorResponse, HealthResponse, JoinSessionRequest,
    MemberPreferences, MembershipResponse, RecordSwipeRequest, Restaurant, ResultsResponse,
};
use crate::services::{SessionStore, StoreError};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
    pub restaurants: Arc<Vec<Restaurant>>,
    pub deck: DeckBuilder,
}

/// Configure all session and restaurant routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/restaurants", web::get().to(list_restaurants))
        .route("/restaurants/{id}", web::get().to(get_restaurant))
        .route("/sessions", web::post().to(create_session))
        .route("/sessions/{code}", web::get().to(get_session))
        .route("/sessions/{code}/members", web::post().to(join_session))
        .route("/sessions/{code}/members/{member_id}/preferences", web::put().to(save_preferences))
        .route("/sessions/{code}/members/{member_id}/restaurants", web::get().to(member_restaurants))
        .route("/sessions/{code}/members/{member_id}/deck", web::get().to(member_deck))
        .route("/sessions/{code}/members/{member_id}/swipes", web::post().to(record_swipe))
        .route("/sessions/{code}/results", web::get().to(session_results));
}

fn error_response(status: actix_web::http::StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

fn store_error(err: StoreError) -> HttpResponse {
    use actix_web::http::StatusCode;

    match err {
        StoreError::SessionNotFound(_) => {
            error_response(StatusCode::NOT_FOUND, "Session not found", err.to_string())
        }
        StoreError::MemberNotFound { .. } => {
            error_response(StatusCode::NOT_FOUND, "Member not found", err.to_string())
        }
        StoreError::CodesExhausted => {
            tracing::error!("Session code space exhausted");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session", err.to_string())
        }
    }
}

fn validation_error(errors: validator::ValidationErrors) -> HttpResponse {
    tracing::info!("Validation failed: field_errors={:?}", errors);
    error_response(
        actix_web::http::StatusCode::BAD_REQUEST,
        "Validation failed",
        errors.to_string(),
    )
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.restaurants.is_empty() { "degraded" } else { "healthy" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        restaurants: state.restaurants.len(),
        timestamp: chrono::Utc::now(),
    })
}

/// GET /api/v1/restaurants
async fn list_restaurants(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.restaurants.as_slice())
}

/// GET /api/v1/restaurants/{id}
async fn get_restaurant(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    match state.restaurants.iter().find(|restaurant| restaurant.id == id) {
        Some(restaurant) => HttpResponse::Ok().json(restaurant),
        None => error_response(
            actix_web::http::StatusCode::NOT_FOUND,
            "Restaurant not found",
            format!("No restaurant with id {}", id),
        ),
    }
}

/// Create session endpoint
///
/// POST /api/v1/sessions
///
/// Request body (both fields optional):
/// ```json
/// {
///   "name": "Friday lunch",
///   "memberName": "User A"
/// }
/// ```
async fn create_session(
    state: web::Data<AppState>,
    req: web::Json<CreateSessionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    match state
        .store
        .create_session(req.name.as_deref(), req.member_name.as_deref())
        .await
    {
        Ok((session, member)) => HttpResponse::Created().json(MembershipResponse { session, member }),
        Err(e) => store_error(e),
    }
}

/// GET /api/v1/sessions/{code}
async fn get_session(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match state.store.get(&path.into_inner()).await {
        Ok(session) => HttpResponse::Ok().json(session),
        Err(e) => store_error(e),
    }
}

/// Join session endpoint
///
/// POST /api/v1/sessions/{code}/members
///
/// Request body (`memberName` optional, defaults by join position):
/// ```json
/// { "memberName": "User B" }
/// ```
async fn join_session(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<JoinSessionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    match state
        .store
        .join_session(&path.into_inner(), req.member_name.as_deref())
        .await
    {
        Ok((session, member)) => HttpResponse::Ok().json(MembershipResponse { session, member }),
        Err(e) => store_error(e),
    }
}

/// PUT /api/v1/sessions/{code}/members/{member_id}/preferences
///
/// Values left out of the body are stored as `neutral`.
async fn save_preferences(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    prefs: web::Json<MemberPreferences>,
) -> impl Responder {
    let (code, member_id) = path.into_inner();

    match state
        .store
        .save_preferences(&code, &member_id, prefs.into_inner())
        .await
    {
        Ok(session) => {
            tracing::debug!("Saved preferences for {} in {}", member_id, code);
            HttpResponse::Ok().json(session.preferences_for(&member_id))
        }
        Err(e) => store_error(e),
    }
}

/// GET /api/v1/sessions/{code}/members/{member_id}/restaurants
///
/// The pool narrowed down to what this member would accept.
async fn member_restaurants(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (code, member_id) = path.into_inner();

    let session = match state.store.get(&code).await {
        Ok(session) => session,
        Err(e) => return store_error(e),
    };
    if session.member(&member_id).is_none() {
        return store_error(StoreError::MemberNotFound { code, member_id });
    }

    let filtered = filter_restaurants(&state.restaurants, session.preferences_for(&member_id));
    tracing::debug!(
        "{} of {} restaurants admissible for {}",
        filtered.len(),
        state.restaurants.len(),
        member_id
    );

    HttpResponse::Ok().json(filtered)
}

/// Deal a deck endpoint
///
/// GET /api/v1/sessions/{code}/members/{member_id}/deck
///
/// Members without saved preferences get the head of the pool.
async fn member_deck(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (code, member_id) = path.into_inner();

    let session = match state.store.get(&code).await {
        Ok(session) => session,
        Err(e) => return store_error(e),
    };
    if session.member(&member_id).is_none() {
        return store_error(StoreError::MemberNotFound { code, member_id });
    }

    let restaurants = state
        .deck
        .deal(&state.restaurants, session.preferences_for(&member_id), &mut OsRng);

    tracing::info!(
        "Dealt {} cards to {} in session {}",
        restaurants.len(),
        member_id,
        code
    );

    HttpResponse::Ok().json(DeckResponse {
        member_id,
        restaurants,
        deck_size: state.deck.deck_size(),
    })
}

/// Record swipe endpoint
///
/// POST /api/v1/sessions/{code}/members/{member_id}/swipes
///
/// Request body:
/// ```json
/// {
///   "restaurantId": "d12",
///   "value": "like|dislike|neutral"
/// }
/// ```
async fn record_swipe(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    req: web::Json<RecordSwipeRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let (code, member_id) = path.into_inner();

    if !state.restaurants.iter().any(|restaurant| restaurant.id == req.restaurant_id) {
        return error_response(
            actix_web::http::StatusCode::NOT_FOUND,
            "Restaurant not found",
            format!("No restaurant with id {}", req.restaurant_id),
        );
    }

    match state
        .store
        .save_swipe(&code, &member_id, &req.restaurant_id, req.value)
        .await
    {
        Ok(session) => {
            tracing::debug!(
                "Recorded swipe: {} -> {} ({:?})",
                member_id,
                req.restaurant_id,
                req.value
            );
            let swiped = session.swipes.get(&member_id).map_or(0, |votes| votes.len());
            HttpResponse::Ok().json(serde_json::json!({
                "memberId": member_id,
                "restaurantId": req.restaurant_id,
                "value": req.value,
                "swiped": swiped,
            }))
        }
        Err(e) => store_error(e),
    }
}

/// Group results endpoint
///
/// GET /api/v1/sessions/{code}/results
///
/// Ranked restaurants that received at least one like or dislike, with the
/// consensus status and every member's swipe progress.
async fn session_results(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let code = path.into_inner();

    let session = match state.store.get(&code).await {
        Ok(session) => session,
        Err(e) => return store_error(e),
    };

    let scores = voted_only(aggregate_results(
        &state.restaurants,
        &session.swipes,
        &session.members,
    ));
    let consensus = consensus_status(&scores, session.member_count());
    let members = member_progress(&session, state.deck.deck_size());

    tracing::info!(
        "Results for {}: {} ranked, consensus {}%, ready={}",
        code,
        scores.len(),
        consensus.consensus_score,
        consensus.decision_ready
    );

    HttpResponse::Ok().json(ResultsResponse {
        scores,
        consensus,
        members,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};

    fn test_state() -> AppState {
        let restaurants = crate::services::parse_restaurants(
            r#"[
                {"name": "Sushi Go", "cuisine": "Japanese", "price_range": "$$"},
                {"name": "Seoul Bowl", "cuisine": "Korean"}
            ]"#,
        )
        .unwrap();

        AppState {
            store: Arc::new(SessionStore::new(100, 60)),
            restaurants: Arc::new(restaurants),
            deck: DeckBuilder::new(10),
        }
    }

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp: HealthResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(resp.status, "healthy");
        assert_eq!(resp.restaurants, 2);
    }

    #[actix_web::test]
    async fn test_create_session_rejects_long_name() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/sessions")
            .set_json(serde_json::json!({"name": "x".repeat(81), "memberName": "User A"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_blank_names_get_defaults() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/sessions")
            .set_json(serde_json::json!({"name": ""}))
            .to_request();
        let created: MembershipResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(created.session.name, "Tonight's crew");
        assert_eq!(created.member.name, "User A");

        let req = test::TestRequest::post()
            .uri(&format!("/sessions/{}/members", created.session.code))
            .set_json(serde_json::json!({}))
            .to_request();
        let joined: MembershipResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(joined.member.name, "User B");
    }

    #[actix_web::test]
    async fn test_unknown_preference_values_are_accepted() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/sessions")
            .set_json(serde_json::json!({}))
            .to_request();
        let created: MembershipResponse = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::put()
            .uri(&format!(
                "/sessions/{}/members/{}/preferences",
                created.session.code, created.member.id
            ))
            .set_json(serde_json::json!({"diet": {"kosher": "yes"}, "price": {"$$$$": "no"}}))
            .to_request();
        let prefs: MemberPreferences = test::call_and_read_body_json(&app, req).await;

        assert_eq!(prefs, MemberPreferences::default());
    }

    #[actix_web::test]
    async fn test_unknown_session_is_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/sessions/000000/results").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
