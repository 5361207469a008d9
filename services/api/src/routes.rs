//! API service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use domain::{
    Principal, guard,
    ledger::{CommissionQuery, OrderQuery},
    models::{NewAppointment, NewOrder, UpdateAppointment, UpdateOrder, UpdateService},
    scheduler::AppointmentQuery,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::ApiResult,
    middleware::auth_middleware,
    models::{CreateServiceRequest, ServiceQuery, StatusChangeRequest},
    state::AppState,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/services", post(create_service))
        .route("/services/:id", put(update_service).delete(delete_service))
        .route("/appointments", get(list_appointments).post(create_appointment))
        .route(
            "/appointments/:id",
            get(get_appointment)
                .put(update_appointment)
                .delete(delete_appointment),
        )
        .route("/appointments/:id/status", put(change_appointment_status))
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/:id", get(get_order).put(update_order))
        .route("/orders/:id/forward", post(forward_order))
        .route("/commissions", get(list_commissions))
        .route("/commissions/:id/pay", post(pay_commission))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/services", get(list_services))
        .route("/services/:id", get(get_service))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let (status, database) = if common::database::health_check(&state.db_pool).await? {
        ("ok", "up")
    } else {
        ("degraded", "down")
    };

    Ok(Json(json!({
        "status": status,
        "service": "api-service",
        "database": database,
    })))
}

/// List a salon's services, through the catalog cache when enabled
pub async fn list_services(
    State(state): State<AppState>,
    Query(query): Query<ServiceQuery>,
) -> ApiResult<impl IntoResponse> {
    if let (Some(cache), Some(salon_id)) = (&state.catalog_cache, query.salon_id) {
        if let Some(services) = cache.get(salon_id).await {
            return Ok(Json(services));
        }
    }

    let services = state.catalog.list_services(query.salon_id).await?;

    if let (Some(cache), Some(salon_id)) = (&state.catalog_cache, query.salon_id) {
        cache.put(salon_id, &services).await;
    }

    Ok(Json(services))
}

/// Get a service by ID
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let service = state.catalog.get_service(id).await?;
    Ok(Json(service))
}

pub async fn create_service(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateServiceRequest>,
) -> ApiResult<impl IntoResponse> {
    let service = state
        .catalog
        .create_service(Some(&principal), payload.salon_id, payload.service)
        .await?;
    invalidate_catalog(&state, service.salon_id).await;

    Ok((StatusCode::CREATED, Json(service)))
}

pub async fn update_service(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateService>,
) -> ApiResult<impl IntoResponse> {
    let service = state
        .catalog
        .update_service(Some(&principal), id, payload)
        .await?;
    invalidate_catalog(&state, service.salon_id).await;

    Ok(Json(service))
}

pub async fn delete_service(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let service = state.catalog.delete_service(Some(&principal), id).await?;
    invalidate_catalog(&state, service.salon_id).await;

    Ok(Json(json!({"message": "Service deleted successfully"})))
}

async fn invalidate_catalog(state: &AppState, salon_id: Uuid) {
    if let Some(cache) = &state.catalog_cache {
        cache.invalidate(salon_id).await;
    }
}

pub async fn list_appointments(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<AppointmentQuery>,
) -> ApiResult<impl IntoResponse> {
    let appointments = state
        .scheduler
        .list_appointments(Some(&principal), &query)
        .await?;
    Ok(Json(appointments))
}

pub async fn create_appointment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<NewAppointment>,
) -> ApiResult<impl IntoResponse> {
    let appointment = state
        .scheduler
        .create_appointment(Some(&principal), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn get_appointment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let appointment = state.scheduler.get_appointment(Some(&principal), id).await?;
    Ok(Json(appointment))
}

pub async fn update_appointment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAppointment>,
) -> ApiResult<impl IntoResponse> {
    let appointment = state
        .scheduler
        .update_appointment(Some(&principal), id, payload)
        .await?;
    Ok(Json(appointment))
}

pub async fn change_appointment_status(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusChangeRequest>,
) -> ApiResult<impl IntoResponse> {
    let appointment = state
        .scheduler
        .change_status(Some(&principal), id, payload.status)
        .await?;
    Ok(Json(appointment))
}

pub async fn delete_appointment(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state
        .scheduler
        .delete_appointment(Some(&principal), id)
        .await?;
    Ok(Json(json!({"message": "Appointment deleted successfully"})))
}

pub async fn list_orders(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<OrderQuery>,
) -> ApiResult<impl IntoResponse> {
    let orders = state.ledger.list_orders(Some(&principal), &query).await?;
    Ok(Json(orders))
}

/// Place an order; its commission is recorded in the same write
pub async fn create_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<NewOrder>,
) -> ApiResult<impl IntoResponse> {
    let order = state.ledger.create_order(Some(&principal), payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn get_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let order = state.ledger.get_order(Some(&principal), id).await?;
    Ok(Json(order))
}

pub async fn update_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrder>,
) -> ApiResult<impl IntoResponse> {
    let order = state
        .ledger
        .update_order(Some(&principal), id, payload)
        .await?;
    Ok(Json(order))
}

pub async fn forward_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let order = state.ledger.forward_to_admin(Some(&principal), id).await?;
    Ok(Json(order))
}

pub async fn list_commissions(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<CommissionQuery>,
) -> ApiResult<impl IntoResponse> {
    let commissions = state
        .ledger
        .list_commissions(Some(&principal), &query)
        .await?;
    Ok(Json(commissions))
}

/// Payout console: platform admins only
pub async fn pay_commission(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    guard::authorize_platform(Some(&principal))?;
    let commission = state.ledger.mark_commission_paid(id).await?;
    Ok(Json(commission))
}
