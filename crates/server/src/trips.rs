//! Trip endpoints.

use api_types::trip::{TripNew, TripView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};

pub(crate) fn trip_view(trip: engine::Trip) -> TripView {
    TripView {
        id: trip.id,
        name: trip.name,
        created_by: trip.created_by,
        created_at: trip.created_at,
    }
}

/// Creates a trip; the caller becomes its first participant.
pub async fn trip_new(
    Extension(user): Extension<engine::User>,
    State(state): State<ServerState>,
    Json(payload): Json<TripNew>,
) -> Result<(StatusCode, Json<TripView>), ServerError> {
    let trip = state.engine.new_trip(&payload.name, &user.id).await?;
    Ok((StatusCode::CREATED, Json(trip_view(trip))))
}

pub async fn get(
    Extension(_user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
) -> Result<Json<TripView>, ServerError> {
    let trip = state.engine.trip(&trip_id).await?;
    Ok(Json(trip_view(trip)))
}
