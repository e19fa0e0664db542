//! Expense-splitting participants of a trip.

use api_types::participant::{ParticipantNew, ParticipantView, ParticipantsResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{ServerError, server::ServerState};

fn participant_view(row: engine::LedgerRow) -> ParticipantView {
    ParticipantView {
        id: row.id,
        trip_id: row.trip_id,
        user_id: row.user_id,
        income_minor: row.income.cents(),
        outcome_minor: row.outcome.cents(),
    }
}

pub async fn list(
    Extension(_user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
) -> Result<Json<ParticipantsResponse>, ServerError> {
    let participants = state
        .engine
        .list_participants(&trip_id)
        .await?
        .into_iter()
        .map(participant_view)
        .collect();

    Ok(Json(ParticipantsResponse { participants }))
}

/// Joins a user to expense splitting. Joining twice returns the same row.
pub async fn add(
    Extension(_user): Extension<engine::User>,
    State(state): State<ServerState>,
    Path(trip_id): Path<String>,
    Json(payload): Json<ParticipantNew>,
) -> Result<Json<ParticipantView>, ServerError> {
    if payload.user.trim().is_empty() {
        return Err(ServerError::Generic("user must not be empty".to_string()));
    }
    let row = state.engine.add_participant(&trip_id, &payload.user).await?;
    Ok(Json(participant_view(row)))
}
