// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use tracing::{debug, error};

use crate::api::{ApiError, AppState};

/// GET /twin-graph - Serialize the current Instance graph
///
/// The document is rebuilt from the live generation on every request.
pub async fn twin_graph(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let body = state.graph.serialize_snapshot().map_err(|e| {
        error!("Failed to serialize twin graph: {}", e);
        ApiError::Internal(format!("Failed to serialize twin graph: {}", e))
    })?;

    debug!(bytes = body.len(), "Serving twin graph snapshot");

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    ))
}
