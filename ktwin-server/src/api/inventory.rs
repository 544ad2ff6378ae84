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

use axum::{body::Bytes, extract::State, Json};
use ktwin_core::TwinInstance;
use ktwin_graph::SnapshotStats;
use tracing::info;

use crate::api::{ApiError, AppState};

/// PUT /api/v1/instances - Replace the Instance inventory
///
/// Body is a JSON array of TwinInstance resources. The served graph is
/// rebuilt from scratch and swapped in; the response carries the new stats.
pub async fn replace_instances(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SnapshotStats>, ApiError> {
    let instances: Vec<TwinInstance> = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid instance inventory: {}", e)))?;

    info!(instances = instances.len(), "Replacing instance inventory");
    Ok(Json(state.graph.rebuild(&instances)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::routing::put;
    use axum::Router;
    use ktwin_graph::TwinGraphServer;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn router(graph: Arc<TwinGraphServer>) -> Router {
        Router::new()
            .route("/api/v1/instances", put(replace_instances))
            .with_state(AppState::new(graph))
    }

    #[tokio::test]
    async fn test_replace_instances() {
        let graph = Arc::new(TwinGraphServer::new());
        let app = router(graph.clone());

        let body = serde_json::json!([
            {"metadata": {"name": "fleet-01"}, "spec": {"interface": "fleet",
                "relationships": [{"name": "member", "interface": "vehicle", "instance": "car-01"}]}},
            {"metadata": {"name": "car-01"}, "spec": {"interface": "vehicle"}}
        ]);

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/v1/instances")
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let stats: SnapshotStats = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(stats.generation, 1);
        assert_eq!(stats.vertices, 2);
        assert_eq!(stats.edges, 1);
        assert_eq!(graph.stats(), stats);
    }

    #[tokio::test]
    async fn test_invalid_inventory_is_bad_request() {
        let graph = Arc::new(TwinGraphServer::new());
        let app = router(graph.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/v1/instances")
                    .body(Body::from("{\"not\": \"an array\"}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(value["error"].as_str().unwrap().starts_with("Invalid instance inventory"));
        assert_eq!(graph.stats().generation, 0);
    }
}
