//! promlive-api — REST API for a running monitor.
//!
//! Exposes the current projection and the settings a chart front end
//! needs: which metrics exist, which one is followed, and where and how
//! often to scrape.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/api/v1/projection` | Current projection, `?range=1m\|5m\|10m\|15m\|all` |
//! | GET | `/api/v1/metrics` | Known metric names and the selection |
//! | PUT | `/api/v1/selection` | Follow another metric |
//! | GET | `/api/v1/config` | Current scan config |
//! | PUT | `/api/v1/config` | Partial scan config update |
//! | POST | `/api/v1/reset` | Clear the chart, keep the selection |

pub mod handlers;

use axum::Router;
use axum::routing::{get, post, put};
use promlive_scrape::MonitorHandle;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub monitor: MonitorHandle,
}

/// Build the API router.
pub fn build_router(monitor: MonitorHandle) -> Router {
    let state = ApiState { monitor };

    let api_routes = Router::new()
        .route("/projection", get(handlers::get_projection))
        .route("/metrics", get(handlers::list_metrics))
        .route("/selection", put(handlers::put_selection))
        .route("/config", get(handlers::get_config).put(handlers::put_config))
        .route("/reset", post(handlers::reset))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}
