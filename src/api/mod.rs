// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod solve;

pub use errors::{ErrorResponse, SolveError};
pub use handlers::{health_handler, test_handler, HealthResponse, ModelStatus, TestResponse};
pub use http_server::{create_router, start_server, AppState};
pub use solve::{solve_handler, SolveRequest, SolveResponse};
