// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Captcha solving endpoint module
//!
//! Provides POST /solve-captcha for decoding SAT captcha images.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::solve_handler;
pub use request::SolveRequest;
pub use response::SolveResponse;
