//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Architecture
//!
//! - **`router`** - Main router creation, fallback and tracing layer
//! - **`api_routes`** - `/api` endpoints and their access policies
//! - **`extract`** - JSON object body extractor
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation
//! ├── api_routes.rs   - API endpoint configuration
//! └── extract.rs      - Request body extraction
//! ```
//!
//! # Route Types
//!
//! - `GET /api/hello` - Liveness
//! - `POST /api/register`, `POST /api/login`, `POST /api/token/refresh`
//! - `GET /api/users/me` - Token required
//! - `GET /api/users/children` - Parent level
//! - `GET|PUT /api/users/{id}` - Token required, then self/admin/parent-of
//! - `DELETE /api/users/{id}` - Admin level
//!
//! Every other path answers `404` with the JSON error payload.

/// Main router creation
pub mod router;

/// API endpoint configuration
pub mod api_routes;

/// Request body extraction
pub mod extract;

pub use router::create_router;
