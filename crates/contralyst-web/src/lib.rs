//! contralyst-web: HTTP surface for Contralyst.
//! Serves:
//!   - the contract analyzer relay endpoint
//!   - the fixed licensor list
//!   - term categories, highlighting and server-side extraction runs
//!   - workflow progress over SSE
//!   - the prebuilt client bundle in production

pub mod router;
pub mod handlers;
pub mod state;
pub mod sse;
