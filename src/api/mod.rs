// Axum web layer: middleware, extractors, error responses

pub mod extract;
pub mod middleware;
pub mod responses;
