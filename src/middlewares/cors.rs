use actix_cors::Cors;

/// Back-office frontends call the API from their own origins with bearer
/// tokens, so no cookies are involved.
pub fn create_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_any_header()
        .max_age(3600)
}
