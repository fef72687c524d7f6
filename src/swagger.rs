use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::MiniGameStatus;
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::wheel::create_wheel,
        handlers::wheel::update_wheel,
        handlers::wheel::delete_wheel,
        handlers::wheel::get_wheel,
        handlers::wheel::list_wheels,
        handlers::mini_game::provide_wheel_mini_game,
        handlers::mini_game::get_wheel_mini_game,
        handlers::mini_game::spin_wheel_mini_game,
        handlers::game::list_games,
    ),
    components(
        schemas(
            WheelRequest,
            WheelResponse,
            BetLevel,
            ProbabilityOverride,
            ProvideWheelMiniGameRequest,
            ProvideWheelMiniGameResponse,
            WheelMiniGameResponse,
            SpinResponse,
            MiniGameStatus,
            CasinoGame,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "wheel", description = "Wheel configuration API"),
        (name = "mini_game", description = "Wheel mini game API"),
        (name = "game", description = "Casino game catalogue API"),
    ),
    info(
        title = "Prize Wheel Backend API",
        version = "1.0.0",
        description = "Prize wheel bonus game REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/wheel",
            "/wheel/{id}",
            "/wheels-list",
            "/provide-wheel-mini-game",
            "/wheel-mini-game/{id}",
            "/wheel-mini-game/{id}/spin",
            "/games-list",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
