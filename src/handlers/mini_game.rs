use crate::middlewares::token_info;
use crate::models::*;
use crate::services::MiniGameService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/provide-wheel-mini-game",
    tag = "mini_game",
    request_body = ProvideWheelMiniGameRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Mini game created", body = ProvideWheelMiniGameResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Wheel not found")
    )
)]
/// Gives a player one play of a wheel
pub async fn provide_wheel_mini_game(
    service: web::Data<MiniGameService>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let token = match token_info(&req) {
        Ok(t) => t,
        Err(e) => return Ok(e.error_response()),
    };
    match service.provide(&token, &body).await {
        Ok(game) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ProvideWheelMiniGameResponse { wheel_mini_game_id: game.id }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/wheel-mini-game/{id}",
    tag = "mini_game",
    params(
        ("id" = i64, Path, description = "Wheel mini game id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Mini game status", body = WheelMiniGameResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Mini game not found")
    )
)]
pub async fn get_wheel_mini_game(
    service: web::Data<MiniGameService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let token = match token_info(&req) {
        Ok(t) => t,
        Err(e) => return Ok(e.error_response()),
    };
    match service.get(token.casino_id, path.into_inner()).await {
        Ok(game) => Ok(HttpResponse::Ok()
            .json(json!({ "success": true, "data": WheelMiniGameResponse::from(&game) }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/wheel-mini-game/{id}/spin",
    tag = "mini_game",
    params(
        ("id" = i64, Path, description = "Wheel mini game id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Outcome of the spin; repeated calls return the same outcome", body = SpinResponse),
        (status = 400, description = "Mini game has failed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Mini game not found")
    )
)]
/// Draws the winning sector and grants its prize
pub async fn spin_wheel_mini_game(
    service: web::Data<MiniGameService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let token = match token_info(&req) {
        Ok(t) => t,
        Err(e) => return Ok(e.error_response()),
    };
    match service.spin(token.casino_id, path.into_inner()).await {
        Ok(game) => Ok(HttpResponse::Ok()
            .json(json!({ "success": true, "data": SpinResponse::from(&game) }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn mini_game_config(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/provide-wheel-mini-game",
        web::post().to(provide_wheel_mini_game),
    )
    .route("/wheel-mini-game/{id}", web::get().to(get_wheel_mini_game))
    .route(
        "/wheel-mini-game/{id}/spin",
        web::post().to(spin_wheel_mini_game),
    );
}
