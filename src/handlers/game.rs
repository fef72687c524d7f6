use crate::middlewares::token_info;
use crate::models::CasinoGame;
use crate::services::WheelService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/games-list",
    tag = "game",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Games offered by the casino", body = [CasinoGame]),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Casino unreachable")
    )
)]
/// Live game list, usable as `gameId` in best-spins sectors
pub async fn list_games(
    service: web::Data<WheelService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let token = match token_info(&req) {
        Ok(t) => t,
        Err(e) => return Ok(e.error_response()),
    };
    match service.available_games(token.casino_id).await {
        Ok(games) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": games }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn game_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/games-list", web::get().to(list_games));
}
