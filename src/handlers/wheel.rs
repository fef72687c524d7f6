use crate::middlewares::token_info;
use crate::models::*;
use crate::services::WheelService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/wheel",
    tag = "wheel",
    request_body = WheelRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Wheel created", body = WheelResponse),
        (status = 400, description = "Invalid wheel configuration"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "A best-spins game is not offered by the casino")
    )
)]
/// Validates the sectors and stores a new wheel for the caller's casino
pub async fn create_wheel(
    service: web::Data<WheelService>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let token = match token_info(&req) {
        Ok(t) => t,
        Err(e) => return Ok(e.error_response()),
    };
    match service.create(token.casino_id, &body).await {
        Ok(wheel) => Ok(HttpResponse::Ok()
            .json(json!({ "success": true, "data": WheelResponse::from(wheel) }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/wheel/{id}",
    tag = "wheel",
    params(
        ("id" = i64, Path, description = "Wheel id")
    ),
    request_body = WheelRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Wheel updated", body = WheelResponse),
        (status = 400, description = "Invalid configuration or wheel already played"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Wheel not found")
    )
)]
/// Replaces name and sectors; only wheels without mini games can be edited
pub async fn update_wheel(
    service: web::Data<WheelService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let token = match token_info(&req) {
        Ok(t) => t,
        Err(e) => return Ok(e.error_response()),
    };
    match service
        .update(token.casino_id, path.into_inner(), &body)
        .await
    {
        Ok(wheel) => Ok(HttpResponse::Ok()
            .json(json!({ "success": true, "data": WheelResponse::from(wheel) }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/wheel/{id}",
    tag = "wheel",
    params(
        ("id" = i64, Path, description = "Wheel id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Wheel deleted"),
        (status = 400, description = "Wheel already played"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Wheel not found")
    )
)]
pub async fn delete_wheel(
    service: web::Data<WheelService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let token = match token_info(&req) {
        Ok(t) => t,
        Err(e) => return Ok(e.error_response()),
    };
    match service.delete(token.casino_id, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": null }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/wheel/{id}",
    tag = "wheel",
    params(
        ("id" = i64, Path, description = "Wheel id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Wheel", body = WheelResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Wheel not found")
    )
)]
pub async fn get_wheel(
    service: web::Data<WheelService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let token = match token_info(&req) {
        Ok(t) => t,
        Err(e) => return Ok(e.error_response()),
    };
    match service.get(token.casino_id, path.into_inner()).await {
        Ok(wheel) => Ok(HttpResponse::Ok()
            .json(json!({ "success": true, "data": WheelResponse::from(wheel) }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/wheels-list",
    tag = "wheel",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "All wheels of the casino", body = [WheelResponse]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_wheels(
    service: web::Data<WheelService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let token = match token_info(&req) {
        Ok(t) => t,
        Err(e) => return Ok(e.error_response()),
    };
    match service.list(token.casino_id).await {
        Ok(wheels) => {
            let data: Vec<WheelResponse> = wheels.into_iter().map(WheelResponse::from).collect();
            Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

pub fn wheel_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/wheel", web::post().to(create_wheel))
        .route("/wheel/{id}", web::put().to(update_wheel))
        .route("/wheel/{id}", web::delete().to(delete_wheel))
        .route("/wheel/{id}", web::get().to(get_wheel))
        .route("/wheels-list", web::get().to(list_wheels));
}
