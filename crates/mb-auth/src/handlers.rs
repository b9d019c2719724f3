use super::*;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::http::StatusCode;
use actix_web::web;

pub async fn login(auth: web::Data<AuthService>, req: web::Json<LoginRequest>) -> impl Responder {
    match auth.login(&req.username, &req.password).await {
        Ok(grant) => HttpResponse::Ok().json(GrantResponse::from(grant)),
        Err(e) => failure(e),
    }
}

pub async fn refresh(
    auth: web::Data<AuthService>,
    req: web::Json<RefreshRequest>,
) -> impl Responder {
    if req.refresh_token.is_empty() {
        return reply(StatusCode::BAD_REQUEST, "refresh_token is required");
    }
    match auth.refresh(&req.refresh_token).await {
        Ok(grant) => HttpResponse::Ok().json(GrantResponse::from(grant)),
        Err(e) => failure(e),
    }
}

/// Internal causes were logged by the service and stay out of the body.
fn failure(e: AuthError) -> HttpResponse {
    match e {
        AuthError::WrongCredentials | AuthError::InvalidToken => {
            reply(StatusCode::UNAUTHORIZED, &e.to_string())
        }
        AuthError::Internal(_) => reply(StatusCode::INTERNAL_SERVER_ERROR, "internal error"),
    }
}

fn reply(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        message: message.to_string(),
        code: status.as_u16(),
    })
}
