//! Users API handlers.
//!
//! ```text
//! POST /v1/users {"name":"Alice Smith","email":"alice@example.com","password":"pa55word"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::{User, UserRegistration};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ProblemBody;
use crate::inbound::http::json::StrictJson;
use crate::inbound::http::state::HttpState;

/// Registration request body for `POST /v1/users`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RegisterUserRequest {
    #[schema(example = "Alice Smith")]
    pub name: Option<String>,
    #[schema(example = "alice@example.com")]
    pub email: Option<String>,
    #[schema(example = "pa55word")]
    pub password: Option<String>,
}

impl From<RegisterUserRequest> for UserRegistration {
    fn from(value: RegisterUserRequest) -> Self {
        Self {
            name: value.name,
            email: value.email,
            password: value.password.map(Zeroizing::new),
        }
    }
}

/// `{"user": ...}`
#[derive(Debug, Serialize, ToSchema)]
pub struct UserEnvelope {
    pub user: User,
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/v1/users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Account created", body = UserEnvelope),
        (status = 400, description = "Malformed body", body = ProblemBody),
        (status = 422, description = "Validation failed or email taken", body = ProblemBody),
        (status = 500, description = "Internal server error", body = ProblemBody)
    ),
    tags = ["users"],
    operation_id = "registerUser"
)]
#[post("/users")]
pub async fn register_user(
    state: web::Data<HttpState>,
    payload: StrictJson<RegisterUserRequest>,
) -> ApiResult<HttpResponse> {
    let user = state.users.register(payload.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(UserEnvelope { user }))
}
