//! User management API handlers.
//!
//! ```text
//! GET    /api/v1/users        List users, excluding the caller
//! POST   /api/v1/users        Create a user and dispatch set-password
//! GET    /api/v1/users/{id}   Fetch one user
//! PUT    /api/v1/users/{id}   Update a user (email changes are discarded)
//! DELETE /api/v1/users/{id}   Soft-delete a user
//! GET    /api/v1/profile      Fetch the caller's own record
//! PUT    /api/v1/profile      Update the caller's own record
//! POST   /api/v1/logout       End the caller's session
//! ```
//!
//! Every endpoint requires an authenticated session.

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::attributes::AttributeMap;
use crate::domain::page::Page;
use crate::domain::user::{User, UserRole};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// User creation request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Given name, alphabetic.
    pub first_name: String,
    /// Family name, alphabetic.
    pub last_name: String,
    /// Unique email address.
    pub email: String,
    /// Role; defaults to `member` when omitted.
    #[serde(default)]
    pub role: Option<UserRole>,
}

impl CreateUserRequest {
    fn into_attributes(self) -> AttributeMap {
        let mut attributes = AttributeMap::new()
            .with("first_name", self.first_name)
            .with("last_name", self.last_name)
            .with("email", self.email);
        if let Some(role) = self.role {
            attributes = attributes.with("role", role.as_str());
        }
        attributes
    }
}

/// User update request body. Omitted fields are left unchanged; `email` is
/// accepted but discarded.
#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// Given name, alphabetic.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name, alphabetic.
    #[serde(default)]
    pub last_name: Option<String>,
    /// Ignored; the email address is immutable through this surface.
    #[serde(default)]
    pub email: Option<String>,
    /// Role.
    #[serde(default)]
    pub role: Option<UserRole>,
}

impl UpdateUserRequest {
    fn into_attributes(self) -> AttributeMap {
        let mut attributes = AttributeMap::new();
        if let Some(first_name) = self.first_name {
            attributes = attributes.with("first_name", first_name);
        }
        if let Some(last_name) = self.last_name {
            attributes = attributes.with("last_name", last_name);
        }
        if let Some(email) = self.email {
            attributes = attributes.with("email", email);
        }
        if let Some(role) = self.role {
            attributes = attributes.with("role", role.as_str());
        }
        attributes
    }
}

/// User representation returned by the API. Never carries credentials.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// User identifier.
    pub id: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Role.
    pub role: UserRole,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last modified.
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id().to_string(),
            first_name: user.first_name().as_str().to_owned(),
            last_name: user.last_name().as_str().to_owned(),
            email: user.email().as_str().to_owned(),
            role: user.role(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

/// One page of users.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsersPageResponse {
    /// Users on this page, newest update first.
    pub items: Vec<UserResponse>,
    /// One-based page number.
    pub page: u32,
    /// Page size used for the listing.
    pub page_size: u32,
    /// Total matching users across all pages.
    pub total_items: u64,
    /// Total page count.
    pub total_pages: u64,
}

impl From<Page<User>> for UsersPageResponse {
    fn from(page: Page<User>) -> Self {
        Self {
            page: page.page(),
            page_size: page.page_size(),
            total_items: page.total_items(),
            total_pages: page.total_pages(),
            items: page.into_items().into_iter().map(Into::into).collect(),
        }
    }
}

/// Listing query parameters.
#[derive(Debug, Clone, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    /// One-based page number; defaults to the first page.
    #[serde(default)]
    pub page: Option<u32>,
}

/// List users, excluding the caller's own row.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(ListQuery),
    responses(
        (status = 200, description = "Users", body = UsersPageResponse),
        (status = 401, description = "Unauthorised")
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/api/v1/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<UsersPageResponse>> {
    session.require_user_id()?;
    let ctx = session.request_context(&req)?;
    let page = state.users.list(&ctx, query.page.unwrap_or(1)).await?;
    Ok(web::Json(page.into()))
}

/// Create a user and dispatch the set-password notification.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid attributes"),
        (status = 401, description = "Unauthorised"),
        (status = 409, description = "Email already in use"),
        (status = 502, description = "Notification dispatch failed")
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/api/v1/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    body: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let ctx = session.request_context(&req)?;
    let user = state
        .users
        .create(&ctx, body.into_inner().into_attributes())
        .await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Fetch one user by identifier.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 401, description = "Unauthorised"),
        (status = 404, description = "Unknown user")
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/api/v1/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<String>,
) -> ApiResult<web::Json<UserResponse>> {
    session.require_user_id()?;
    let user = state.users.find(&id).await?;
    Ok(web::Json(user.into()))
}

/// Update a user. Email changes are silently discarded.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid attributes"),
        (status = 401, description = "Unauthorised"),
        (status = 404, description = "Unknown user")
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/api/v1/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    id: web::Path<String>,
    body: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    session.require_user_id()?;
    let ctx = session.request_context(&req)?;
    let user = state
        .users
        .update(&ctx, &id, body.into_inner().into_attributes())
        .await?;
    Ok(web::Json(user.into()))
}

/// Soft-delete a user.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Unauthorised"),
        (status = 404, description = "Unknown user")
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/api/v1/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    id: web::Path<String>,
) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    let ctx = session.request_context(&req)?;
    state.users.delete(&ctx, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Fetch the caller's own record.
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, description = "Unauthorised")
    ),
    tags = ["profile"],
    operation_id = "getProfile"
)]
#[get("/api/v1/profile")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
) -> ApiResult<web::Json<UserResponse>> {
    let ctx = session.request_context(&req)?;
    let user = state.users.profile(&ctx).await?;
    Ok(web::Json(user.into()))
}

/// Update the caller's own record. Email changes are silently discarded.
#[utoipa::path(
    put,
    path = "/api/v1/profile",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Invalid attributes"),
        (status = 401, description = "Unauthorised")
    ),
    tags = ["profile"],
    operation_id = "updateProfile"
)]
#[put("/api/v1/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    body: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let ctx = session.request_context(&req)?;
    let user = state
        .users
        .update_profile(&ctx, body.into_inner().into_attributes())
        .await?;
    Ok(web::Json(user.into()))
}

/// End the caller's session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 204, description = "Session ended"),
        (status = 401, description = "Unauthorised")
    ),
    tags = ["profile"],
    operation_id = "logout"
)]
#[post("/api/v1/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.require_user_id()?;
    session.clear_user();
    Ok(HttpResponse::NoContent().finish())
}
