use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, post, put},
    Router,
};
use tracing::info;

use crate::backend::domain::commands::families::{
    AddMemberCommand, ChangeOwnerCommand, CreateFamilyCommand, InviteCommand,
};
use crate::backend::io::rest::auth::CurrentUser;
use crate::backend::io::rest::error::domain_error_response;
use crate::backend::io::rest::mappers::FamilyMapper;
use crate::backend::AppState;
use shared::{
    AddMemberRequest, BirthdaySyncResponse, ChangeOwnerRequest, CreateFamilyRequest, CreateInvitationRequest,
    DeleteResponse, FamilyResponse, InvitationResponse,
};

/// Create a router for family APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_family))
        .route("/:id", delete(delete_family))
        .route("/:id/owner", put(change_owner))
        .route("/:id/members", post(add_member))
        .route("/:id/invitations", post(create_invitation))
        .route("/:id/birthdays/sync", post(sync_birthday))
        .route("/invitations/:token/accept", post(accept_invitation))
}

async fn create_family(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateFamilyRequest>,
) -> impl IntoResponse {
    info!("POST /api/families - user: {}, name: {}", user.id, request.name);

    let command = CreateFamilyCommand { name: request.name };

    match state.family_service.create_family(&user, command).await {
        Ok(family) => {
            let response = FamilyResponse {
                success_message: format!("Family '{}' created", family.name),
                family: FamilyMapper::to_dto(family),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => domain_error_response("create family", e),
    }
}

async fn add_member(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(family_id): Path<i64>,
    Json(request): Json<AddMemberRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/families/{}/members - user: {}, member: {}",
        family_id, user.id, request.user_id
    );

    let command = AddMemberCommand {
        family_id,
        user_id: request.user_id,
    };

    match state.family_service.add_member(&user, command).await {
        Ok(family) => {
            let response = FamilyResponse {
                success_message: format!("User {} added to family '{}'", request.user_id, family.name),
                family: FamilyMapper::to_dto(family),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => domain_error_response("add family member", e),
    }
}

/// Synchronize the caller's own birthday event in the family
async fn sync_birthday(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(family_id): Path<i64>,
) -> impl IntoResponse {
    info!("POST /api/families/{}/birthdays/sync - user: {}", family_id, user.id);

    let family = match state.family_service.resolve_family(&user, Some(family_id)).await {
        Ok(family) => family,
        Err(e) => return domain_error_response("resolve family", e),
    };

    match state.family_service.sync_birthday(&user, &family).await {
        Ok(outcome) => {
            let response = BirthdaySyncResponse {
                family_id: family.id,
                user_id: user.id,
                outcome: FamilyMapper::outcome_to_dto(outcome),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => domain_error_response("sync birthday", e),
    }
}

async fn delete_family(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(family_id): Path<i64>,
) -> impl IntoResponse {
    info!("DELETE /api/families/{} - user: {}", family_id, user.id);

    match state.family_service.delete_family(&user, family_id).await {
        Ok(()) => {
            let response = DeleteResponse {
                id: family_id,
                success_message: "Family deleted".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => domain_error_response("delete family", e),
    }
}

async fn change_owner(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(family_id): Path<i64>,
    Json(request): Json<ChangeOwnerRequest>,
) -> impl IntoResponse {
    info!(
        "PUT /api/families/{}/owner - user: {}, new owner: {}",
        family_id, user.id, request.user_id
    );

    let command = ChangeOwnerCommand {
        family_id,
        new_owner_id: request.user_id,
    };

    match state.family_service.change_owner(&user, command).await {
        Ok(family) => {
            let response = FamilyResponse {
                success_message: format!("User {} now owns family '{}'", request.user_id, family.name),
                family: FamilyMapper::to_dto(family),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => domain_error_response("change family owner", e),
    }
}

async fn create_invitation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(family_id): Path<i64>,
    Json(request): Json<CreateInvitationRequest>,
) -> impl IntoResponse {
    info!("POST /api/families/{}/invitations - user: {}", family_id, user.id);

    let command = InviteCommand {
        family_id,
        email: request.email,
    };

    match state.family_service.invite(&user, command).await {
        Ok(invitation) => {
            let response = InvitationResponse {
                success_message: format!("Invitation sent to {}", invitation.email),
                invitation: FamilyMapper::invitation_to_dto(invitation),
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => domain_error_response("create invitation", e),
    }
}

/// Join a family with an invitation token
async fn accept_invitation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(token): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/families/invitations/<token>/accept - user: {}", user.id);

    match state.family_service.accept_invitation(&token, &user).await {
        Ok(family) => {
            let response = FamilyResponse {
                success_message: format!("Welcome to family '{}'", family.name),
                family: FamilyMapper::to_dto(family),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => domain_error_response("accept invitation", e),
    }
}
