//! Request handlers

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};

use crate::dto::{
    CreatePullRequestRequest, HealthResponse, MergePullRequestRequest, PullRequestResponse,
    PullRequestShortDto, ReassignRequest, ReassignResponse, SetIsActiveRequest, TeamDto,
    TeamQuery, TeamResponse, UserQuery, UserResponse, UserReviewsResponse,
};
use crate::error::ApiError;
use crate::AppState;

type ApiResult<T> = Result<T, ApiError>;

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

fn query<T>(params: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    params
        .map(|Query(value)| value)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

/// Reject empty identifiers before they reach the services
fn require(fields: &[(&str, &str)]) -> ApiResult<()> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err(ApiError::BadRequest(format!("missing required field: {name}"))),
        None => Ok(()),
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn add_team(
    State(state): State<AppState>,
    payload: Result<Json<TeamDto>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TeamResponse>)> {
    let req = body(payload)?;
    require(&[("team_name", req.team_name.as_str())])?;
    for member in &req.members {
        require(&[("user_id", member.user_id.as_str())])?;
    }

    let members = req.members.into_iter().map(Into::into).collect();
    let cancel = state.request_token();
    let team = state
        .within_deadline(
            &cancel,
            state.services.teams.add_team(&cancel, &req.team_name, members),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TeamResponse { team: team.into() }),
    ))
}

pub async fn get_team(
    State(state): State<AppState>,
    params: Result<Query<TeamQuery>, QueryRejection>,
) -> ApiResult<Json<TeamDto>> {
    let params = query(params)?;
    require(&[("team_name", params.team_name.as_str())])?;

    let cancel = state.request_token();
    let team = state
        .within_deadline(
            &cancel,
            state.services.teams.get_team(&cancel, &params.team_name),
        )
        .await?;
    Ok(Json(team.into()))
}

pub async fn set_is_active(
    State(state): State<AppState>,
    payload: Result<Json<SetIsActiveRequest>, JsonRejection>,
) -> ApiResult<Json<UserResponse>> {
    let req = body(payload)?;
    require(&[("user_id", req.user_id.as_str())])?;

    let cancel = state.request_token();
    let user = state
        .within_deadline(
            &cancel,
            state.services.users.set_is_active(&cancel, &req.user_id, req.is_active),
        )
        .await?;
    Ok(Json(UserResponse { user: user.into() }))
}

pub async fn get_reviews(
    State(state): State<AppState>,
    params: Result<Query<UserQuery>, QueryRejection>,
) -> ApiResult<Json<UserReviewsResponse>> {
    let params = query(params)?;
    require(&[("user_id", params.user_id.as_str())])?;

    let cancel = state.request_token();
    let prs = state
        .within_deadline(
            &cancel,
            state.services.users.reviews(&cancel, &params.user_id),
        )
        .await?;
    Ok(Json(UserReviewsResponse {
        user_id: params.user_id,
        pull_requests: prs.into_iter().map(PullRequestShortDto::from).collect(),
    }))
}

pub async fn create_pull_request(
    State(state): State<AppState>,
    payload: Result<Json<CreatePullRequestRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PullRequestResponse>)> {
    let req = body(payload)?;
    require(&[
        ("pull_request_id", req.pull_request_id.as_str()),
        ("pull_request_name", req.pull_request_name.as_str()),
        ("author_id", req.author_id.as_str()),
    ])?;

    let cancel = state.request_token();
    let pr = state
        .within_deadline(
            &cancel,
            state.services.pull_requests.create_pr(
                &cancel,
                &req.pull_request_id,
                &req.pull_request_name,
                &req.author_id,
            ),
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(PullRequestResponse { pr: pr.into() }),
    ))
}

pub async fn merge_pull_request(
    State(state): State<AppState>,
    payload: Result<Json<MergePullRequestRequest>, JsonRejection>,
) -> ApiResult<Json<PullRequestResponse>> {
    let req = body(payload)?;
    require(&[("pull_request_id", req.pull_request_id.as_str())])?;

    let cancel = state.request_token();
    let pr = state
        .within_deadline(
            &cancel,
            state.services.pull_requests.merge_pr(&cancel, &req.pull_request_id),
        )
        .await?;
    Ok(Json(PullRequestResponse { pr: pr.into() }))
}

pub async fn reassign_reviewer(
    State(state): State<AppState>,
    payload: Result<Json<ReassignRequest>, JsonRejection>,
) -> ApiResult<Json<ReassignResponse>> {
    let req = body(payload)?;
    require(&[
        ("pull_request_id", req.pull_request_id.as_str()),
        ("old_reviewer_id", req.old_reviewer_id.as_str()),
    ])?;

    let cancel = state.request_token();
    let result = state
        .within_deadline(
            &cancel,
            state.services.pull_requests.reassign_reviewer(
                &cancel,
                &req.pull_request_id,
                &req.old_reviewer_id,
            ),
        )
        .await?;
    Ok(Json(ReassignResponse {
        pr: result.pr.into(),
        replaced_by: result.replaced_by,
    }))
}
