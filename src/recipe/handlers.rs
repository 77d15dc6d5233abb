use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::{method_not_allowed, AppResult},
    extract::ApiJson,
    recipe::{
        dto::{RecordRequest, RecordResponse},
        model::RecordKind,
        services,
    },
    state::AppState,
};

/// `/recipe/<kind>` and `/recipe/<kind>/:id` for one record kind.
pub fn record_routes(kind: RecordKind) -> Router<AppState> {
    Router::new()
        .route(
            &format!("/recipe/{}", kind.path()),
            get(list_records)
                .post(create_record)
                .fallback(method_not_allowed),
        )
        .route(
            &format!("/recipe/{}/:id", kind.path()),
            get(get_record)
                .put(replace_record)
                .patch(patch_record)
                .delete(delete_record)
                .fallback(method_not_allowed),
        )
        .layer(Extension(kind))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_records(
    State(state): State<AppState>,
    Extension(kind): Extension<RecordKind>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<Vec<RecordResponse>>> {
    let records = services::list(state.records.as_ref(), kind, user.id).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create_record(
    State(state): State<AppState>,
    Extension(kind): Extension<RecordKind>,
    AuthUser(user): AuthUser,
    ApiJson(payload): ApiJson<RecordRequest>,
) -> AppResult<(StatusCode, Json<RecordResponse>)> {
    payload.reject_owner()?;
    let rec = services::create(state.records.as_ref(), kind, user.id, payload.name.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(rec.into())))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_record(
    State(state): State<AppState>,
    Extension(kind): Extension<RecordKind>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RecordResponse>> {
    let rec = services::get(state.records.as_ref(), kind, user.id, id).await?;
    Ok(Json(rec.into()))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn replace_record(
    State(state): State<AppState>,
    Extension(kind): Extension<RecordKind>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<RecordRequest>,
) -> AppResult<Json<RecordResponse>> {
    payload.reject_owner()?;
    let rec = services::rename(state.records.as_ref(), kind, user.id, id, payload.name.as_deref()).await?;
    Ok(Json(rec.into()))
}

/// Like PUT, but an absent `name` leaves the record unchanged.
#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn patch_record(
    State(state): State<AppState>,
    Extension(kind): Extension<RecordKind>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<RecordRequest>,
) -> AppResult<Json<RecordResponse>> {
    payload.reject_owner()?;
    let rec = match payload.name.as_deref() {
        Some(name) => services::rename(state.records.as_ref(), kind, user.id, id, Some(name)).await?,
        None => services::get(state.records.as_ref(), kind, user.id, id).await?,
    };
    Ok(Json(rec.into()))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_record(
    State(state): State<AppState>,
    Extension(kind): Extension<RecordKind>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    services::delete(state.records.as_ref(), kind, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::{
        app::build_app,
        recipe::{model::RecordKind, repo::RecordRepo},
        state::AppState,
        users::{model::UserFlags, services as users},
    };

    const INGREDIENTS: &str = "/api/recipe/ingredients";
    const TAGS: &str = "/api/recipe/tags";

    async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            req = req.header(header::AUTHORIZATION, format!("Token {t}"));
        }
        let body = match body {
            Some(v) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    /// Creates a user and returns its id together with a live token.
    async fn login(state: &AppState, app: &Router, email: &str) -> (Uuid, String) {
        let user = users::create_user(state.users.as_ref(), Some(email), "test0000", None, UserFlags::default())
            .await
            .unwrap();
        let (_, body) = send(
            app,
            Method::POST,
            "/api/users/token",
            None,
            Some(json!({"email": email, "password": "test0000"})),
        )
        .await;
        (user.id, body["token"].as_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn login_required() {
        let state = AppState::fake();
        let app = build_app(state);
        for uri in [INGREDIENTS, TAGS] {
            let (status, _) = send(&app, Method::GET, uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            let (status, _) = send(&app, Method::POST, uri, None, Some(json!({"name": "x"}))).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn retrieve_ingredient_list_sorted_by_name_descending() {
        let state = AppState::fake();
        let app = build_app(state.clone());
        let (user_id, token) = login(&state, &app, "test@qa.pthree.com").await;
        state.records.insert(RecordKind::Ingredient, user_id, Uuid::new_v4(), "kale").await.unwrap();
        state.records.insert(RecordKind::Ingredient, user_id, Uuid::new_v4(), "salt").await.unwrap();

        let (status, body) = send(&app, Method::GET, INGREDIENTS, Some(token.as_str()), None).await;

        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body.as_array().unwrap().iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["salt", "kale"]);
    }

    #[tokio::test]
    async fn ingredients_limited_to_user() {
        let state = AppState::fake();
        let app = build_app(state.clone());
        let (other_id, _) = login(&state, &app, "another@qa.pthree.com").await;
        let (user_id, token) = login(&state, &app, "test@qa.pthree.com").await;
        state.records.insert(RecordKind::Ingredient, other_id, Uuid::new_v4(), "Vinegar").await.unwrap();
        state.records.insert(RecordKind::Ingredient, user_id, Uuid::new_v4(), "tumeric").await.unwrap();

        let (status, body) = send(&app, Method::GET, INGREDIENTS, Some(token.as_str()), None).await;

        assert_eq!(status, StatusCode::OK);
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "tumeric");
    }

    #[tokio::test]
    async fn create_ingredient_successful() {
        let state = AppState::fake();
        let app = build_app(state.clone());
        let (user_id, token) = login(&state, &app, "test@qa.pthree.com").await;

        let (status, body) = send(&app, Method::POST, INGREDIENTS, Some(token.as_str()), Some(json!({"name": "Cabbage"}))).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "Cabbage");
        assert!(body.get("user_id").is_none());
        let stored = state.records.list(RecordKind::Ingredient, user_id).await.unwrap();
        assert!(stored.iter().any(|r| r.name == "Cabbage"));
        assert!(state.records.list(RecordKind::Tag, user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_ingredient_invalid() {
        let state = AppState::fake();
        let app = build_app(state.clone());
        let (user_id, token) = login(&state, &app, "test@qa.pthree.com").await;

        let (status, _) = send(&app, Method::POST, INGREDIENTS, Some(token.as_str()), Some(json!({"name": ""}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(state.records.list(RecordKind::Ingredient, user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn owner_cannot_be_set_from_payload() {
        let state = AppState::fake();
        let app = build_app(state.clone());
        let (victim_id, _) = login(&state, &app, "victim@x.com").await;
        let (_, token) = login(&state, &app, "attacker@x.com").await;

        let payload = json!({"name": "planted", "user": victim_id});
        let (status, _) = send(&app, Method::POST, TAGS, Some(token.as_str()), Some(payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);

        let payload = json!({"name": "planted", "user": null});
        let (status, _) = send(&app, Method::POST, TAGS, Some(token.as_str()), Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert!(state.records.list(RecordKind::Tag, victim_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn tag_crud_round() {
        let state = AppState::fake();
        let app = build_app(state.clone());
        let (_, token) = login(&state, &app, "test@qa.pthree.com").await;

        let (status, created) = send(&app, Method::POST, TAGS, Some(token.as_str()), Some(json!({"name": "Vegan"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        let uri = format!("{TAGS}/{}", created["id"].as_str().unwrap());

        let (status, body) = send(&app, Method::GET, &uri, Some(token.as_str()), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Vegan");

        let (status, body) = send(&app, Method::PUT, &uri, Some(token.as_str()), Some(json!({"name": "Vegetarian"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Vegetarian");

        let (status, body) = send(&app, Method::PATCH, &uri, Some(token.as_str()), Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Vegetarian");

        let (status, _) = send(&app, Method::DELETE, &uri, Some(token.as_str()), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, Method::GET, &uri, Some(token.as_str()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn foreign_records_look_missing() {
        let state = AppState::fake();
        let app = build_app(state.clone());
        let (owner_id, _) = login(&state, &app, "owner@x.com").await;
        let (_, token) = login(&state, &app, "other@x.com").await;
        let rec = state.records.insert(RecordKind::Ingredient, owner_id, Uuid::new_v4(), "saffron").await.unwrap();
        let uri = format!("{INGREDIENTS}/{}", rec.id);

        let (status, _) = send(&app, Method::GET, &uri, Some(token.as_str()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, Method::PATCH, &uri, Some(token.as_str()), Some(json!({"name": "mine"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, Method::DELETE, &uri, Some(token.as_str()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let kept = state.records.get(RecordKind::Ingredient, owner_id, rec.id).await.unwrap().unwrap();
        assert_eq!(kept.name, "saffron");
    }
}
