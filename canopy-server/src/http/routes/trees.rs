//! Tree endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::repos::{DbError, Tree, TreeHit, TreeListing, TreeRepo};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::TreeDraft;

use super::Ack;

/// Full tree row as returned by fetch, create, and update
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeResponse {
    pub id: i64,
    pub tree: String,
    pub location: Option<String>,
    pub height_ft: Option<f64>,
    pub ground_circumference_ft: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Tree> for TreeResponse {
    fn from(tree: Tree) -> Self {
        Self {
            id: tree.id,
            tree: tree.tree,
            location: tree.location,
            height_ft: tree.height_ft,
            ground_circumference_ft: tree.ground_circumference_ft,
            created_at: tree.created_at.to_rfc3339(),
            updated_at: tree.updated_at.to_rfc3339(),
        }
    }
}

/// Listing item: {id, tree, heightFt}
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeListItem {
    pub id: i64,
    pub tree: String,
    pub height_ft: Option<f64>,
}

impl From<TreeListing> for TreeListItem {
    fn from(listing: TreeListing) -> Self {
        Self {
            id: listing.id,
            tree: listing.tree,
            height_ft: listing.height_ft,
        }
    }
}

/// Search hit: {tree, id}
#[derive(Debug, Serialize)]
pub struct TreeHitResponse {
    pub tree: String,
    pub id: i64,
}

/// Update request: body id must match the path id
#[derive(Debug, Deserialize)]
pub struct UpdateTreeRequest {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub draft: TreeDraft,
}

/// GET /trees - every tree, tallest first
async fn list_trees(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TreeListItem>>, ApiError> {
    let trees = TreeRepo::new(&state.pool)
        .list()
        .await
        .map_err(|e| ApiError::database("Could not list trees", e))?;

    Ok(Json(trees.into_iter().map(TreeListItem::from).collect()))
}

/// GET /trees/{id} - one tree, full row
async fn get_tree(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<TreeResponse>, ApiError> {
    let tree = TreeRepo::new(&state.pool)
        .get(id)
        .await
        .map_err(|e| match e {
            DbError::NotFound { .. } => {
                ApiError::not_found(format!("Could not find tree {id}."), "Tree not found")
            }
            e => ApiError::database(format!("Could not find tree {id}."), e),
        })?;

    Ok(Json(tree.into()))
}

/// POST /trees - create from whichever fields are present
async fn create_tree(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<TreeDraft>,
) -> Result<Json<Ack<TreeResponse>>, ApiError> {
    let attrs = draft
        .validate()
        .map_err(|errors| ApiError::validation("Could not create new tree", errors))?;

    let tree = TreeRepo::new(&state.pool)
        .create(attrs)
        .await
        .map_err(|e| ApiError::database("Could not create new tree", e))?;

    Ok(Json(Ack::new(
        "Success",
        "Successfully created new tree",
        tree.into(),
    )))
}

/// PUT /trees/{id} - overwrite the provided fields, keep the rest
async fn update_tree(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTreeRequest>,
) -> Result<Json<Ack<TreeResponse>>, ApiError> {
    if req.id != Some(id) {
        let body_id = req
            .id
            .map_or_else(|| "no id".to_owned(), |body| body.to_string());
        return Err(ApiError::bad_request(
            "Could not update tree",
            format!("{id} does not match {body_id}"),
        ));
    }

    let repo = TreeRepo::new(&state.pool);
    let existing = repo.get(id).await.map_err(|e| match e {
        DbError::NotFound { .. } => {
            ApiError::not_found(format!("Could not update tree {id}"), "Tree not found")
        }
        e => ApiError::database(format!("Could not update tree {id}"), e),
    })?;

    let attrs = merge(existing, req.draft)
        .validate()
        .map_err(|errors| ApiError::validation("Could not update tree", errors))?;

    let tree = repo
        .update(id, attrs)
        .await
        .map_err(|e| ApiError::database("Could not update tree", e))?;

    Ok(Json(Ack::new(
        "success",
        "Successfully updated tree",
        tree.into(),
    )))
}

/// DELETE /trees/{id}
async fn delete_tree(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Ack<()>>, ApiError> {
    TreeRepo::new(&state.pool)
        .delete(id)
        .await
        .map_err(|e| match e {
            DbError::NotFound { .. } => {
                ApiError::not_found(format!("Could not remove tree {id}"), "Tree not found")
            }
            e => ApiError::database(format!("Could not remove tree {id}"), e),
        })?;

    Ok(Json(Ack::message_only(
        "success",
        format!("Successfully removed tree {id}"),
    )))
}

/// GET /trees/search/{value} - case-insensitive substring match on name
async fn search_trees(
    State(state): State<Arc<AppState>>,
    Path(value): Path<String>,
) -> Result<Json<Vec<TreeHitResponse>>, ApiError> {
    let hits = TreeRepo::new(&state.pool)
        .search(&value)
        .await
        .map_err(|e| ApiError::database("Could not search trees", e))?;

    Ok(Json(
        hits.into_iter()
            .map(|TreeHit { tree, id }| TreeHitResponse { tree, id })
            .collect(),
    ))
}

/// Overlay the provided fields on the stored row; absent fields keep
/// the stored values.
fn merge(existing: Tree, overlay: TreeDraft) -> TreeDraft {
    TreeDraft {
        name: overlay.name.or(Some(existing.tree)),
        location: overlay.location.or(existing.location),
        height_ft: overlay.height_ft.or(existing.height_ft),
        ground_circumference_ft: overlay
            .ground_circumference_ft
            .or(existing.ground_circumference_ft),
    }
}

/// Tree routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/trees", get(list_trees).post(create_tree))
        .route("/trees/search/{value}", get(search_trees))
        .route(
            "/trees/{id}",
            get(get_tree).put(update_tree).delete(delete_tree),
        )
}
