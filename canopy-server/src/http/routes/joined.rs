//! Cross-entity endpoints: nested listings and association creation

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::repos::{
    AssociateError, AssociationRepo, DbError, InsectRef, InsectRepo, InsectSummary, TreeRef,
    TreeSummary, TreeWithInsects,
};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::{InsectDraft, TreeDraft};

use super::insects::InsectResponse;
use super::trees::TreeResponse;
use super::Ack;

/// Tree with nested insects, eager listing shape
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeInsectsResponse {
    pub id: i64,
    pub tree: String,
    pub location: Option<String>,
    pub height_ft: Option<f64>,
    pub insects: Vec<InsectSummaryResponse>,
}

#[derive(Debug, Serialize)]
pub struct InsectSummaryResponse {
    pub id: i64,
    pub name: String,
}

impl From<TreeWithInsects> for TreeInsectsResponse {
    fn from(tree: TreeWithInsects) -> Self {
        Self {
            id: tree.id,
            tree: tree.tree,
            location: tree.location,
            height_ft: tree.height_ft,
            insects: tree
                .insects
                .into_iter()
                .map(|InsectSummary { id, name }| InsectSummaryResponse { id, name })
                .collect(),
        }
    }
}

/// Insect with nested trees, lazy listing shape
#[derive(Debug, Serialize)]
pub struct InsectTreesResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub trees: Vec<TreeSummaryResponse>,
}

#[derive(Debug, Serialize)]
pub struct TreeSummaryResponse {
    pub id: i64,
    pub tree: String,
}

/// Association request: each side is either an existing id or fields
/// for a row to create
#[derive(Debug, Deserialize)]
pub struct AssociateRequest {
    pub tree: Option<AssociateTree>,
    pub insect: Option<AssociateInsect>,
}

#[derive(Debug, Deserialize)]
pub struct AssociateTree {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub draft: TreeDraft,
}

#[derive(Debug, Deserialize)]
pub struct AssociateInsect {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub draft: InsectDraft,
}

/// Association response payload
#[derive(Debug, Serialize)]
pub struct AssociationData {
    pub tree: TreeResponse,
    pub insect: InsectResponse,
}

/// GET /trees-insects - every tree with at least one insect near it,
/// tallest first, insects nested alphabetically (eager: one query)
async fn trees_insects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TreeInsectsResponse>>, ApiError> {
    let trees = AssociationRepo::new(&state.pool)
        .trees_with_insects()
        .await
        .map_err(|e| ApiError::database("Could not list trees with insects", e))?;

    Ok(Json(trees.into_iter().map(TreeInsectsResponse::from).collect()))
}

/// GET /insects-trees - every insect alphabetically, each with the
/// trees near it (lazy: one query per insect)
async fn insects_trees(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<InsectTreesResponse>>, ApiError> {
    let insects = InsectRepo::new(&state.pool)
        .list_by_name()
        .await
        .map_err(|e| ApiError::database("Could not list insects with trees", e))?;

    let associations = AssociationRepo::new(&state.pool);
    let mut payload = Vec::with_capacity(insects.len());

    for insect in insects {
        let trees = associations
            .trees_for_insect(insect.id)
            .await
            .map_err(|e| ApiError::database("Could not list insects with trees", e))?;

        payload.push(InsectTreesResponse {
            id: insect.id,
            name: insect.name,
            description: insect.description,
            trees: trees
                .into_iter()
                .map(|TreeSummary { id, tree }| TreeSummaryResponse { id, tree })
                .collect(),
        });
    }

    Ok(Json(payload))
}

/// POST /associate-tree-insect - record an insect observed near a tree
async fn associate_tree_insect(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AssociateRequest>,
) -> Result<Json<Ack<AssociationData>>, ApiError> {
    let Some(tree) = req.tree else {
        return Err(ApiError::bad_request(
            "tree missing in request",
            "expected a tree object in the request body",
        ));
    };
    let Some(insect) = req.insect else {
        return Err(ApiError::bad_request(
            "insect missing in request",
            "expected an insect object in the request body",
        ));
    };

    // Validate any to-be-created side up front; nothing touches the
    // store until both sides are resolvable.
    let tree_ref = match tree.id {
        Some(id) => TreeRef::ById(id),
        None => TreeRef::New(
            tree.draft
                .validate()
                .map_err(|errors| ApiError::validation("Could not create new tree", errors))?,
        ),
    };
    let insect_ref = match insect.id {
        Some(id) => InsectRef::ById(id),
        None => InsectRef::New(
            insect
                .draft
                .validate()
                .map_err(|errors| ApiError::validation("Could not create new insect", errors))?,
        ),
    };

    let (tree, insect) = AssociationRepo::new(&state.pool)
        .associate(tree_ref, insect_ref)
        .await
        .map_err(|e| match e {
            AssociateError::TreeNotFound(id) => {
                ApiError::not_found(format!("Could not find tree {id}."), "Tree not found")
            }
            AssociateError::InsectNotFound(id) => {
                ApiError::not_found(format!("Could not find insect {id}."), "Insect not found")
            }
            AssociateError::AlreadyLinked { tree, insect } => ApiError::conflict(format!(
                "Association already exists between {tree} and {insect}"
            )),
            AssociateError::Db(e) => {
                ApiError::database("Could not create association", DbError::Sqlx(e))
            }
        })?;

    Ok(Json(Ack::new(
        "success",
        "Successfully created association",
        AssociationData {
            tree: tree.into(),
            insect: insect.into(),
        },
    )))
}

/// Cross-entity routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/trees-insects", get(trees_insects))
        .route("/insects-trees", get(insects_trees))
        .route("/associate-tree-insect", post(associate_tree_insect))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn associate_request_parses_both_shapes() {
        let req: AssociateRequest = serde_json::from_str(
            r#"{
                "tree": {"id": 1},
                "insect": {"name": "Carpenter Ant", "millimeters": 13}
            }"#,
        )
        .unwrap();

        let tree = req.tree.unwrap();
        assert_eq!(tree.id, Some(1));

        let insect = req.insect.unwrap();
        assert_eq!(insect.id, None);
        assert_eq!(insect.draft.name.as_deref(), Some("Carpenter Ant"));
    }

    #[test]
    fn associate_request_tolerates_missing_sides() {
        let req: AssociateRequest = serde_json::from_str(r#"{"tree": {"id": 2}}"#).unwrap();
        assert!(req.tree.is_some());
        assert!(req.insect.is_none());
    }

    #[test]
    fn eager_response_nests_insects() {
        let tree = TreeWithInsects {
            id: 1,
            tree: "General Sherman".into(),
            location: Some("Sequoia National Park".into()),
            height_ft: Some(274.9),
            insects: vec![InsectSummary {
                id: 7,
                name: "Western Pygmy Blue Butterfly".into(),
            }],
        };

        let json = serde_json::to_value(TreeInsectsResponse::from(tree)).unwrap();
        assert_eq!(json["heightFt"], 274.9);
        assert_eq!(json["insects"][0]["name"], "Western Pygmy Blue Butterfly");
    }
}
