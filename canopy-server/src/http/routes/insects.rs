//! Insect endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::db::repos::{DbError, Insect, InsectHit, InsectListing, InsectRepo};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::InsectDraft;

use super::Ack;

/// Full insect row as returned by fetch, create, and update
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsectResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub fact: Option<String>,
    pub territory: Option<String>,
    pub millimeters: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Insect> for InsectResponse {
    fn from(insect: Insect) -> Self {
        Self {
            id: insect.id,
            name: insect.name,
            description: insect.description,
            fact: insect.fact,
            territory: insect.territory,
            millimeters: insect.millimeters,
            created_at: insect.created_at.to_rfc3339(),
            updated_at: insect.updated_at.to_rfc3339(),
        }
    }
}

/// Listing item: {id, name, millimeters}
#[derive(Debug, Serialize)]
pub struct InsectListItem {
    pub id: i64,
    pub name: String,
    pub millimeters: Option<f64>,
}

impl From<InsectListing> for InsectListItem {
    fn from(listing: InsectListing) -> Self {
        Self {
            id: listing.id,
            name: listing.name,
            millimeters: listing.millimeters,
        }
    }
}

/// Search hit: {name, id}
#[derive(Debug, Serialize)]
pub struct InsectHitResponse {
    pub name: String,
    pub id: i64,
}

/// Update request: body id must match the path id
#[derive(Debug, Deserialize)]
pub struct UpdateInsectRequest {
    pub id: Option<i64>,
    #[serde(flatten)]
    pub draft: InsectDraft,
}

/// GET /insects - every insect, smallest first
async fn list_insects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<InsectListItem>>, ApiError> {
    let insects = InsectRepo::new(&state.pool)
        .list()
        .await
        .map_err(|e| ApiError::database("Could not list insects", e))?;

    Ok(Json(insects.into_iter().map(InsectListItem::from).collect()))
}

/// GET /insects/{id} - one insect, full row
async fn get_insect(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<InsectResponse>, ApiError> {
    let insect = InsectRepo::new(&state.pool)
        .get(id)
        .await
        .map_err(|e| match e {
            DbError::NotFound { .. } => {
                ApiError::not_found(format!("Could not find insect {id}."), "Insect not found")
            }
            e => ApiError::database(format!("Could not find insect {id}."), e),
        })?;

    Ok(Json(insect.into()))
}

/// POST /insects - create from whichever fields are present
async fn create_insect(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<InsectDraft>,
) -> Result<Json<Ack<InsectResponse>>, ApiError> {
    let attrs = draft
        .validate()
        .map_err(|errors| ApiError::validation("Could not create new insect", errors))?;

    let insect = InsectRepo::new(&state.pool)
        .create(attrs)
        .await
        .map_err(|e| ApiError::database("Could not create new insect", e))?;

    Ok(Json(Ack::new(
        "Success",
        "Successfully created new insect",
        insect.into(),
    )))
}

/// PUT /insects/{id} - overwrite the provided fields, keep the rest
async fn update_insect(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateInsectRequest>,
) -> Result<Json<Ack<InsectResponse>>, ApiError> {
    if req.id != Some(id) {
        let body_id = req
            .id
            .map_or_else(|| "no id".to_owned(), |body| body.to_string());
        return Err(ApiError::bad_request(
            "Could not update insect",
            format!("{id} does not match {body_id}"),
        ));
    }

    let repo = InsectRepo::new(&state.pool);
    let existing = repo.get(id).await.map_err(|e| match e {
        DbError::NotFound { .. } => {
            ApiError::not_found(format!("Could not update insect {id}"), "Insect not found")
        }
        e => ApiError::database(format!("Could not update insect {id}"), e),
    })?;

    let attrs = merge(existing, req.draft)
        .validate()
        .map_err(|errors| ApiError::validation("Could not update insect", errors))?;

    let insect = repo
        .update(id, attrs)
        .await
        .map_err(|e| ApiError::database("Could not update insect", e))?;

    Ok(Json(Ack::new(
        "success",
        "Successfully updated insect",
        insect.into(),
    )))
}

/// DELETE /insects/{id}
async fn delete_insect(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Ack<()>>, ApiError> {
    InsectRepo::new(&state.pool)
        .delete(id)
        .await
        .map_err(|e| match e {
            DbError::NotFound { .. } => {
                ApiError::not_found(format!("Could not remove insect {id}"), "Insect not found")
            }
            e => ApiError::database(format!("Could not remove insect {id}"), e),
        })?;

    Ok(Json(Ack::message_only(
        "success",
        format!("Successfully removed insect {id}"),
    )))
}

/// GET /insects/search/{value} - case-insensitive substring match on name
async fn search_insects(
    State(state): State<Arc<AppState>>,
    Path(value): Path<String>,
) -> Result<Json<Vec<InsectHitResponse>>, ApiError> {
    let hits = InsectRepo::new(&state.pool)
        .search(&value)
        .await
        .map_err(|e| ApiError::database("Could not search insects", e))?;

    Ok(Json(
        hits.into_iter()
            .map(|InsectHit { name, id }| InsectHitResponse { name, id })
            .collect(),
    ))
}

/// Overlay the provided fields on the stored row; absent fields keep
/// the stored values.
fn merge(existing: Insect, overlay: InsectDraft) -> InsectDraft {
    InsectDraft {
        name: overlay.name.or(Some(existing.name)),
        description: overlay.description.or(existing.description),
        fact: overlay.fact.or(existing.fact),
        territory: overlay.territory.or(existing.territory),
        millimeters: overlay.millimeters.or(existing.millimeters),
    }
}

/// Insect routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/insects", get(list_insects).post(create_insect))
        .route("/insects/search/{value}", get(search_insects))
        .route(
            "/insects/{id}",
            get(get_insect).put(update_insect).delete(delete_insect),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn stored() -> Insect {
        Insect {
            id: 1,
            name: "Western Pygmy Blue Butterfly".into(),
            description: Some("Among the smallest butterflies".into()),
            fact: None,
            territory: Some("Western United States".into()),
            millimeters: Some(12.0),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn merge_keeps_absent_fields() {
        let overlay = InsectDraft {
            millimeters: Some(13.5),
            ..Default::default()
        };

        let merged = merge(stored(), overlay);
        assert_eq!(merged.name.as_deref(), Some("Western Pygmy Blue Butterfly"));
        assert_eq!(
            merged.description.as_deref(),
            Some("Among the smallest butterflies")
        );
        assert_eq!(merged.millimeters, Some(13.5));
    }

    #[test]
    fn merge_overwrites_provided_fields() {
        let overlay = InsectDraft {
            name: Some("Patu Digua Spider".into()),
            fact: Some("Males are smaller than females.".into()),
            ..Default::default()
        };

        let merged = merge(stored(), overlay);
        assert_eq!(merged.name.as_deref(), Some("Patu Digua Spider"));
        assert_eq!(merged.fact.as_deref(), Some("Males are smaller than females."));
        assert_eq!(merged.millimeters, Some(12.0));
    }

    #[test]
    fn response_uses_camel_case_timestamps() {
        let response = InsectResponse::from(stored());
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert_eq!(json["millimeters"], 12.0);
    }
}
