//! Generic CRUD routes, mounted once per entity kind.
//!
//! `router::<Sensor>("/sensors")` yields:
//! - `GET    /sensors`       list, filtered by `propertyId`, `workOrderId` or `groupId`
//! - `POST   /sensors`       create from a validated body
//! - `GET    /sensors/{id}`  fetch
//! - `PATCH  /sensors/{id}`  merge a partial update
//! - `DELETE /sensors/{id}`  delete (with the kind's cascade)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiError, ValidationError};
use crate::ident::resolve;
use crate::models::{
    Entity, EntityKind, ListFilter, Property, PropertyGroup, Reference, Staff, Validate,
    WorkOrder,
};
use crate::store::{Repository, SharedStore, Store};

// ---

pub fn router<E>(path: &str) -> Router<SharedStore>
where
    E: Entity,
    dyn Store: Repository<E>,
{
    // ---
    Router::new()
        .route(path, get(list::<E>).post(create::<E>))
        .route(
            &format!("{path}/{{id}}"),
            get(fetch::<E>).patch(update::<E>).delete(remove::<E>),
        )
}

/// Query parameters for filtering listings
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Any property id form: `7`, `prop-007`.
    property_id: Option<String>,
    work_order_id: Option<i64>,
    group_id: Option<i64>,
}

impl ListQuery {
    /// Pick the filter for a listing of `kind`. A key the kind does not
    /// carry (`groupId` on sensors) is rejected rather than matching nothing.
    fn filter(&self, kind: EntityKind) -> Result<ListFilter, ApiError> {
        // ---
        let (filter, key) = if let Some(raw) = &self.property_id {
            let id = resolve(raw).ok_or_else(|| ApiError::not_found(format!("property {raw}")))?;
            (ListFilter::Property(id), "propertyId")
        } else if let Some(id) = self.work_order_id {
            (ListFilter::WorkOrder(id), "workOrderId")
        } else if let Some(id) = self.group_id {
            (ListFilter::Group(id), "groupId")
        } else {
            return Ok(ListFilter::All);
        };

        if !filter.applies_to(kind) {
            let msg = format!("{kind} listings cannot be filtered by {key}");
            return Err(ValidationError::new(msg).into());
        }
        Ok(filter)
    }
}

/// Reject inputs whose foreign keys point at nothing.
pub(crate) async fn check_references(
    store: &dyn Store,
    refs: &[Reference],
) -> Result<(), ApiError> {
    // ---
    for reference in refs {
        let (found, what) = match *reference {
            Reference::Property(id) => (
                store.exists::<Property>(id.get()).await?,
                format!("property {id}"),
            ),
            Reference::WorkOrder(id) => (
                store.exists::<WorkOrder>(id).await?,
                format!("work order {id}"),
            ),
            Reference::Staff(id) => (
                store.exists::<Staff>(id).await?,
                format!("staff member {id}"),
            ),
            Reference::Group(id) => (
                store.exists::<PropertyGroup>(id).await?,
                format!("property group {id}"),
            ),
        };
        if !found {
            return Err(ValidationError::new(format!("{what} does not exist")).into());
        }
    }
    Ok(())
}

pub(crate) fn not_found<E: Entity>(id: impl std::fmt::Display) -> ApiError {
    ApiError::not_found(format!("{} {}", E::KIND, id))
}

async fn list<E>(
    State(store): State<SharedStore>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<E>>, ApiError>
where
    E: Entity,
    dyn Store: Repository<E>,
{
    // ---
    let filter = params.filter(E::KIND)?;
    let records = store.fetch_all::<E>(filter).await?;
    info!("GET {} list {:?} -> {} records", E::KIND, filter, records.len());
    Ok(Json(records))
}

pub(crate) async fn create<E>(
    State(store): State<SharedStore>,
    Json(new): Json<E::New>,
) -> Result<(StatusCode, Json<E>), ApiError>
where
    E: Entity,
    dyn Store: Repository<E>,
{
    // ---
    new.validate()?;
    check_references(store.as_ref(), &E::references(&new)).await?;

    let record = store.insert::<E>(new).await?;
    info!("POST {} -> created {}", E::KIND, record.id());
    Ok((StatusCode::CREATED, Json(record)))
}

async fn fetch<E>(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
) -> Result<Json<E>, ApiError>
where
    E: Entity,
    dyn Store: Repository<E>,
{
    store
        .fetch::<E>(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found::<E>(id))
}

async fn update<E>(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
    Json(patch): Json<E::Patch>,
) -> Result<Json<E>, ApiError>
where
    E: Entity,
    dyn Store: Repository<E>,
{
    // ---
    patch.validate()?;
    check_references(store.as_ref(), &E::patch_references(&patch)).await?;

    info!("PATCH {} {}", E::KIND, id);
    store
        .modify::<E>(id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| not_found::<E>(id))
}

async fn remove<E>(
    State(store): State<SharedStore>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError>
where
    E: Entity,
    dyn Store: Repository<E>,
{
    // ---
    info!("DELETE {} {}", E::KIND, id);
    if store.remove::<E>(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found::<E>(id))
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::ident::PropertyId;

    #[test]
    fn test_list_query_filters() {
        // ---
        let q = ListQuery {
            property_id: Some("prop-004".into()),
            ..Default::default()
        };
        assert_eq!(
            q.filter(EntityKind::Sensor).unwrap(),
            ListFilter::Property(PropertyId::new(4))
        );

        let q = ListQuery {
            work_order_id: Some(2),
            ..Default::default()
        };
        assert_eq!(q.filter(EntityKind::WorkOrderCost).unwrap(), ListFilter::WorkOrder(2));

        assert_eq!(
            ListQuery::default().filter(EntityKind::Staff).unwrap(),
            ListFilter::All
        );
    }

    #[test]
    fn test_list_query_bad_property_is_not_found() {
        // ---
        let q = ListQuery {
            property_id: Some("flat-9".into()),
            ..Default::default()
        };
        let err = q.filter(EntityKind::Sensor).unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_list_query_key_must_exist_on_kind() {
        // ---
        let by_group = ListQuery {
            group_id: Some(1),
            ..Default::default()
        };
        let err = by_group.filter(EntityKind::Sensor).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(by_group.filter(EntityKind::Property).unwrap(), ListFilter::Group(1));

        let by_order = ListQuery {
            work_order_id: Some(1),
            ..Default::default()
        };
        assert!(by_order.filter(EntityKind::Alert).is_err());

        let by_property = ListQuery {
            property_id: Some("1".into()),
            ..Default::default()
        };
        assert!(by_property.filter(EntityKind::Staff).is_err());
        assert!(by_property.filter(EntityKind::WorkOrder).is_ok());
    }
}
