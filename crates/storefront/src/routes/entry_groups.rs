//! Entry group route handlers.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::Value;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::fields::FieldsQuery;
use crate::routes::dto::{
    CartModificationView, EntryGroupPath, OrderEntryRequest, entry_request, render,
};
use crate::state::AppState;

/// Add a product to an entry group.
#[instrument(skip(state, body))]
pub async fn add(
    State(state): State<AppState>,
    Path(path): Path<EntryGroupPath>,
    Query(query): Query<FieldsQuery>,
    body: std::result::Result<Json<OrderEntryRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let (site, key, group) = path.resolve()?;
    let fields = state.field_sets().resolve(query.fields.as_deref())?;
    let request = entry_request(body)?;

    let result = state
        .entries()
        .add_to_entry_group(&site, &key, group, request)
        .await?;
    add_breadcrumb(
        "cart",
        "Added to entry group",
        &[("cart", key.to_string()), ("group", group.to_string())],
    );
    render(&fields, &CartModificationView::from(&result))
}

/// Remove an entry group and its entries.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Path(path): Path<EntryGroupPath>,
) -> Result<StatusCode> {
    let (_, key, group) = path.resolve()?;

    state.entries().remove_entry_group(&key, group).await?;
    add_breadcrumb(
        "cart",
        "Removed entry group",
        &[("cart", key.to_string()), ("group", group.to_string())],
    );
    Ok(StatusCode::OK)
}
