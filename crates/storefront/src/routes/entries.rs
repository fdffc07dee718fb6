//! Cart entry route handlers.
//!
//! Every handler resolves the `fields` level before touching the cart, so a
//! malformed selection never leaves a half-applied mutation behind.

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
    CartModificationView, CartPath, EntryPath, OrderEntryListView, OrderEntryRequest,
    OrderEntryView, entry_request, render,
};
use crate::state::AppState;

/// List the entries of a cart.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Path(path): Path<CartPath>,
    Query(query): Query<FieldsQuery>,
) -> Result<Json<Value>> {
    let (_, key) = path.resolve()?;
    let fields = state.field_sets().resolve(query.fields.as_deref())?;

    let entries = state.entries().list_entries(&key).await?;
    render(&fields, &OrderEntryListView::from(entries.as_slice()))
}

/// Add a product to the cart.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    Path(path): Path<CartPath>,
    Query(query): Query<FieldsQuery>,
    body: std::result::Result<Json<OrderEntryRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let (site, key) = path.resolve()?;
    let fields = state.field_sets().resolve(query.fields.as_deref())?;
    let request = entry_request(body)?;

    let result = state.entries().create(&site, &key, request).await?;
    add_breadcrumb("cart", "Added cart entry", &[("cart", key.to_string())]);
    render(&fields, &CartModificationView::from(&result))
}

/// Get a single cart entry.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(path): Path<EntryPath>,
    Query(query): Query<FieldsQuery>,
) -> Result<Json<Value>> {
    let (_, key, entry_number) = path.resolve()?;
    let fields = state.field_sets().resolve(query.fields.as_deref())?;

    let entry = state.entries().get_entry(&key, entry_number).await?;
    render(&fields, &OrderEntryView::from(&entry))
}

/// Replace the quantity and pickup location of an entry.
#[instrument(skip(state, body))]
pub async fn replace(
    State(state): State<AppState>,
    Path(path): Path<EntryPath>,
    Query(query): Query<FieldsQuery>,
    body: std::result::Result<Json<OrderEntryRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let (site, key, entry_number) = path.resolve()?;
    let fields = state.field_sets().resolve(query.fields.as_deref())?;
    let request = entry_request(body)?;

    let result = state
        .entries()
        .replace(&site, &key, entry_number, request)
        .await?;
    add_breadcrumb(
        "cart",
        "Replaced cart entry",
        &[("cart", key.to_string()), ("entry", entry_number.to_string())],
    );
    render(&fields, &CartModificationView::from(&result))
}

/// Update the quantity and pickup location of an entry.
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    Path(path): Path<EntryPath>,
    Query(query): Query<FieldsQuery>,
    body: std::result::Result<Json<OrderEntryRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let (site, key, entry_number) = path.resolve()?;
    let fields = state.field_sets().resolve(query.fields.as_deref())?;
    let request = entry_request(body)?;

    let result = state
        .entries()
        .update(&site, &key, entry_number, request)
        .await?;
    add_breadcrumb(
        "cart",
        "Updated cart entry",
        &[("cart", key.to_string()), ("entry", entry_number.to_string())],
    );
    render(&fields, &CartModificationView::from(&result))
}

/// Remove an entry from the cart.
#[instrument(skip(state))]
pub async fn delete(State(state): State<AppState>, Path(path): Path<EntryPath>) -> Result<StatusCode> {
    let (_, key, entry_number) = path.resolve()?;

    state.entries().delete(&key, entry_number).await?;
    add_breadcrumb(
        "cart",
        "Removed cart entry",
        &[("cart", key.to_string()), ("entry", entry_number.to_string())],
    );
    Ok(StatusCode::OK)
}
