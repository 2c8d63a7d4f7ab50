//! HTTP surface for the relay.
//!
//! Every route is a `GET` (apart from the body-carrying insert) that maps onto exactly one Tigris
//! call:
//!
//! - `GET /` – Run the client-credentials exchange and report the token lifetime.
//! - `GET /create-update-collection/:name` – Create or update a collection with the fixed
//!   `id`/`name`/`balance` schema.
//! - `GET /list-collection/:name` – Describe a collection.
//! - `GET /insert-documents/:collection` – Insert the four demo documents.
//! - `POST /insert-documents/:collection` – Insert `{ "documents": [...] }` from the request body.
//! - `GET /read-document/:collection/:field/:value` – Read documents where `field == value`.
//! - `GET /update-document/:collection/:id/:field/:value` – `$set` one field on document `id`.
//! - `GET /search-documents/:collection?query=` – Full-text search; `query` is required.
//! - `GET /delete-document/:collection/:id` – Delete documents.
//! - `GET /delete-collection/:collection` – Drop a collection.
//! - `GET /create-database/:name` – Create a database branch.
//! - `GET /metrics` – Relay counters.
//! - `GET /commands` – Machine-readable route catalog.
//!
//! Remote responses are returned with the remote status and JSON body untouched.

use crate::config::PayloadMode;
use crate::metrics::MetricsSnapshot;
use crate::relay::{RelayApi, RelayError};
use crate::tigris::{Operation, RemoteResponse, TigrisError, payloads};
use crate::token::AuthError;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

struct AppState<S> {
    service: Arc<S>,
    payload_mode: PayloadMode,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            payload_mode: self.payload_mode,
        }
    }
}

/// Build the HTTP router exposing the relay routes.
pub fn create_router<S>(service: Arc<S>, payload_mode: PayloadMode) -> Router
where
    S: RelayApi + 'static,
{
    Router::new()
        .route("/", get(authenticate::<S>))
        .route(
            "/create-update-collection/:name",
            get(create_update_collection::<S>),
        )
        .route("/list-collection/:name", get(list_collection::<S>))
        .route(
            "/insert-documents/:collection",
            get(insert_demo_documents::<S>).post(insert_documents::<S>),
        )
        .route(
            "/read-document/:collection/:field/:value",
            get(read_document::<S>),
        )
        .route(
            "/update-document/:collection/:id/:field/:value",
            get(update_document::<S>),
        )
        .route("/search-documents/:collection", get(search_documents::<S>))
        .route("/delete-document/:collection/:id", get(delete_document::<S>))
        .route("/delete-collection/:collection", get(delete_collection::<S>))
        .route("/create-database/:name", get(create_database::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .with_state(AppState {
            service,
            payload_mode,
        })
}

impl IntoResponse for RemoteResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

type RelayResult = Result<RemoteResponse, AppError>;

/// Exchange client credentials for a fresh token and report how long it lasts.
async fn authenticate<S>(State(state): State<AppState<S>>) -> Result<String, AppError>
where
    S: RelayApi,
{
    let session = state.service.authenticate().await?;
    Ok(format!(
        "Your token is good for: {} seconds!",
        session.expires_in
    ))
}

async fn create_update_collection<S>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> RelayResult
where
    S: RelayApi,
{
    let schema = payloads::collection_schema(&name);
    relay(
        &state,
        Operation::CreateOrUpdateCollection {
            collection: name,
            schema,
        },
    )
    .await
}

async fn list_collection<S>(State(state): State<AppState<S>>, Path(name): Path<String>) -> RelayResult
where
    S: RelayApi,
{
    relay(&state, Operation::DescribeCollection { collection: name }).await
}

async fn insert_demo_documents<S>(
    State(state): State<AppState<S>>,
    Path(collection): Path<String>,
) -> RelayResult
where
    S: RelayApi,
{
    relay(
        &state,
        Operation::InsertDocuments {
            collection,
            documents: payloads::demo_documents(),
        },
    )
    .await
}

/// Request body for `POST /insert-documents/:collection`.
#[derive(Deserialize)]
struct InsertDocumentsRequest {
    /// Documents forwarded to Tigris untouched.
    documents: Vec<Value>,
}

async fn insert_documents<S>(
    State(state): State<AppState<S>>,
    Path(collection): Path<String>,
    Json(request): Json<InsertDocumentsRequest>,
) -> RelayResult
where
    S: RelayApi,
{
    relay(
        &state,
        Operation::InsertDocuments {
            collection,
            documents: request.documents,
        },
    )
    .await
}

async fn read_document<S>(
    State(state): State<AppState<S>>,
    Path((collection, field, value)): Path<(String, String, String)>,
) -> RelayResult
where
    S: RelayApi,
{
    relay(
        &state,
        Operation::ReadDocuments {
            collection,
            body: payloads::read_body(&field, &value),
        },
    )
    .await
}

/// Update one field of one document; `balance` values are sent as numbers.
async fn update_document<S>(
    State(state): State<AppState<S>>,
    Path((collection, id, field, value)): Path<(String, String, String, String)>,
) -> RelayResult
where
    S: RelayApi,
{
    let id = payloads::parse_document_id(&id)?;
    let value = payloads::coerce_field_value(&field, &value)?;
    relay(
        &state,
        Operation::UpdateDocuments {
            collection,
            body: payloads::update_body(id, &field, value),
        },
    )
    .await
}

#[derive(Deserialize)]
struct SearchParams {
    query: String,
}

async fn search_documents<S>(
    State(state): State<AppState<S>>,
    Path(collection): Path<String>,
    params: Option<Query<SearchParams>>,
) -> RelayResult
where
    S: RelayApi,
{
    let Query(params) = params.ok_or(payloads::CoercionError::MissingParameter("query"))?;
    let body = match state.payload_mode {
        PayloadMode::Demo => {
            tracing::debug!(
                query = ?params.query,
                "Demo payload mode ignores the search query"
            );
            payloads::demo_search_body()
        }
        PayloadMode::Parameterized => {
            payloads::search_body(&params.query, &["name"], None)
        }
    };
    relay(&state, Operation::SearchDocuments { collection, body }).await
}

async fn delete_document<S>(
    State(state): State<AppState<S>>,
    Path((collection, id)): Path<(String, String)>,
) -> RelayResult
where
    S: RelayApi,
{
    let id = payloads::parse_document_id(&id)?;
    let filter = match state.payload_mode {
        PayloadMode::Demo => {
            tracing::debug!(id, "Demo payload mode ignores the document id");
            payloads::demo_delete_filter()
        }
        PayloadMode::Parameterized => payloads::id_filter(id),
    };
    relay(&state, Operation::DeleteDocuments { collection, filter }).await
}

async fn delete_collection<S>(
    State(state): State<AppState<S>>,
    Path(collection): Path<String>,
) -> RelayResult
where
    S: RelayApi,
{
    relay(&state, Operation::DropCollection { collection }).await
}

async fn create_database<S>(State(state): State<AppState<S>>, Path(name): Path<String>) -> RelayResult
where
    S: RelayApi,
{
    relay(&state, Operation::CreateBranch { branch: name }).await
}

async fn relay<S>(state: &AppState<S>, operation: Operation) -> RelayResult
where
    S: RelayApi,
{
    Ok(state.service.relay(operation).await?)
}

/// Return the relay counters.
async fn get_metrics<S>(State(state): State<AppState<S>>) -> Json<MetricsSnapshot>
where
    S: RelayApi,
{
    Json(state.service.metrics_snapshot())
}

/// Descriptor for a single route in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported routes for discovery by tools and hosts.
async fn get_commands() -> Json<CommandsResponse> {
    let route = |name, method, path, description| CommandDescriptor {
        name,
        method,
        path,
        description,
        request_example: None,
    };

    Json(CommandsResponse {
        commands: vec![
            route(
                "authenticate",
                "GET",
                "/",
                "Exchange client credentials for a bearer token used by every other route.",
            ),
            route(
                "create_update_collection",
                "GET",
                "/create-update-collection/{name}",
                "Create or update a collection with the id/name/balance schema.",
            ),
            route(
                "list_collection",
                "GET",
                "/list-collection/{name}",
                "Describe a collection.",
            ),
            route(
                "insert_demo_documents",
                "GET",
                "/insert-documents/{collection}",
                "Insert the four quickstart documents.",
            ),
            CommandDescriptor {
                name: "insert_documents",
                method: "POST",
                path: "/insert-documents/{collection}",
                description: "Insert the documents supplied in the request body.",
                request_example: Some(json!({
                    "documents": [{ "name": "Ada Lovelace", "balance": 1815.12 }]
                })),
            },
            route(
                "read_document",
                "GET",
                "/read-document/{collection}/{field}/{value}",
                "Read documents whose field equals value.",
            ),
            route(
                "update_document",
                "GET",
                "/update-document/{collection}/{id}/{field}/{value}",
                "Set one field on a document; balance values are sent as numbers.",
            ),
            route(
                "search_documents",
                "GET",
                "/search-documents/{collection}?query={q}",
                "Full-text search over name; query is required (422 without it). Demo payload mode sends the quickstart query instead.",
            ),
            route(
                "delete_document",
                "GET",
                "/delete-document/{collection}/{id}",
                "Delete a document. Demo payload mode deletes ids 0 and 4 instead.",
            ),
            route(
                "delete_collection",
                "GET",
                "/delete-collection/{collection}",
                "Drop a collection.",
            ),
            route(
                "create_database",
                "GET",
                "/create-database/{name}",
                "Create a database branch.",
            ),
            route(
                "metrics",
                "GET",
                "/metrics",
                "Relay counters for authentications and forwarded operations.",
            ),
        ],
    })
}

struct AppError(RelayError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.0 {
            RelayError::Auth(AuthError::Rejected { status, body }) => (status, body).into_response(),
            RelayError::Auth(err @ AuthError::MalformedResponse(_)) => {
                (StatusCode::BAD_GATEWAY, err.to_string()).into_response()
            }
            RelayError::Remote(TigrisError::UndecodableBody { status, body }) => {
                (status, body).into_response()
            }
            RelayError::Coercion(err) => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()).into_response()
            }
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response(),
        }
    }
}

impl<E> From<E> for AppError
where
    E: Into<RelayError>,
{
    fn from(inner: E) -> Self {
        Self(inner.into())
    }
}
