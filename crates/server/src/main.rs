// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod session;

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, Path, Query, State as AxumState,
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use clinica_api::{
    ApiError, AuthenticationService, CreatePatientRequest, CreateTransactionRequest,
    ListResponse, LoginRequest, LoginResponse, MAX_PHOTO_BYTES, PUBLIC_PREFIX, PatientQuery,
    PatientResponse, PhotoStore, PhotoUpload, PhotoUploadResponse, TransactionQuery,
    TransactionResponse, UpdatePatientRequest, UpdateTransactionRequest, cancel_transaction,
    create_patient, create_transaction, deactivate_patient, get_patient, get_patient_photo,
    get_transaction, list_patients, list_transactions, login, update_patient, update_transaction,
    upload_patient_photo,
};
use clinica_domain::{AuditStamp, Tz, parse_timezone};
use clinica_persistence::Persistence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{debug, error, info, warn};

use crate::session::SessionActor;

/// Request body ceiling for the photo upload route; leaves room for the
/// multipart framing around a maximum-size photo.
const UPLOAD_BODY_LIMIT: usize = MAX_PHOTO_BYTES + 1024 * 1024;

/// Clinica Server - HTTP backend for patient records and payments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// `SQLite` database path, or a `mysql://` URL. Omit for an in-memory database.
    #[arg(short, long, env = "DATABASE_URL")]
    database: Option<String>,

    /// Secret used to sign session tokens.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// Port to bind the server to
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(long, env = "BIND_ADDRESS", default_value = "127.0.0.1")]
    bind_address: String,

    /// IANA timezone used for formatted dates in responses
    #[arg(long, env = "TIMEZONE", default_value = "America/Chicago")]
    timezone: String,

    /// Directory patient photos are stored in
    #[arg(long, env = "PHOTO_DIR", default_value = "./fotosPaciente")]
    photo_dir: String,

    /// Login code of an admin user to create at startup if missing
    #[arg(long, env = "SEED_ADMIN_LOGIN", requires = "seed_admin_password")]
    seed_admin_login: Option<String>,

    /// Secret for the seeded admin user
    #[arg(long, env = "SEED_ADMIN_PASSWORD", hide_env_values = true)]
    seed_admin_password: Option<String>,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The persistence adapter. Handlers hold the lock for one API call.
    persistence: Arc<Mutex<Persistence>>,
    /// Token issuing and validation.
    auth: Arc<AuthenticationService>,
    /// Patient photo storage.
    photos: PhotoStore,
    /// Timezone for formatted dates.
    tz: Tz,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error message.
    error: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl HttpError {
    /// Builds the error for a request axum could not decode.
    ///
    /// `413 Payload Too Large` is kept; every other decoding failure is a
    /// `400 Bad Request`.
    fn malformed(status: StatusCode, detail: String) -> Self {
        warn!(%status, %detail, "Rejected malformed request");
        let status = if status == StatusCode::PAYLOAD_TOO_LARGE {
            status
        } else {
            StatusCode::BAD_REQUEST
        };
        Self {
            status,
            message: detail,
        }
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self::malformed(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for HttpError {
    fn from(rejection: QueryRejection) -> Self {
        Self::malformed(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for HttpError {
    fn from(rejection: PathRejection) -> Self {
        Self::malformed(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for HttpError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::malformed(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartError> for HttpError {
    fn from(err: MultipartError) -> Self {
        Self::malformed(err.status(), format!("Invalid multipart body: {}", err.body_text()))
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status = match &err {
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::ValidationError { .. } | ApiError::InvalidState(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Handler for POST `/autenticacion/login`.
async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    req: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, HttpError> {
    let Json(req) = req?;
    info!(login_code = %req.codigo_usuario, "Handling login request");

    let mut persistence = app_state.persistence.lock().await;
    let response = login(&mut persistence, &app_state.auth, &req)?;
    Ok(Json(response))
}

/// Handler for POST `/agendamiento/pacientes`.
async fn handle_create_patient(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    req: Result<Json<CreatePatientRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PatientResponse>), HttpError> {
    let Json(req) = req?;
    info!(
        actor = %actor.login_code,
        identification = %req.numero_identificacion,
        "Handling create_patient request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response = create_patient(&mut persistence, &actor, req, app_state.tz)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/agendamiento/pacientes`.
async fn handle_list_patients(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    query: Result<Query<PatientQuery>, QueryRejection>,
) -> Result<Json<ListResponse<PatientResponse>>, HttpError> {
    let Query(query) = query?;
    debug!(actor = %actor.login_code, ?query, "Handling list_patients request");

    let mut persistence = app_state.persistence.lock().await;
    let response = list_patients(&mut persistence, &actor, query, app_state.tz)?;
    Ok(Json(response))
}

/// Handler for GET `/agendamiento/pacientes/{id}`.
async fn handle_get_patient(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    patient_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<PatientResponse>, HttpError> {
    let Path(patient_id) = patient_id?;
    let mut persistence = app_state.persistence.lock().await;
    let response = get_patient(&mut persistence, &actor, patient_id, app_state.tz)?;
    Ok(Json(response))
}

/// Handler for PUT `/agendamiento/pacientes/{id}`.
async fn handle_update_patient(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    patient_id: Result<Path<i64>, PathRejection>,
    req: Result<Json<UpdatePatientRequest>, JsonRejection>,
) -> Result<Json<PatientResponse>, HttpError> {
    let Path(patient_id) = patient_id?;
    let Json(req) = req?;
    info!(actor = %actor.login_code, patient_id, "Handling update_patient request");

    let mut persistence = app_state.persistence.lock().await;
    let response = update_patient(&mut persistence, &actor, patient_id, req, app_state.tz)?;
    Ok(Json(response))
}

/// Handler for DELETE `/agendamiento/pacientes/{id}`.
///
/// Soft-deletes the patient and returns the deactivated record.
async fn handle_deactivate_patient(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    patient_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<PatientResponse>, HttpError> {
    let Path(patient_id) = patient_id?;
    info!(actor = %actor.login_code, patient_id, "Handling deactivate_patient request");

    let mut persistence = app_state.persistence.lock().await;
    let response = deactivate_patient(&mut persistence, &actor, patient_id, app_state.tz)?;
    Ok(Json(response))
}

/// Handler for POST `/agendamiento/pacientes/{id}/foto`.
///
/// Expects a multipart form with the image in the `foto` field.
async fn handle_upload_photo(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    patient_id: Result<Path<i64>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PhotoUploadResponse>, HttpError> {
    let Path(patient_id) = patient_id?;
    let mut multipart = multipart?;
    info!(actor = %actor.login_code, patient_id, "Handling upload_photo request");

    let upload = read_photo_field(&mut multipart)
        .await?
        .ok_or_else(|| ApiError::validation("foto", "no file was uploaded"))?;

    let mut persistence = app_state.persistence.lock().await;
    let response = upload_patient_photo(
        &mut persistence,
        &app_state.photos,
        &actor,
        patient_id,
        &upload,
    )?;
    Ok(Json(response))
}

/// Reads the `foto` field of a multipart form, skipping any other fields.
async fn read_photo_field(multipart: &mut Multipart) -> Result<Option<PhotoUpload>, HttpError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("foto") {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let original_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?;
        return Ok(Some(PhotoUpload {
            content_type,
            original_name,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

/// Handler for GET `/agendamiento/pacientes/{id}/foto`.
async fn handle_get_photo(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    patient_id: Result<Path<i64>, PathRejection>,
) -> Result<Response, HttpError> {
    let Path(patient_id) = patient_id?;
    let mut persistence = app_state.persistence.lock().await;
    let content = get_patient_photo(&mut persistence, &app_state.photos, &actor, patient_id)?;
    Ok(([(header::CONTENT_TYPE, content.content_type)], content.bytes).into_response())
}

/// Handler for POST `/transacciones`.
async fn handle_create_transaction(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    req: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TransactionResponse>), HttpError> {
    let Json(req) = req?;
    info!(
        actor = %actor.login_code,
        cashier_id = ?req.secuencia_cajero,
        "Handling create_transaction request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response = create_transaction(&mut persistence, &actor, req, app_state.tz)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/transacciones`.
async fn handle_list_transactions(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    query: Result<Query<TransactionQuery>, QueryRejection>,
) -> Result<Json<ListResponse<TransactionResponse>>, HttpError> {
    let Query(query) = query?;
    debug!(actor = %actor.login_code, ?query, "Handling list_transactions request");

    let mut persistence = app_state.persistence.lock().await;
    let response = list_transactions(&mut persistence, &actor, query, app_state.tz)?;
    Ok(Json(response))
}

/// Handler for GET `/transacciones/{id}`.
async fn handle_get_transaction(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    transaction_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<TransactionResponse>, HttpError> {
    let Path(transaction_id) = transaction_id?;
    let mut persistence = app_state.persistence.lock().await;
    let response = get_transaction(&mut persistence, &actor, transaction_id, app_state.tz)?;
    Ok(Json(response))
}

/// Handler for PUT `/transacciones/{id}`.
async fn handle_update_transaction(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    transaction_id: Result<Path<i64>, PathRejection>,
    req: Result<Json<UpdateTransactionRequest>, JsonRejection>,
) -> Result<Json<TransactionResponse>, HttpError> {
    let Path(transaction_id) = transaction_id?;
    let Json(req) = req?;
    info!(
        actor = %actor.login_code,
        transaction_id,
        estado = ?req.estado,
        "Handling update_transaction request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response = update_transaction(
        &mut persistence,
        &actor,
        transaction_id,
        req,
        app_state.tz,
    )?;
    Ok(Json(response))
}

/// Handler for DELETE `/transacciones/{id}`.
///
/// Cancels the transaction and returns it.
async fn handle_cancel_transaction(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    transaction_id: Result<Path<i64>, PathRejection>,
) -> Result<Json<TransactionResponse>, HttpError> {
    let Path(transaction_id) = transaction_id?;
    info!(actor = %actor.login_code, transaction_id, "Handling cancel_transaction request");

    let mut persistence = app_state.persistence.lock().await;
    let response = cancel_transaction(&mut persistence, &actor, transaction_id, app_state.tz)?;
    Ok(Json(response))
}

/// Builds the application router with all routes.
fn build_router(app_state: AppState) -> Router {
    let photo_files = ServeDir::new(app_state.photos.dir());

    Router::new()
        .route("/health", get(|| async { "Servidor OK" }))
        .route("/autenticacion/login", post(handle_login))
        .route(
            "/agendamiento/pacientes",
            post(handle_create_patient).get(handle_list_patients),
        )
        .route(
            "/agendamiento/pacientes/{id}",
            get(handle_get_patient)
                .put(handle_update_patient)
                .delete(handle_deactivate_patient),
        )
        .route(
            "/agendamiento/pacientes/{id}/foto",
            post(handle_upload_photo)
                .get(handle_get_photo)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/transacciones",
            post(handle_create_transaction).get(handle_list_transactions),
        )
        .route(
            "/transacciones/{id}",
            get(handle_get_transaction)
                .put(handle_update_transaction)
                .delete(handle_cancel_transaction),
        )
        .nest_service(PUBLIC_PREFIX, photo_files)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Opens the configured database.
fn open_persistence(database: Option<&str>) -> Result<Persistence, Box<dyn std::error::Error>> {
    match database {
        None => {
            info!("Using in-memory database");
            Ok(Persistence::new_in_memory()?)
        }
        Some(url) if url.starts_with("mysql://") => open_mysql(url),
        Some(path) => {
            info!("Using file-based database at: {}", path);
            Ok(Persistence::new_with_file(path)?)
        }
    }
}

#[cfg(feature = "mysql")]
fn open_mysql(url: &str) -> Result<Persistence, Box<dyn std::error::Error>> {
    info!("Using MySQL database");
    Ok(Persistence::new_with_mysql(url)?)
}

#[cfg(not(feature = "mysql"))]
fn open_mysql(_url: &str) -> Result<Persistence, Box<dyn std::error::Error>> {
    Err("MySQL support is not compiled in; rebuild with the `mysql` feature".into())
}

/// Creates the bootstrap admin user unless the login code is taken.
fn seed_admin(
    persistence: &mut Persistence,
    login_code: &str,
    password: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if persistence.get_user_by_login(login_code)?.is_some() {
        debug!(login_code, "Seed admin already exists");
        return Ok(());
    }
    let user_id = persistence.create_user(
        login_code,
        None,
        password,
        "admin",
        &AuditStamp::now("system"),
    )?;
    info!(login_code, user_id, "Seeded admin user");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Clinica Server");

    if args.jwt_secret.is_empty() {
        return Err("JWT_SECRET must not be empty".into());
    }
    let tz: Tz = parse_timezone(&args.timezone)?;

    let mut persistence: Persistence = open_persistence(args.database.as_deref())?;
    if let (Some(login_code), Some(password)) = (&args.seed_admin_login, &args.seed_admin_password)
    {
        seed_admin(&mut persistence, login_code, password)?;
    }

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        auth: Arc::new(AuthenticationService::new(&args.jwt_secret)),
        photos: PhotoStore::new(&args.photo_dir)?,
        tz,
    };

    let app: Router = build_router(app_state);

    let addr: std::net::SocketAddr = format!("{}:{}", args.bind_address, args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
