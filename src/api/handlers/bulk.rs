use axum::{
    extract::{Extension, Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    error::{AppError, Result},
    service::bulk::{ensure_xlsx_filename, BulkOperation, BulkUserResult, Sheet, XLSX_CONTENT_TYPE},
};

/// Pull the `file` field out of a multipart upload and decode it.
async fn read_upload(mut multipart: Multipart) -> Result<Sheet> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return Err(AppError::InvalidFile(format!("could not read upload: {}", e)));
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("").to_string();
        ensure_xlsx_filename(&filename)?;

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidFile(format!("could not read upload: {}", e)))?;

        return Sheet::from_xlsx(&data);
    }

    Err(AppError::InvalidFile("upload an .xlsx file".to_string()))
}

pub async fn bulk_create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<BulkUserResult>> {
    let sheet = read_upload(multipart).await?;

    let result = state.service_context.bulk_service
        .bulk_create(&sheet)
        .await?;

    Ok(Json(result))
}

pub async fn bulk_delete(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    multipart: Multipart,
) -> Result<Json<BulkUserResult>> {
    let sheet = read_upload(multipart).await?;

    let result = state.service_context.bulk_service
        .bulk_delete(&sheet, &current.user)
        .await?;

    Ok(Json(result))
}

fn template_response(operation: BulkOperation) -> Result<impl IntoResponse> {
    let bytes = operation.template()?;
    let disposition = format!("attachment; filename=\"{}\"", operation.template_filename());

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

pub async fn create_template() -> Result<impl IntoResponse> {
    template_response(BulkOperation::Create)
}

pub async fn delete_template() -> Result<impl IntoResponse> {
    template_response(BulkOperation::Delete)
}
