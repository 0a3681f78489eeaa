//! Asset upload, listing, download, and deletion endpoints.

use axum::Json;
use axum::body::Body;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::BytesMut;

use shutter_core::{Asset, AssetPage};
use shutter_service::AssetError;

use crate::error::ServerError;

use super::AppState;
use super::schemas::{DeletedResponse, ErrorResponse, ListParams, UploadForm};

const DEFAULT_MIME: &str = "application/octet-stream";
const CACHE_FOREVER: &str = "public, max-age=31536000, immutable";

fn multipart_error(e: &MultipartError) -> ServerError {
    ServerError::Request {
        status: e.status(),
        message: e.body_text(),
    }
}

/// `POST /api/assets` -- upload a new asset.
#[utoipa::path(
    post,
    path = "/api/assets",
    tag = "Assets",
    summary = "Upload asset",
    description = "Stores the first multipart part that carries a filename. The part's content type is recorded as the asset's MIME type.",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Asset stored", body = Asset),
        (status = 400, description = "No file part in the upload", body = ErrorResponse),
        (status = 413, description = "Upload exceeds the size limit", body = ErrorResponse),
        (status = 415, description = "Content type not accepted", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    )
)]
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ServerError> {
    let mut multipart = multipart.map_err(|e| ServerError::Request {
        status: e.status(),
        message: e.body_text(),
    })?;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        let Some(filename) = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
        else {
            continue;
        };
        let mime = field.content_type().unwrap_or(DEFAULT_MIME).to_owned();

        // Reject on type before reading, and on size as soon as the limit is passed.
        state.service.check_upload(&mime, 0)?;
        let mut data = BytesMut::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(&e))? {
            state
                .service
                .check_upload(&mime, (data.len() + chunk.len()) as u64)?;
            data.extend_from_slice(&chunk);
        }

        let asset = state.service.create(&filename, &mime, data.freeze()).await?;
        return Ok((StatusCode::CREATED, Json(asset)));
    }

    Err(AssetError::BadRequest("no file part in upload".into()).into())
}

/// `GET /api/assets` -- list assets, newest first.
#[utoipa::path(
    get,
    path = "/api/assets",
    tag = "Assets",
    summary = "List assets",
    description = "Returns a page of asset records ordered newest first, with the total number of assets.",
    params(ListParams),
    responses(
        (status = 200, description = "A page of assets", body = AssetPage),
        (status = 400, description = "Malformed query string", body = ErrorResponse),
        (status = 500, description = "Index unavailable", body = ErrorResponse),
    )
)]
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<AssetPage>, ServerError> {
    let Query(params) = params.map_err(|e| ServerError::Request {
        status: StatusCode::BAD_REQUEST,
        message: e.body_text(),
    })?;

    let page = state.service.list(params.limit, params.offset).await?;
    Ok(Json(page))
}

/// `GET /api/assets/{id}` -- download an asset's bytes.
#[utoipa::path(
    get,
    path = "/api/assets/{id}",
    tag = "Assets",
    summary = "Download asset",
    description = "Streams the stored bytes with the recorded content type. Responses are immutable and cacheable indefinitely.",
    params(
        ("id" = String, Path, description = "Asset id"),
    ),
    responses(
        (status = 200, description = "Asset bytes", content_type = "application/octet-stream"),
        (status = 404, description = "Asset not found", body = ErrorResponse),
    )
)]
pub async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ServerError> {
    let content = state.service.get(&id).await?;
    let asset = content.asset;

    let mut response = Body::from_stream(content.stream).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&asset.mime).unwrap_or(HeaderValue::from_static(DEFAULT_MIME)),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(asset.size));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_FOREVER));
    headers.insert(
        header::CONTENT_DISPOSITION,
        content_disposition(&asset.filename),
    );

    Ok(response)
}

/// `DELETE /api/assets/{id}` -- delete an asset.
#[utoipa::path(
    delete,
    path = "/api/assets/{id}",
    tag = "Assets",
    summary = "Delete asset",
    description = "Removes the asset's record and bytes.",
    params(
        ("id" = String, Path, description = "Asset id"),
    ),
    responses(
        (status = 200, description = "Asset deleted", body = DeletedResponse),
        (status = 404, description = "Asset not found", body = ErrorResponse),
        (status = 500, description = "Bytes could not be removed", body = ErrorResponse),
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ServerError> {
    let asset = state.service.delete(&id).await?;
    Ok(Json(DeletedResponse { deleted: asset.id }))
}

/// `inline; filename="..."` with anything outside printable ASCII, quotes,
/// and backslashes replaced by `_`.
fn content_disposition(filename: &str) -> HeaderValue {
    let safe: String = filename
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() || c == ' ') && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    HeaderValue::from_str(&format!("inline; filename=\"{safe}\""))
        .unwrap_or(HeaderValue::from_static("inline"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_keeps_plain_names() {
        assert_eq!(
            content_disposition("test-image-1700000000000.jpg"),
            "inline; filename=\"test-image-1700000000000.jpg\""
        );
        assert_eq!(
            content_disposition("holiday photo.png"),
            "inline; filename=\"holiday photo.png\""
        );
    }

    #[test]
    fn disposition_escapes_unsafe_characters() {
        assert_eq!(
            content_disposition("a\"b\\c\r\nd.jpg"),
            "inline; filename=\"a_b_c__d.jpg\""
        );
        assert_eq!(
            content_disposition("café.jpg"),
            "inline; filename=\"caf_.jpg\""
        );
    }
}
