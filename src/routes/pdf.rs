//! PDF editing endpoints
//!
//! Every endpoint takes a multipart form, stages the uploads in a fresh
//! workspace and runs one document operation on the blocking pool:
//! - POST /pdf/add-text, /pdf/add-image
//! - POST /pdf/delete-pages, /pdf/reorder-pages, /pdf/extract-pages
//! - POST /pdf/merge
//! - POST /pdf/redact-text, /pdf/replace-text, /pdf/replace-all
//! - POST /pdf/search-text, /pdf/get-info (JSON)

use std::path::{Path, PathBuf};

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    response::Response,
    routing::post,
    Json, Router,
};

use crate::document::{
    DocumentInfo, DocumentOperationService, ImageInsertion, InstanceReplace, OperationError,
    OperationResult, ReplaceAll, Rgb, SearchOptions, SearchReport, TextAlign, TextInsertion,
    TextStyle,
};
use crate::engine::PdfEditEngine;
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::workspace::Workspace;

use super::form::{parse_int_list, parse_rect, parse_str_list, FormData, Upload};
use super::response::{pdf_response, PdfFile};

type Service = DocumentOperationService<PdfEditEngine>;

/// Create the PDF router
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/add-text", post(add_text))
        .route("/add-image", post(add_image))
        .route("/delete-pages", post(delete_pages))
        .route("/reorder-pages", post(reorder_pages))
        .route("/extract-pages", post(extract_pages))
        .route("/merge", post(merge))
        .route("/redact-text", post(redact_text))
        .route("/replace-text", post(replace_text))
        .route("/replace-all", post(replace_all))
        .route("/search-text", post(search_text))
        .route("/get-info", post(get_info))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

/// Workspace with the form's `pdf_file` staged in it
async fn stage_pdf(state: &AppState, form: &FormData) -> Result<(Workspace, PathBuf, String)> {
    let upload = form.file("pdf_file")?;
    let workspace = state.workspace()?;
    let path = workspace.stage(&upload.filename, &upload.bytes).await?;
    Ok((workspace, path, upload.stem().to_string()))
}

/// Run an operation that writes an output document and send that document
async fn edit<F>(
    state: &AppState,
    workspace: Workspace,
    operation: &'static str,
    stem: String,
    op: F,
) -> Result<Response>
where
    F: FnOnce(&Service, &Path) -> OperationResult + Send + 'static,
{
    let file = state
        .run_blocking(workspace, move |service, ws| {
            let output = ws.output_path(operation);
            let summary = op(service, output.as_path()).into_result()?;
            PdfFile::read(summary)
        })
        .await??;

    tracing::info!(
        operation,
        bytes = file.bytes.len(),
        "{}",
        file.summary.message
    );
    Ok(pdf_response(file, operation, &stem))
}

fn text_style(form: &FormData) -> Result<TextStyle> {
    Ok(TextStyle {
        font_name: form.text_or("font_name", "helv").to_string(),
        font_size: form.float_or("font_size", 12.0)?,
        color: form.color("color", Rgb::BLACK)?,
    })
}

/// POST /pdf/add-text
async fn add_text(State(state): State<AppState>, multipart: Multipart) -> Result<Response> {
    let form = FormData::from_multipart(multipart).await?;
    let request = TextInsertion {
        page: form.int_or("page", 0)?,
        x: form.float("x")?,
        y: form.float("y")?,
        text: form.required_raw("text")?.to_string(),
        style: text_style(&form)?,
    };
    let (workspace, input, stem) = stage_pdf(&state, &form).await?;

    edit(&state, workspace, "add-text", stem, move |service, output| {
        service.add_text(&input, output, &request)
    })
    .await
}

/// POST /pdf/add-image
async fn add_image(State(state): State<AppState>, multipart: Multipart) -> Result<Response> {
    let form = FormData::from_multipart(multipart).await?;
    let image = form.file("image_file")?;
    let page = form.int_or("page", 0)?;
    let (x, y) = (form.float("x")?, form.float("y")?);
    let (width, height) = (form.opt_float("width")?, form.opt_float("height")?);

    let (workspace, input, stem) = stage_pdf(&state, &form).await?;
    let request = ImageInsertion {
        image_path: workspace.stage(&image.filename, &image.bytes).await?,
        page,
        x,
        y,
        width,
        height,
    };

    edit(&state, workspace, "add-image", stem, move |service, output| {
        service.add_image(&input, output, &request)
    })
    .await
}

/// POST /pdf/delete-pages
async fn delete_pages(State(state): State<AppState>, multipart: Multipart) -> Result<Response> {
    let form = FormData::from_multipart(multipart).await?;
    let pages = parse_int_list(form.required("page_numbers")?)?;
    let (workspace, input, stem) = stage_pdf(&state, &form).await?;

    edit(&state, workspace, "delete", stem, move |service, output| {
        service.delete_pages(&input, output, &pages)
    })
    .await
}

/// POST /pdf/reorder-pages
async fn reorder_pages(State(state): State<AppState>, multipart: Multipart) -> Result<Response> {
    let form = FormData::from_multipart(multipart).await?;
    let order = parse_int_list(form.required("new_order")?)?;
    let (workspace, input, stem) = stage_pdf(&state, &form).await?;

    edit(&state, workspace, "reorder", stem, move |service, output| {
        service.reorder_pages(&input, output, &order)
    })
    .await
}

/// POST /pdf/extract-pages
async fn extract_pages(State(state): State<AppState>, multipart: Multipart) -> Result<Response> {
    let form = FormData::from_multipart(multipart).await?;
    let pages = parse_int_list(form.required("page_numbers")?)?;
    let (workspace, input, stem) = stage_pdf(&state, &form).await?;

    edit(&state, workspace, "extract", stem, move |service, output| {
        service.extract_pages(&input, output, &pages)
    })
    .await
}

/// POST /pdf/merge
async fn merge(State(state): State<AppState>, multipart: Multipart) -> Result<Response> {
    let form = FormData::from_multipart(multipart).await?;
    let uploads: &[Upload] = form.files("files");
    if uploads.len() < 2 {
        return Err(AppError::BadRequest(format!(
            "At least two PDF files are required, got {}",
            uploads.len()
        )));
    }

    let workspace = state.workspace()?;
    let mut inputs = Vec::with_capacity(uploads.len());
    for upload in uploads {
        inputs.push(workspace.stage(&upload.filename, &upload.bytes).await?);
    }
    let stem = uploads[0].stem().to_string();

    edit(&state, workspace, "merge", stem, move |service, output| {
        service.merge(&inputs, output)
    })
    .await
}

/// POST /pdf/redact-text
async fn redact_text(State(state): State<AppState>, multipart: Multipart) -> Result<Response> {
    let form = FormData::from_multipart(multipart).await?;
    let targets = parse_str_list(form.required("targets")?);
    let fill = form.color("fill", Rgb::WHITE)?;
    let (workspace, input, stem) = stage_pdf(&state, &form).await?;

    edit(&state, workspace, "redact", stem, move |service, output| {
        service.redact_text(&input, output, &targets, fill)
    })
    .await
}

/// POST /pdf/replace-text
async fn replace_text(State(state): State<AppState>, multipart: Multipart) -> Result<Response> {
    let form = FormData::from_multipart(multipart).await?;
    let request = InstanceReplace {
        page: form.int("page")?,
        rect: parse_rect(form.required("rect")?)?,
        replacement: form.raw("replacement").map(str::to_string),
        style: text_style(&form)?,
        align: TextAlign::try_from(form.int_or("align", 0)?)?,
        fill: form.color("fill", Rgb::WHITE)?,
    };
    let (workspace, input, stem) = stage_pdf(&state, &form).await?;

    edit(&state, workspace, "replace", stem, move |service, output| {
        service.replace_text_instance(&input, output, &request)
    })
    .await
}

/// POST /pdf/replace-all
async fn replace_all(State(state): State<AppState>, multipart: Multipart) -> Result<Response> {
    let form = FormData::from_multipart(multipart).await?;
    let replacement = form
        .raw("replacement")
        .ok_or_else(|| OperationError::malformed("missing required field 'replacement'"))?;
    let request = ReplaceAll {
        search_term: form.required_raw("search_term")?.to_string(),
        replacement: replacement.to_string(),
        page: form.opt_int("page")?,
        font_size: form.opt_float("font_size")?,
        font_name: form.text_or("font_name", "helv").to_string(),
        color: form.color("color", Rgb::BLACK)?,
    };
    let (workspace, input, stem) = stage_pdf(&state, &form).await?;

    edit(&state, workspace, "replace-all", stem, move |service, output| {
        service.replace_text(&input, output, &request)
    })
    .await
}

/// POST /pdf/search-text
async fn search_text(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<OperationResult<SearchReport>>> {
    let form = FormData::from_multipart(multipart).await?;
    let query = form.required_raw("query")?.to_string();
    let max_hits = match form.opt_int("max_hits")? {
        None => 0,
        Some(n) => usize::try_from(n)
            .map_err(|_| OperationError::malformed(format!("max_hits must not be negative, got {}", n)))?,
    };
    let options = SearchOptions {
        case_sensitive: form.flag("case_sensitive")?,
        whole_word: form.flag("whole_word")?,
        max_hits,
        include_context: form.flag("include_context")?,
    };
    let (workspace, input, _) = stage_pdf(&state, &form).await?;

    let report = state
        .run_blocking(workspace, move |service, _| {
            service.search_text(&input, &query, &options).into_result()
        })
        .await??;

    tracing::info!(query = %report.query, matches = report.match_count, "Search complete");
    Ok(Json(OperationResult::success(report)))
}

/// POST /pdf/get-info
async fn get_info(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<OperationResult<DocumentInfo>>> {
    let form = FormData::from_multipart(multipart).await?;
    let (workspace, input, _) = stage_pdf(&state, &form).await?;

    let info = state
        .run_blocking(workspace, move |service, _| service.get_info(&input).into_result())
        .await??;
    Ok(Json(OperationResult::success(info)))
}
