use actix_multipart::Multipart;
use actix_web::web;
use futures_util::TryStreamExt;

use crate::api::error::UploadError;
use crate::modules::image_upload::{
    model::{UploadForm, UploadedFile},
    repository::UploadSink,
    schema::UploadResult,
    service::ImageUploadService,
};

/// Drain a multipart stream into memory.
///
/// Parts with a filename become files, everything else a text field. Parts
/// whose filename is empty are file inputs left blank and are dropped.
///
/// At most `ceiling` bytes of a part are buffered. The rest is drained and only
/// counted, so an oversized file keeps its real size.
pub async fn read_form(mut payload: Multipart, ceiling: u64) -> Result<UploadForm, UploadError> {
    let ceiling = usize::try_from(ceiling).unwrap_or(usize::MAX);
    let mut form = UploadForm::default();

    while let Some(mut field) =
        payload.try_next().await.map_err(|e| UploadError::multipart(e.to_string()))?
    {
        let (name, filename) = match field.content_disposition() {
            Some(cd) => (
                cd.get_name().unwrap_or_default().to_string(),
                cd.get_filename().map(str::to_string),
            ),
            None => (String::new(), None),
        };

        let mut bytes = Vec::new();
        let mut size: u64 = 0;
        while let Some(chunk) =
            field.try_next().await.map_err(|e| UploadError::multipart(e.to_string()))?
        {
            size += chunk.len() as u64;
            let room = ceiling.saturating_sub(bytes.len());
            bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
        }

        if name.is_empty() {
            continue;
        }

        match filename {
            Some(filename) if filename.is_empty() => {}
            Some(filename) => {
                form.push_file(&name, UploadedFile::truncated(&filename, bytes, size))
            }
            None => form.push_text(&name, String::from_utf8_lossy(&bytes).into_owned()),
        }
    }

    Ok(form)
}

/// Upload images handler
pub async fn upload_images<S>(
    payload: Multipart,
    service: web::Data<ImageUploadService<S>>,
) -> UploadResult
where
    S: UploadSink + Send + Sync + 'static,
{
    let form = match read_form(payload, service.config().max_part_size).await {
        Ok(form) => form,
        Err(e) => {
            log::warn!("Malformed upload request: {}", e);
            return UploadResult::from(e);
        }
    };

    service.process_upload(&form).await
}
