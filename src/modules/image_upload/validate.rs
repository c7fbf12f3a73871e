use std::io::Read;

use crate::api::error::UploadError;
use crate::modules::image_upload::model::{UploadConfig, UploadedFile};
use crate::modules::image_upload::naming::extension_of;

/// Bytes inspected when sniffing content.
pub const SNIFF_LEN: usize = 512;

/// Media types an upload may sniff as, whatever extensions are configured.
pub const ALLOWED_MEDIA_TYPES: [&str; 6] =
    ["image/jpeg", "image/png", "image/webp", "image/gif", "image/bmp", "image/svg+xml"];

pub fn is_allowed_media_type(mime: &str) -> bool {
    ALLOWED_MEDIA_TYPES.contains(&mime)
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

fn skip_whitespace(buf: &[u8]) -> &[u8] {
    let start = buf.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(buf.len());
    &buf[start..]
}

/// `<?xml ...?>`, `<!-- ... -->` and `<!DOCTYPE ...>` may precede the root tag.
fn looks_like_svg(buf: &[u8]) -> bool {
    let mut rest = skip_whitespace(buf.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(buf));

    loop {
        let (open, close): (&[u8], &[u8]) = if rest.starts_with(b"<?") {
            (&b"<?"[..], &b"?>"[..])
        } else if rest.starts_with(b"<!--") {
            (&b"<!--"[..], &b"-->"[..])
        } else if rest.starts_with(b"<!") {
            (&b"<!"[..], &b">"[..])
        } else {
            break;
        };

        let body = &rest[open.len()..];
        match body.windows(close.len()).position(|w| w == close) {
            Some(end) => rest = skip_whitespace(&body[end + close.len()..]),
            None => return false,
        }
    }

    rest.len() > 4
        && rest[..4].eq_ignore_ascii_case(b"<svg")
        && (rest[4].is_ascii_whitespace() || rest[4] == b'>' || rest[4] == b'/')
}

/// Classify the leading bytes of a file.
///
/// Never returns media type parameters.
pub fn sniff_media_type(head: &[u8]) -> &'static str {
    let head = &head[..head.len().min(SNIFF_LEN)];

    if looks_like_svg(head) {
        return "image/svg+xml";
    }
    if let Some(kind) = infer::get(head) {
        return kind.mime_type();
    }
    if head.iter().any(|b| is_binary_byte(*b)) {
        "application/octet-stream"
    } else {
        "text/plain"
    }
}

fn read_head(file: &UploadedFile) -> std::io::Result<Vec<u8>> {
    let mut buf = vec![0u8; SNIFF_LEN];
    let mut reader = file.open();
    let n = reader.read(&mut buf)?;
    if n == 0 {
        return Err(std::io::ErrorKind::UnexpectedEof.into());
    }
    buf.truncate(n);
    Ok(buf)
}

/// Size, extension and content checks for one file, in that order.
pub fn validate_file(
    config: &UploadConfig,
    file: &UploadedFile,
    max_size: u64,
) -> Result<(), UploadError> {
    if file.size > max_size {
        return Err(UploadError::TooLarge { filename: file.filename.clone(), limit: max_size });
    }

    if !config.allows_extension(&extension_of(&file.filename)) {
        return Err(UploadError::BadExtension {
            filename: file.filename.clone(),
            allowed: config.allowed_extensions.join(", "),
        });
    }

    let head = read_head(file)
        .map_err(|source| UploadError::Read { filename: file.filename.clone(), source })?;

    let mime = sniff_media_type(&head);
    if !is_allowed_media_type(mime) {
        return Err(UploadError::BadMediaType {
            filename: file.filename.clone(),
            mime: mime.to_string(),
        });
    }

    Ok(())
}
