use crate::api::error::UploadError;
use crate::modules::image_upload::model::{MultipartSource, UploadedFile};

/// Multi-file fields, tried in order.
pub const MULTI_FILE_FIELDS: [&str; 2] = ["files", "images"];

/// Single-file fields, tried in order after the multi-file ones.
pub const SINGLE_FILE_FIELDS: [&str; 2] = ["file", "image"];

/// Pick the files of a request following the field-name conventions.
///
/// The first non-empty `files` / `images` group wins; otherwise the first file
/// of `file` or `image` is used alone.
pub fn extract_files<F>(form: &F) -> Result<Vec<&UploadedFile>, UploadError>
where
    F: MultipartSource + ?Sized,
{
    for field in MULTI_FILE_FIELDS {
        let files = form.files(field);
        if !files.is_empty() {
            return Ok(files.iter().collect());
        }
    }

    for field in SINGLE_FILE_FIELDS {
        if let Some(file) = form.files(field).first() {
            return Ok(vec![file]);
        }
    }

    Err(UploadError::NoFiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::image_upload::model::UploadForm;

    fn file(name: &str) -> UploadedFile {
        UploadedFile::new(name, vec![1, 2, 3])
    }

    fn names(files: Vec<&UploadedFile>) -> Vec<&str> {
        files.into_iter().map(|f| f.filename.as_str()).collect()
    }

    #[test]
    fn files_group_has_priority() {
        let form = UploadForm::default()
            .with_file("image", file("single.png"))
            .with_file("images[]", file("i1.png"))
            .with_file("files[]", file("f1.png"))
            .with_file("files[]", file("f2.png"));

        assert_eq!(names(extract_files(&form).unwrap()), vec!["f1.png", "f2.png"]);
    }

    #[test]
    fn images_group_before_single_fields() {
        let form = UploadForm::default()
            .with_file("file", file("single.png"))
            .with_file("images[]", file("i1.gif"))
            .with_file("images[]", file("i2.gif"));

        assert_eq!(names(extract_files(&form).unwrap()), vec!["i1.gif", "i2.gif"]);
    }

    #[test]
    fn single_fields_take_one_file() {
        let form = UploadForm::default()
            .with_file("file", file("a.png"))
            .with_file("file", file("b.png"))
            .with_file("image", file("c.png"));

        assert_eq!(names(extract_files(&form).unwrap()), vec!["a.png"]);

        let form = UploadForm::default().with_file("image", file("c.gif"));
        assert_eq!(names(extract_files(&form).unwrap()), vec!["c.gif"]);
    }

    #[test]
    fn unknown_fields_yield_no_files() {
        let form = UploadForm::default()
            .with_file("attachment", file("a.png"))
            .with_text("file", "not a file");

        assert!(matches!(extract_files(&form), Err(UploadError::NoFiles)));
    }
}
