use crate::core::error::GemchatError;
use crate::core::turn::InlineImage;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fs;
use std::path::Path;

pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

/// Read an image file and encode it for inline transport.
pub fn load_image(path: &Path) -> Result<InlineImage, GemchatError> {
    let mime_type = mime_type_for(path).ok_or_else(|| {
        GemchatError::Input(format!("Unsupported image type: {}", path.display()))
    })?;
    let bytes = fs::read(path)
        .map_err(|e| GemchatError::Input(format!("Cannot read {}: {}", path.display(), e)))?;

    Ok(InlineImage {
        data: STANDARD.encode(bytes),
        mime_type: mime_type.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_decides_mime_type() {
        assert_eq!(mime_type_for(Path::new("cat.PNG")), Some("image/png"));
        assert_eq!(mime_type_for(Path::new("a/b/photo.jpeg")), Some("image/jpeg"));
        assert_eq!(mime_type_for(Path::new("notes.txt")), None);
        assert_eq!(mime_type_for(Path::new("README")), None);
    }

    #[test]
    fn image_is_base64_encoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.gif");
        fs::write(&path, b"GIF89a").unwrap();

        let image = load_image(&path).unwrap();
        assert_eq!(image.mime_type, "image/gif");
        assert_eq!(image.data, "R0lGODlh");
    }

    #[test]
    fn unsupported_or_missing_files_are_input_errors() {
        assert!(matches!(
            load_image(Path::new("doc.pdf")),
            Err(GemchatError::Input(_))
        ));
        assert!(matches!(
            load_image(Path::new("/definitely/not/here.png")),
            Err(GemchatError::Input(_))
        ));
    }
}
