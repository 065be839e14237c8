//! Attachment upload capability.
//!
//! Uploads go through the platform's image service, consumed here as the
//! [`ImageUploader`] trait. The core validates the file name first and maps
//! service failures into the two user-facing categories: payload too large
//! and everything else.

use async_trait::async_trait;

use crate::error::{ChatError, UploadError, ValidationError};
use crate::models::Attachment;

/// File extensions accepted for chat attachments.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "gif", "png"];

/// Placeholder inserted into the message body while an upload is pending.
/// A draft still containing it must not be sent.
pub const UPLOADING_PLACEHOLDER: &str = "![Uploading";

#[async_trait]
pub trait ImageUploader: Send + Sync {
    /// Upload an image on behalf of the active user.
    ///
    /// Implementations must map an HTTP 413 response to
    /// [`UploadError::TooLarge`]; every other failure is
    /// [`UploadError::Failed`].
    async fn upload_image(
        &self,
        filename: &str,
        bytes: &[u8],
        access_token: &str,
    ) -> Result<Attachment, UploadError>;
}

/// Whether a file name carries an accepted image extension.
pub fn accepts(filename: &str) -> bool {
    let lowered = filename.to_lowercase();
    ALLOWED_EXTENSIONS
        .iter()
        .any(|extension| lowered.ends_with(extension))
}

/// Body placeholder shown while `filename` uploads.
pub fn pending_placeholder(filename: &str, tag: u8) -> String {
    format!("{UPLOADING_PLACEHOLDER} {filename} #{tag}]()\n\n")
}

/// Validate and upload an attachment.
pub async fn upload_attachment(
    uploader: &dyn ImageUploader,
    filename: &str,
    bytes: &[u8],
    access_token: &str,
) -> Result<Attachment, ChatError> {
    if !accepts(filename) {
        return Err(ValidationError::UnsupportedAttachment(filename.to_owned()).into());
    }
    let attachment = uploader.upload_image(filename, bytes, access_token).await?;
    Ok(attachment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingUploader {
        calls: AtomicUsize,
        outcome: Result<Attachment, UploadError>,
    }

    #[async_trait]
    impl ImageUploader for CountingUploader {
        async fn upload_image(
            &self,
            _filename: &str,
            _bytes: &[u8],
            _access_token: &str,
        ) -> Result<Attachment, UploadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                Ok(attachment) => Ok(attachment.clone()),
                Err(UploadError::TooLarge) => Err(UploadError::TooLarge),
                Err(UploadError::Failed(reason)) => Err(UploadError::Failed(reason.clone())),
            }
        }
    }

    #[test]
    fn placeholder_marks_a_draft_as_pending() {
        let placeholder = pending_placeholder("cat.png", 42);
        assert!(placeholder.contains(UPLOADING_PLACEHOLDER));
        assert!(placeholder.contains("cat.png"));
    }

    #[test]
    fn accepts_known_image_extensions() {
        assert!(accepts("photo.JPG"));
        assert!(accepts("anim.gif"));
        assert!(!accepts("clip.webp"));
        assert!(!accepts("notes.txt"));
    }

    #[tokio::test]
    async fn unsupported_extension_never_reaches_uploader() {
        let uploader = CountingUploader {
            calls: AtomicUsize::new(0),
            outcome: Ok(Attachment {
                url: "https://img.example/1.png".to_owned(),
            }),
        };
        let result = upload_attachment(&uploader, "clip.webp", b"...", "token").await;
        assert!(matches!(
            result,
            Err(ChatError::Validation(ValidationError::UnsupportedAttachment(_)))
        ));
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn too_large_keeps_its_own_category() {
        let uploader = CountingUploader {
            calls: AtomicUsize::new(0),
            outcome: Err(UploadError::TooLarge),
        };
        let result = upload_attachment(&uploader, "big.png", b"...", "token").await;
        assert!(matches!(result, Err(ChatError::Upload(UploadError::TooLarge))));
    }
}
