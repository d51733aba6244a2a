use bytes::Bytes;
use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};

use greenclub_backend::BlobStore;

use crate::error::{AdminError, Result};
use crate::notify::Notifier;

pub const DEFAULT_BUCKET: &str = "news-images";
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const KEY_SUFFIX_LEN: usize = 11;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A file picked for upload.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub name: String,
    /// Declared media type, e.g. `image/png`.
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("Please select an image file")]
    NotAnImage,
    #[error("Image must be less than 5MB")]
    TooLarge { size: usize },
}

impl ImageFile {
    pub fn check(&self) -> std::result::Result<(), UploadRejection> {
        if !self.content_type.starts_with("image/") {
            return Err(UploadRejection::NotAnImage);
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(UploadRejection::TooLarge { size: self.bytes.len() });
        }
        Ok(())
    }

    /// Text after the last '.', or the whole name when there is none.
    pub fn extension(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// `<unix millis>-<random base36>.<ext>`
pub fn storage_key<R: Rng + ?Sized>(now: DateTime<Utc>, extension: &str, rng: &mut R) -> String {
    let suffix: String = (0..KEY_SUFFIX_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    format!("{}-{}.{}", now.timestamp_millis(), suffix, extension)
}

/// A checked file and the key it will be stored under, taken when an upload
/// starts.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    bucket: String,
    key: String,
    file: ImageFile,
}

/// A file that reached storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub url: String,
    pub file_name: String,
}

impl PendingUpload {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Store the file and resolve its public URL. Runs without holding the
    /// widget, so the rest of the form stays editable meanwhile.
    pub async fn send<S: BlobStore + ?Sized>(
        self,
        store: &S,
        notifier: &dyn Notifier,
    ) -> Result<UploadedImage> {
        let Self { bucket, key, file } = self;
        match store.upload_object(&bucket, &key, &file.content_type, file.bytes).await {
            Ok(()) => {
                info!("Uploaded {} as {}/{}", file.name, bucket, key);
                notifier.success("Image uploaded successfully");
                Ok(UploadedImage { url: store.public_url(&bucket, &key), file_name: file.name })
            }
            Err(e) => {
                warn!("Upload of {} failed: {}", file.name, e);
                let message = e.to_string();
                if message.is_empty() {
                    notifier.error("Failed to upload image");
                } else {
                    notifier.error(&message);
                }
                Err(e.into())
            }
        }
    }
}

/// Image field of the news form: either an uploaded file or a pasted URL,
/// whichever was set last.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    bucket: String,
    preview: String,
    value: String,
    /// Name of the file held by the picker, if any.
    selected_file: Option<String>,
    uploading: bool,
}

impl Default for ImageUpload {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKET)
    }
}

impl ImageUpload {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            preview: String::new(),
            value: String::new(),
            selected_file: None,
            uploading: false,
        }
    }

    /// Start from an existing value, e.g. when editing a post.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        self.preview = value.clone();
        self.value = value;
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn preview(&self) -> &str {
        &self.preview
    }

    /// The URL handed to the form.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn selected_file(&self) -> Option<&str> {
        self.selected_file.as_deref()
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    /// Check `file`, mark the widget as uploading and pick the storage key.
    /// Rejected files are reported through `notifier`.
    pub fn begin_upload(&mut self, file: ImageFile, notifier: &dyn Notifier) -> Result<PendingUpload> {
        if self.uploading {
            return Err(AdminError::UploadInFlight);
        }
        if let Err(rejection) = file.check() {
            notifier.error(&rejection.to_string());
            return Err(rejection.into());
        }

        let key = storage_key(Utc::now(), file.extension(), &mut rand::rng());
        self.uploading = true;
        Ok(PendingUpload { bucket: self.bucket.clone(), key, file })
    }

    /// End the upload, adopting the stored file if there is one. A failed
    /// upload leaves the current value and preview untouched.
    pub fn finish_upload(&mut self, uploaded: Option<&UploadedImage>) {
        self.uploading = false;
        if let Some(uploaded) = uploaded {
            self.preview = uploaded.url.clone();
            self.value = uploaded.url.clone();
            self.selected_file = Some(uploaded.file_name.clone());
        }
    }

    /// Begin, send and finish in one go. The uploading flag is cleared even
    /// if this future is dropped before storage answers.
    pub async fn upload<S: BlobStore + ?Sized>(
        &mut self,
        store: &S,
        file: ImageFile,
        notifier: &dyn Notifier,
    ) -> Result<String> {
        let pending = self.begin_upload(file, notifier)?;
        let uploaded = {
            let _mark = UploadingMark(&mut self.uploading);
            pending.send(store, notifier).await
        };
        self.finish_upload(uploaded.as_ref().ok());
        uploaded.map(|u| u.url)
    }

    /// Manual URL entry; bypasses storage entirely.
    pub fn set_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        self.preview = url.clone();
        self.value = url;
    }

    /// Clear the image and reset the picker.
    pub fn remove(&mut self) {
        self.preview.clear();
        self.value.clear();
        self.selected_file = None;
    }
}

struct UploadingMark<'a>(&'a mut bool);

impl Drop for UploadingMark<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}
