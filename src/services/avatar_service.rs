use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{Error, Result};

pub const AVATAR_MAX_BYTES: usize = 5 * 1024 * 1024;
pub const AVATAR_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Writes avatar images under `<uploads>/avatars`, which the router serves
/// at `/uploads/avatars`.
#[derive(Clone, Debug)]
pub struct AvatarStore {
    dir: PathBuf,
}

impl AvatarStore {
    pub fn new(uploads_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: uploads_dir.as_ref().join("avatars"),
        }
    }

    /// Stores the image and returns its public URL. A user keeps one file
    /// per extension; re-uploading overwrites it.
    pub async fn save(&self, user_id: Uuid, original_name: &str, data: &[u8]) -> Result<String> {
        let file_name = avatar_file_name(user_id, original_name, data.len())?;

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&file_name), data).await?;

        tracing::info!(%user_id, file = %file_name, bytes = data.len(), "avatar stored");
        Ok(format!("/uploads/avatars/{}", file_name))
    }
}

/// `<user id>.<extension>`; the client's file name only contributes its extension.
pub fn avatar_file_name(user_id: Uuid, original_name: &str, size: usize) -> Result<String> {
    if size == 0 {
        return Err(Error::BadRequest("Avatar file is empty".to_string()));
    }
    if size > AVATAR_MAX_BYTES {
        return Err(Error::BadRequest(format!(
            "Avatar exceeds {} MB",
            AVATAR_MAX_BYTES / (1024 * 1024)
        )));
    }

    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_default();

    if !AVATAR_EXTENSIONS.contains(&extension.as_str()) {
        return Err(Error::BadRequest(format!(
            "File type not allowed. Allowed: {}",
            AVATAR_EXTENSIONS.join(", ")
        )));
    }

    Ok(format!("{}.{}", user_id, extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_keeps_only_the_extension() {
        let id = Uuid::new_v4();
        assert_eq!(
            avatar_file_name(id, "../../etc/Me.PNG", 10).unwrap(),
            format!("{}.png", id)
        );
    }

    #[test]
    fn rejects_unknown_types_and_bad_sizes() {
        let id = Uuid::new_v4();
        assert!(matches!(avatar_file_name(id, "run.exe", 10), Err(Error::BadRequest(_))));
        assert!(matches!(avatar_file_name(id, "noext", 10), Err(Error::BadRequest(_))));
        assert!(matches!(avatar_file_name(id, "a.png", 0), Err(Error::BadRequest(_))));
        assert!(matches!(
            avatar_file_name(id, "a.png", AVATAR_MAX_BYTES + 1),
            Err(Error::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn save_writes_under_avatars() {
        let root = std::env::temp_dir().join(format!("mentor-avatars-{}", Uuid::new_v4()));
        let store = AvatarStore::new(&root);
        let id = Uuid::new_v4();

        let url = store.save(id, "me.jpg", b"jpegbytes").await.unwrap();
        assert_eq!(url, format!("/uploads/avatars/{}.jpg", id));

        let written = tokio::fs::read(root.join("avatars").join(format!("{}.jpg", id)))
            .await
            .unwrap();
        assert_eq!(written, b"jpegbytes");

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }
}
