//! Blob storage: named buckets of opaque objects plus time-limited signed
//! read URLs.

use crate::errors::{AppError, AppResult};
use crate::ui::messages::warning;
use chrono::{DateTime, Duration, Utc};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

pub const URL_SCHEME: &str = "rcrm://";

/// Value shipped in early sample configs; never accepted as a real secret.
pub const PLACEHOLDER_SECRET: &str = "change-me";

const SECRET_FILE: &str = ".signing_secret";

/// Fresh random secret for signing URLs.
pub fn new_signing_secret() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

pub trait BlobStore {
    fn upload(&self, bucket: &str, key: &str, bytes: &[u8]) -> AppResult<()>;
    fn download(&self, bucket: &str, key: &str) -> AppResult<Vec<u8>>;
    fn remove(&self, bucket: &str, key: &str) -> AppResult<()>;
    fn exists(&self, bucket: &str, key: &str) -> bool;

    /// Issue a read URL for `bucket/key` valid until `now + ttl`.
    fn signed_url(
        &self,
        bucket: &str,
        key: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> AppResult<SignedUrl>;

    /// Check a signed URL and return the (bucket, key) it grants access to.
    fn verify_url(&self, url: &str, now: DateTime<Utc>) -> AppResult<(String, String)>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// Filesystem-backed store: `<root>/<bucket>/<key>`.
pub struct FsBlobStore {
    root: PathBuf,
    secret: String,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>, secret: &str) -> Self {
        Self {
            root: root.into(),
            secret: secret.to_string(),
        }
    }

    /// Open the store under `root` signing with `configured`. When that is
    /// empty or the placeholder, a random key is generated once and kept in
    /// `<root>/.signing_secret`.
    pub fn open(root: impl Into<PathBuf>, configured: &str) -> AppResult<Self> {
        let root = root.into();
        let configured = configured.trim();

        if configured == PLACEHOLDER_SECRET {
            warning(format!(
                "signing_secret is the placeholder '{PLACEHOLDER_SECRET}'; using the key stored in {}",
                root.display()
            ));
        } else if !configured.is_empty() {
            return Ok(Self::new(root, configured));
        }

        let secret = load_or_create_secret(&root)?;
        Ok(Self::new(root, &secret))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, bucket: &str, key: &str) -> AppResult<PathBuf> {
        check_segment(bucket)?;

        let rel = Path::new(key);
        let safe = !key.is_empty()
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(AppError::ValidationFailed(format!(
                "invalid object key '{key}'"
            )));
        }

        Ok(self.root.join(bucket).join(rel))
    }

    fn token(&self, bucket: &str, key: &str, expires: i64) -> String {
        let payload = format!("{}:{bucket}/{key}:{expires}", self.secret);
        format!("{:x}", md5::compute(payload.as_bytes()))
    }
}

impl BlobStore for FsBlobStore {
    fn upload(&self, bucket: &str, key: &str, bytes: &[u8]) -> AppResult<()> {
        let path = self.object_path(bucket, key)?;
        if path.exists() {
            return Err(AppError::Upstream(format!(
                "object {bucket}/{key} already exists"
            )));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| upstream("upload", bucket, key, e))?;
        }

        // the object only appears under its key once fully written
        let tmp = part_path(&path);
        let written = fs::write(&tmp, bytes).and_then(|_| fs::rename(&tmp, &path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(upstream("upload", bucket, key, e));
        }
        Ok(())
    }

    fn download(&self, bucket: &str, key: &str) -> AppResult<Vec<u8>> {
        let path = self.object_path(bucket, key)?;
        fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => AppError::NotFound(format!("object {bucket}/{key}")),
            _ => upstream("download", bucket, key, e),
        })
    }

    fn remove(&self, bucket: &str, key: &str) -> AppResult<()> {
        let path = self.object_path(bucket, key)?;
        fs::remove_file(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => AppError::NotFound(format!("object {bucket}/{key}")),
            _ => upstream("remove", bucket, key, e),
        })
    }

    fn exists(&self, bucket: &str, key: &str) -> bool {
        self.object_path(bucket, key)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    fn signed_url(
        &self,
        bucket: &str,
        key: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> AppResult<SignedUrl> {
        if ttl <= Duration::zero() {
            return Err(AppError::ValidationFailed(
                "signed URL lifetime must be positive".into(),
            ));
        }
        if !self.exists(bucket, key) {
            return Err(AppError::NotFound(format!("object {bucket}/{key}")));
        }

        let expires_at = now + ttl;
        let expires = expires_at.timestamp();
        let token = self.token(bucket, key, expires);

        Ok(SignedUrl {
            url: format!("{URL_SCHEME}{bucket}/{key}?expires={expires}&token={token}"),
            expires_at,
        })
    }

    fn verify_url(&self, url: &str, now: DateTime<Utc>) -> AppResult<(String, String)> {
        let invalid = || AppError::Forbidden("invalid signed URL".to_string());

        let rest = url.strip_prefix(URL_SCHEME).ok_or_else(invalid)?;
        let (path, query) = rest.split_once('?').ok_or_else(invalid)?;
        let (bucket, key) = path.split_once('/').ok_or_else(invalid)?;

        let mut expires: Option<i64> = None;
        let mut token: Option<&str> = None;
        for pair in query.split('&') {
            match pair.split_once('=') {
                Some(("expires", v)) => expires = v.parse().ok(),
                Some(("token", v)) => token = Some(v),
                _ => {}
            }
        }

        let expires = expires.ok_or_else(invalid)?;
        let token = token.ok_or_else(invalid)?;

        if token != self.token(bucket, key, expires) {
            return Err(invalid());
        }
        if now.timestamp() > expires {
            return Err(AppError::Forbidden("signed URL has expired".to_string()));
        }

        Ok((bucket.to_string(), key.to_string()))
    }
}

fn check_segment(bucket: &str) -> AppResult<()> {
    let ok = !bucket.is_empty()
        && bucket
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(AppError::ValidationFailed(format!(
            "invalid bucket name '{bucket}'"
        )))
    }
}

fn part_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.part"))
}

fn load_or_create_secret(root: &Path) -> AppResult<String> {
    let path = root.join(SECRET_FILE);
    match fs::read_to_string(&path) {
        Ok(s) if !s.trim().is_empty() => return Ok(s.trim().to_string()),
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(AppError::Upstream(format!(
                "cannot read {}: {e}",
                path.display()
            )));
        }
    }

    fs::create_dir_all(root)?;
    let secret = new_signing_secret();
    fs::write(&path, &secret)?;
    Ok(secret)
}

fn upstream(op: &str, bucket: &str, key: &str, e: io::Error) -> AppError {
    AppError::Upstream(format!("blob {op} {bucket}/{key} failed: {e}"))
}

/// Reduce a user-supplied file name to characters safe inside an object key.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}
