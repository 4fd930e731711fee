//! Объектное хранилище логотипов.
//!
//! Ключи строятся как `<тип>/<имя>/<файл>`, публичный адрес объекта
//! детерминирован: `<public-base>/public/<ключ>`. Удаление идёт по ключу,
//! который восстанавливается из сохранённого URL.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::operation::delete_object::DeleteObjectError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::operation::put_object::PutObjectError;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use aws_smithy_runtime_api::client::result::SdkError;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error};

use crate::config::StorageConfig;

const PUBLIC_PREFIX: &str = "public";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("write: {0}")]
    Write(#[from] SdkError<PutObjectError, HttpResponse>),
    #[error("delete: {0}")]
    Delete(#[from] SdkError<DeleteObjectError, HttpResponse>),
    #[error("head: {0}")]
    Head(#[from] SdkError<HeadObjectError, HttpResponse>),
    #[error("object store lock poisoned")]
    Poisoned,
    #[error("'{0}' is not a stored object url")]
    InvalidUrl(String),
    #[error("object '{0}' not found")]
    NotFound(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Debug, Clone)]
pub struct PutOptions {
    pub visibility: Visibility,
    pub content_type: String,
}

impl PutOptions {
    pub fn public(content_type: impl Into<String>) -> Self {
        Self {
            visibility: Visibility::Public,
            content_type: content_type.into(),
        }
    }
}

/// Префикс ключа по типу записи.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoragePrefix {
    Facilities,
    Companies,
}

impl StoragePrefix {
    pub fn as_str(self) -> &'static str {
        match self {
            StoragePrefix::Facilities => "facilities",
            // Исторически логотипы компаний лежат под заглавной буквой
            StoragePrefix::Companies => "Companies",
        }
    }
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, data: Bytes, options: PutOptions) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
    fn public_url(&self, key: &str) -> String;
}

fn replace_outside(value: &str, keep: impl Fn(char) -> bool) -> String {
    value
        .chars()
        .map(|c| if keep(c) { c } else { '_' })
        .collect()
}

/// Имя записи в ключе: всё кроме `[A-Za-z0-9-]` заменяется на `_`.
pub fn sanitize_name(name: &str) -> String {
    replace_outside(name, |c| c.is_ascii_alphanumeric() || c == '-')
}

/// Имя файла: всё кроме `[A-Za-z0-9._-]` заменяется на `_`.
pub fn sanitize_file_name(file_name: &str) -> String {
    replace_outside(file_name, |c| {
        c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')
    })
}

pub fn object_key(prefix: StoragePrefix, owner_name: &str, file_name: &str) -> String {
    format!(
        "{}/{}/{}",
        prefix.as_str(),
        sanitize_name(owner_name),
        sanitize_file_name(file_name)
    )
}

fn strip_query(value: &str) -> &str {
    value.split(['?', '#']).next().unwrap_or(value)
}

fn decode(value: &str) -> String {
    urlencoding::decode(value)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

/// Ключ объекта из публичного URL: всё после `/public/` без query.
pub fn key_from_url(url: &str) -> Result<String, StorageError> {
    let (_, tail) = url
        .split_once("/public/")
        .ok_or_else(|| StorageError::InvalidUrl(url.to_string()))?;
    let key = decode(strip_query(tail));
    if key.is_empty() {
        return Err(StorageError::InvalidUrl(url.to_string()));
    }
    Ok(key)
}

/// Имя файла из URL: последний сегмент пути без query.
pub fn file_name_from_url(url: &str) -> String {
    let path = strip_query(url);
    decode(path.rsplit('/').next().unwrap_or(path))
}

/// Объекты лежат в бакете под `public/`, как их отдаёт публичный адрес.
fn bucket_key(key: &str) -> String {
    format!("{}/{}", PUBLIC_PREFIX, key.trim_start_matches('/'))
}

/// Бакет S3 (или S3-совместимое хранилище), запросы подписывает AWS SDK.
#[derive(Debug)]
pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3BlobStore {
    #[tracing::instrument(skip(config), name = "S3BlobStore::new", fields(bucket = %config.bucket))]
    pub async fn new(config: &StorageConfig) -> Self {
        debug!("setting up s3 blob store");
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let (Some(access_key), Some(secret_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key.clone(),
                secret_key.clone(),
                None,
                None,
                "ConfiguredCredentialsProvider",
            ));
        }
        let shared = loader.load().await;

        let mut builder =
            aws_sdk_s3::config::Builder::from(&shared).force_path_style(config.force_path_style);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url.clone(),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    #[tracing::instrument(skip(self, data, options), name = "S3BlobStore::put", err, fields(size = data.len()))]
    async fn put(&self, key: &str, data: Bytes, options: PutOptions) -> Result<(), StorageError> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(bucket_key(key))
            .content_type(options.content_type)
            .body(data.into());
        if options.visibility == Visibility::Public {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        request.send().await.inspect_err(|err| {
            error!("failed to write {} to s3: {:?}", key, err);
        })?;
        Ok(())
    }

    #[tracing::instrument(skip(self), name = "S3BlobStore::remove", err)]
    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let object = bucket_key(key);

        // DeleteObject отвечает 204 и на отсутствующий ключ, поэтому сначала HEAD
        let head = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&object)
            .send()
            .await;
        if let Err(err) = head {
            return match err.as_service_error() {
                Some(service) if service.is_not_found() => {
                    Err(StorageError::NotFound(key.to_string()))
                }
                _ => Err(err.into()),
            };
        }

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(object)
            .send()
            .await?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, bucket_key(key))
    }
}

/// Хранилище в памяти для локального запуска и тестов.
pub struct MemoryBlobStore {
    public_base_url: String,
    objects: Mutex<HashMap<String, (Bytes, String)>>,
}

impl MemoryBlobStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into(),
            objects: Mutex::new(HashMap::new()),
        }
    }

    fn objects(&self) -> Result<MutexGuard<'_, HashMap<String, (Bytes, String)>>, StorageError> {
        self.objects.lock().map_err(|_| StorageError::Poisoned)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects()
            .map(|objects| objects.contains_key(key))
            .unwrap_or(false)
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects()
            .ok()
            .and_then(|objects| objects.get(key).map(|(_, ct)| ct.clone()))
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, data: Bytes, options: PutOptions) -> Result<(), StorageError> {
        self.objects()?
            .insert(key.to_string(), (data, options.content_type));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self.objects()?.remove(key) {
            Some(_) => Ok(()),
            None => Err(StorageError::NotFound(key.to_string())),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, bucket_key(key))
    }
}
