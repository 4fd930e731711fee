//! Загрузка и удаление логотипов объектов и компаний.

use bytes::Bytes;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult};
use crate::gateway::storage::{
    file_name_from_url, key_from_url, object_key, sanitize_file_name, PutOptions, StoragePrefix,
};
use crate::gateway::{BlobStore, Repository, StorageError};
use crate::models::{Client, ClientPatch, Facility, FacilityPatch};

const DEFAULT_CONTENT_TYPE: &str = "image/png";

#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadFile {
    fn put_options(&self) -> PutOptions {
        PutOptions::public(
            self.content_type
                .clone()
                .filter(|ct| !ct.is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
        )
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedUpload {
    pub file_name: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReport {
    pub uploaded: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<FailedUpload>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityLogos {
    pub facility: Facility,
    pub report: UploadReport,
}

/// Новые URL заменяют записи с тем же именем файла и добавляются в конец.
/// Повтор имени внутри пакета оставляет последнюю загрузку.
pub fn merge_logos(existing: &[String], uploaded: &[String]) -> Vec<String> {
    let mut replaced = HashSet::new();
    let mut fresh: Vec<&String> = uploaded
        .iter()
        .rev()
        .filter(|url| replaced.insert(file_name_from_url(url)))
        .collect();
    fresh.reverse();

    existing
        .iter()
        .filter(|url| !replaced.contains(&file_name_from_url(url)))
        .chain(fresh)
        .cloned()
        .collect()
}

/// Пакетная загрузка. Каждый файл загружается независимо; список логотипов
/// записывается одним обновлением, если хоть что-то загрузилось.
pub async fn upload_facility_logos<S, Rp>(
    store: &S,
    repo: &Rp,
    facility_id: &str,
    files: Vec<UploadFile>,
    replace_existing: bool,
) -> AppResult<FacilityLogos>
where
    S: BlobStore + ?Sized,
    Rp: Repository<Facility> + ?Sized,
{
    if files.is_empty() {
        return Err(AppError::Validation("select at least one logo".to_string()));
    }

    let mut facility = repo.get(facility_id).await?;
    let existing_names: HashSet<String> =
        facility.logos.iter().map(|u| file_name_from_url(u)).collect();

    let mut report = UploadReport::default();
    for file in files {
        let clean_name = sanitize_file_name(&file.file_name);
        if existing_names.contains(&clean_name) && !replace_existing {
            info!("Skipping {} for {}: already uploaded", clean_name, facility.name);
            report.skipped.push(clean_name);
            continue;
        }

        let key = object_key(StoragePrefix::Facilities, &facility.name, &file.file_name);
        let options = file.put_options();
        match store.put(&key, file.data, options).await {
            Ok(()) => report.uploaded.push(store.public_url(&key)),
            Err(e) => {
                error!("Error uploading {}: {:?}", clean_name, e);
                report.failed.push(FailedUpload {
                    file_name: clean_name,
                    error: e.to_string(),
                });
            }
        }
    }

    if !report.uploaded.is_empty() {
        let logos = merge_logos(&facility.logos, &report.uploaded);
        let patch = FacilityPatch {
            logos: Some(logos.clone()),
            ..FacilityPatch::new(facility_id)
        };
        repo.update(patch).await?;
        facility.logos = logos;
        facility.version = facility.version.map(|v| v + 1);
    }

    Ok(FacilityLogos { facility, report })
}

pub async fn upload_company_logo<S, Rp>(
    store: &S,
    repo: &Rp,
    client_id: &str,
    file: UploadFile,
) -> AppResult<Client>
where
    S: BlobStore + ?Sized,
    Rp: Repository<Client> + ?Sized,
{
    let mut client = repo.get(client_id).await?;

    let key = object_key(StoragePrefix::Companies, &client.company_name, &file.file_name);
    let options = file.put_options();
    store.put(&key, file.data, options).await?;
    let url = store.public_url(&key);

    let patch = ClientPatch {
        logo: Some(Some(url.clone())),
        ..ClientPatch::new(client_id)
    };
    repo.update(patch).await?;

    client.logo = Some(url);
    client.version = client.version.map(|v| v + 1);
    Ok(client)
}

/// Удаляет объект из хранилища и URL из списка логотипов.
pub async fn remove_facility_logo<S, Rp>(
    store: &S,
    repo: &Rp,
    facility_id: &str,
    url: &str,
) -> AppResult<Facility>
where
    S: BlobStore + ?Sized,
    Rp: Repository<Facility> + ?Sized,
{
    let mut facility = repo.get(facility_id).await?;
    if !facility.logos.iter().any(|l| l == url) {
        return Err(AppError::NotFound(format!(
            "logo {} is not attached to facility {}",
            url, facility_id
        )));
    }

    let key = key_from_url(url)?;
    match store.remove(&key).await {
        Ok(()) => {}
        // Объекта уже нет - всё равно убираем ссылку
        Err(StorageError::NotFound(_)) => warn!("Logo object {} was already gone", key),
        Err(e) => return Err(e.into()),
    }

    let logos: Vec<String> = facility.logos.iter().filter(|l| *l != url).cloned().collect();
    let patch = FacilityPatch {
        logos: Some(logos.clone()),
        ..FacilityPatch::new(facility_id)
    };
    repo.update(patch).await?;

    facility.logos = logos;
    facility.version = facility.version.map(|v| v + 1);
    Ok(facility)
}
