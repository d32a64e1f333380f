//! Multipart form handling and the upload convention.
//!
//! A multipart request carries `query`, `operationName` and `variables`
//! (JSON text) as plain fields. `variables.input.fieldName` names the file
//! part holding the payload. Once saved, the file's path is written back to
//! `variables.input.buffer`.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};

use axum::extract::Multipart;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use super::errors::{ResolveError, ResolveResult, UploadError};
use super::form::FormFields;
use super::resolver::MULTIPART_MEMORY_THRESHOLD;
use super::upload::UploadMaterializer;
use super::RequestOptions;

/// A file part held in memory, or spilled to an anonymous temp file once it
/// outgrows the memory threshold. Spilled files vanish on drop.
#[derive(Debug)]
pub enum SpooledPart {
    Memory(Vec<u8>),
    Disk { file: NamedTempFile, len: u64 },
}

impl SpooledPart {
    pub fn in_memory(bytes: Vec<u8>) -> Self {
        SpooledPart::Memory(bytes)
    }

    pub fn len(&self) -> u64 {
        match self {
            SpooledPart::Memory(bytes) => bytes.len() as u64,
            SpooledPart::Disk { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_spilled(&self) -> bool {
        matches!(self, SpooledPart::Disk { .. })
    }

    /// Copy the whole part into `dest`, returning the byte count
    pub fn copy_into(&self, dest: &mut File) -> io::Result<u64> {
        match self {
            SpooledPart::Memory(bytes) => {
                dest.write_all(bytes)?;
                Ok(bytes.len() as u64)
            }
            SpooledPart::Disk { file, .. } => {
                let mut source = file.reopen()?;
                io::copy(&mut source, dest)
            }
        }
    }
}

/// Spools chunks, switching to disk past `threshold` bytes
struct Spooler {
    threshold: usize,
    buffer: Vec<u8>,
    disk: Option<Spill>,
}

/// Owned temp file plus an async handle writing into it
struct Spill {
    file: NamedTempFile,
    writer: tokio::fs::File,
    len: u64,
}

impl Spooler {
    fn new(threshold: usize) -> Self {
        Self {
            threshold,
            buffer: Vec::new(),
            disk: None,
        }
    }

    async fn push(&mut self, chunk: &[u8]) -> io::Result<()> {
        if let Some(spill) = self.disk.as_mut() {
            spill.writer.write_all(chunk).await?;
            spill.len += chunk.len() as u64;
            return Ok(());
        }

        self.buffer.extend_from_slice(chunk);
        if self.buffer.len() > self.threshold {
            let file = tokio::task::spawn_blocking(NamedTempFile::new)
                .await
                .map_err(io::Error::other)??;
            let mut writer = tokio::fs::File::from_std(file.as_file().try_clone()?);
            writer.write_all(&self.buffer).await?;

            let len = self.buffer.len() as u64;
            self.buffer = Vec::new();
            self.disk = Some(Spill { file, writer, len });
        }
        Ok(())
    }

    async fn finish(self) -> io::Result<SpooledPart> {
        match self.disk {
            Some(mut spill) => {
                spill.writer.flush().await?;
                Ok(SpooledPart::Disk {
                    file: spill.file,
                    len: spill.len,
                })
            }
            None => Ok(SpooledPart::Memory(self.buffer)),
        }
    }
}

/// Fully read multipart form: text fields plus spooled file parts
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: FormFields,
    files: HashMap<String, SpooledPart>,
}

impl MultipartForm {
    /// Drain `multipart`. Parts with a filename are files; the first file
    /// for a given field name wins.
    pub async fn read(mut multipart: Multipart, threshold: usize) -> ResolveResult<Self> {
        let mut form = MultipartForm::default();

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|e| ResolveError::MultipartParse(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if field.file_name().is_none() {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ResolveError::MultipartParse(e.to_string()))?;
                form.fields.push(name, text);
                continue;
            }

            let mut spooler = Spooler::new(threshold);
            while let Some(chunk) = field
                .chunk()
                .await
                .map_err(|e| ResolveError::MultipartParse(e.to_string()))?
            {
                spooler.push(&chunk).await.map_err(UploadError::Spool)?;
            }
            let part = spooler.finish().await.map_err(UploadError::Spool)?;
            form.files.entry(name).or_insert(part);
        }

        Ok(form)
    }

    pub fn file(&self, name: &str) -> Option<&SpooledPart> {
        self.files.get(name)
    }

}

/// Resolve a multipart request, saving the referenced upload
pub async fn options_from_multipart(
    multipart: Multipart,
    uploads: &UploadMaterializer,
) -> ResolveResult<RequestOptions> {
    let form = MultipartForm::read(multipart, MULTIPART_MEMORY_THRESHOLD).await?;
    let uploads = uploads.clone();

    tokio::task::spawn_blocking(move || options_from_multipart_form(&form, &uploads))
        .await
        .map_err(|e| UploadError::Task(e.to_string()))?
}

/// The upload convention over an already-read form
pub fn options_from_multipart_form(
    form: &MultipartForm,
    uploads: &UploadMaterializer,
) -> ResolveResult<RequestOptions> {
    let query = form.fields.get_or_empty("query");
    if query.is_empty() {
        return Err(ResolveError::MissingQuery);
    }

    let mut variables = match serde_json::from_str::<Map<String, Value>>(
        form.fields.get_or_empty("variables"),
    ) {
        Ok(variables) => variables,
        Err(e) => {
            tracing::warn!(event = "UPLOAD_VARIABLES_INVALID", error = %e);
            Map::new()
        }
    };

    let field_name = upload_field_name(&variables)
        .ok_or(ResolveError::MissingUploadField)?
        .to_string();

    let part = form
        .file(&field_name)
        .ok_or_else(|| ResolveError::UploadPartMissing(field_name.clone()))?;

    let path = uploads.materialize(part)?;

    if let Some(input) = variables.get_mut("input").and_then(Value::as_object_mut) {
        input.insert(
            "buffer".to_string(),
            Value::String(path.to_string_lossy().into_owned()),
        );
    }

    Ok(RequestOptions {
        query: query.to_string(),
        variables: Some(variables),
        operation_name: form.fields.get_or_empty("operationName").to_string(),
    })
}

fn upload_field_name(variables: &Map<String, Value>) -> Option<&str> {
    variables
        .get("input")
        .and_then(Value::as_object)
        .and_then(|input| input.get("fieldName"))
        .and_then(Value::as_str)
}
