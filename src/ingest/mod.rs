//! In-memory document loading.
//!
//! Uploaded files are parsed straight from their bytes; nothing is staged to
//! disk. A failure on any file aborts the whole batch so an index is never
//! built from a partial document set.

use crate::core::errors::ApiError;

/// A named binary blob received from the upload surface.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// One page of extracted text. Owned transiently by the ingestion step and
/// discarded after chunking.
#[derive(Debug, Clone)]
pub struct Document {
    pub source: String,
    /// 1-based page number; plain-text files load as page 1.
    pub page: u32,
    pub text: String,
}

/// Turns uploaded files into per-page documents, dispatching on the file
/// extension. Blank pages contribute nothing; an unsupported or corrupt file
/// fails the batch.
pub fn load_documents(files: &[SourceFile]) -> Result<Vec<Document>, ApiError> {
    let mut documents = Vec::new();
    for file in files {
        match extension(&file.name).as_deref() {
            Some("pdf") => documents.extend(load_pdf(file)?),
            Some("txt") | Some("md") => documents.extend(load_text(file)?),
            _ => {
                return Err(ApiError::Ingestion(format!(
                    "unsupported file type: {} (expected .pdf, .txt or .md)",
                    file.name
                )))
            }
        }
    }
    Ok(documents)
}

fn extension(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn load_pdf(file: &SourceFile) -> Result<Vec<Document>, ApiError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(&file.bytes)
        .map_err(|err| ApiError::Ingestion(format!("failed to parse {}: {}", file.name, err)))?;

    Ok(pages
        .into_iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(page_index, text)| Document {
            source: file.name.clone(),
            page: page_index as u32 + 1,
            text,
        })
        .collect())
}

fn load_text(file: &SourceFile) -> Result<Vec<Document>, ApiError> {
    let text = String::from_utf8(file.bytes.clone())
        .map_err(|err| ApiError::Ingestion(format!("{} is not valid UTF-8: {}", file.name, err)))?;

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    Ok(vec![Document {
        source: file.name.clone(),
        page: 1,
        text,
    }])
}
