use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::{Error, Result};

static DOCX_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:tab/>|<w:br(?:\s[^>]*)?/>|</w:p>")
        .expect("valid docx token regex")
});

static XML_ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#x[0-9A-Fa-f]+|#[0-9]+|lt|gt|quot|apos|amp);").expect("valid entity regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "docx" => Ok(DocumentKind::Docx),
            "" => Err(Error::UnsupportedInputType(path.display().to_string())),
            other => Err(Error::UnsupportedInputType(format!(".{}", other))),
        }
    }
}

/// Reads the plain text out of a PDF or DOCX file.
pub fn extract_text(path: &Path) -> Result<String> {
    let kind = DocumentKind::from_path(path)?;
    info!("extracting text from {} ({:?})", path.display(), kind);

    let text = match kind {
        DocumentKind::Pdf => {
            pdf_extract::extract_text(path).map_err(|e| Error::document_read(path, e))?
        }
        DocumentKind::Docx => read_docx(path)?,
    };

    if text.trim().is_empty() {
        warn!("no text found in {}", path.display());
    }
    debug!("extracted {} characters", text.len());

    Ok(text)
}

fn read_docx(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| Error::document_read(path, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| Error::document_read(path, e))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| Error::document_read(path, e))?
        .read_to_string(&mut xml)
        .map_err(|e| Error::document_read(path, e))?;

    Ok(docx_xml_to_text(&xml))
}

/// Flattens WordprocessingML into text, one line per paragraph.
fn docx_xml_to_text(xml: &str) -> String {
    let mut text = String::new();

    for token in DOCX_TOKEN.captures_iter(xml) {
        match token.get(1) {
            Some(run) => text.push_str(&decode_entities(run.as_str())),
            None => match &token[0] {
                "<w:tab/>" => text.push('\t'),
                _ => text.push('\n'),
            },
        }
    }

    text.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn decode_entities(text: &str) -> String {
    XML_ENTITY
        .replace_all(text, |caps: &Captures| {
            let name = &caps[1];
            let decoded = match name {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "amp" => Some('&'),
                _ => name
                    .strip_prefix("#x")
                    .map_or_else(
                        || name[1..].parse::<u32>().ok(),
                        |hex| u32::from_str_radix(hex, 16).ok(),
                    )
                    .and_then(char::from_u32),
            };
            // unknown code points are kept as written
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
