//! Document rendering.
//!
//! One layout engine feeds two backends: WordprocessingML written directly
//! and LaTeX typeset with tectonic.

pub mod docx;
pub mod layout;
pub mod style;

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use tectonic::latex_to_pdf;

use crate::error::{Error, Result};
use crate::latex::LatexResumeAssembler;
use crate::models::resume::ResumeDocument;
use crate::utils::misc::output_file_name;

pub use layout::{Layout, layout};
pub use style::{StyleDescriptor, TemplateStyle};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormats {
    Docx,
    Pdf,
    #[default]
    Both,
}

impl OutputFormats {
    pub fn docx(&self) -> bool {
        matches!(self, OutputFormats::Docx | OutputFormats::Both)
    }

    pub fn pdf(&self) -> bool {
        matches!(self, OutputFormats::Pdf | OutputFormats::Both)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedFiles {
    pub docx: Option<PathBuf>,
    pub pdf: Option<PathBuf>,
}

impl RenderedFiles {
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.docx.iter().chain(self.pdf.iter())
    }
}

/// Renders documents into a directory that must already exist.
#[derive(Debug, Clone)]
pub struct Renderer {
    output_dir: PathBuf,
}

impl Renderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn render_docx(
        &self,
        doc: &ResumeDocument,
        style: TemplateStyle,
        base_name: &str,
    ) -> Result<PathBuf> {
        let descriptor = style.descriptor();
        let path = self.output_dir.join(output_file_name(base_name, style, "docx"));

        docx::write_docx(&layout(doc, descriptor), descriptor, &path)?;

        info!("rendered {}", path.display());
        Ok(path)
    }

    pub async fn render_pdf(
        &self,
        doc: &ResumeDocument,
        style: TemplateStyle,
        base_name: &str,
    ) -> Result<PathBuf> {
        let path = self.output_dir.join(output_file_name(base_name, style, "pdf"));
        let latex = latex_source(doc, style);

        info!("compiling LaTeX to PDF");
        debug!("LaTeX source is {} bytes", latex.len());
        let pdf = tokio::task::spawn_blocking(move || latex_to_pdf(latex))
            .await
            .map_err(|e| Error::Typesetting(e.to_string()))?
            .map_err(|e| Error::Typesetting(e.to_string()))?;

        tokio::fs::write(&path, pdf).await?;

        info!("rendered {}", path.display());
        Ok(path)
    }

    pub async fn render(
        &self,
        doc: &ResumeDocument,
        style: TemplateStyle,
        base_name: &str,
        formats: OutputFormats,
    ) -> Result<RenderedFiles> {
        let mut files = RenderedFiles::default();

        if formats.docx() {
            files.docx = Some(self.render_docx(doc, style, base_name)?);
        }
        if formats.pdf() {
            files.pdf = Some(self.render_pdf(doc, style, base_name).await?);
        }

        Ok(files)
    }
}

/// The LaTeX the PDF backend would typeset for `doc`.
pub fn latex_source(doc: &ResumeDocument, style: TemplateStyle) -> String {
    let descriptor = style.descriptor();
    let laid_out = layout(doc, descriptor);
    LatexResumeAssembler::new(&laid_out, descriptor).assemble()
}
