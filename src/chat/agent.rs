use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::ats::calculate_score;
use crate::chat::client::{CompletionClient, CompletionRequest};
use crate::chat::enhancer::ResumeEnhancer;
use crate::chat::extractor::ResumeExtractor;
use crate::chat::prompts::CHAT;
use crate::error::{Error, Result};
use crate::ingest::{assemble_text, extract_text};
use crate::models::resume::ResumeDocument;
use crate::models::score::ScoreResult;
use crate::render::{OutputFormats, RenderedFiles, Renderer, TemplateStyle};
use crate::utils::workspace::Workspace;

/// Pipeline stages in the order a run reaches them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Received,
    Extracted,
    ScoredInitial,
    Enhanced,
    ScoredFinal,
    Rendered,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Received => "received",
            Stage::Extracted => "extracted",
            Stage::ScoredInitial => "scored-initial",
            Stage::Enhanced => "enhanced",
            Stage::ScoredFinal => "scored-final",
            Stage::Rendered => "rendered",
            Stage::Done => "done",
        })
    }
}

/// A run that stopped before reaching `stage`.
#[derive(Debug, Error)]
#[error("resume pipeline failed at stage `{stage}`: {source}")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub source: Error,
}

trait AtStage<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, PipelineError>;
}

impl<T> AtStage<T> for Result<T> {
    fn at(self, stage: Stage) -> std::result::Result<T, PipelineError> {
        self.map_err(|source| PipelineError { stage, source })
    }
}

#[derive(Debug, Clone)]
pub enum ResumeInput {
    /// A PDF or DOCX on disk.
    File(PathBuf),
    /// Raw bytes of an uploaded PDF or DOCX.
    Upload { file_name: String, bytes: Vec<u8> },
    /// Manually entered structured data.
    Form(ResumeDocument),
}

#[derive(Debug, Clone)]
pub struct ResumeRequest {
    pub input: ResumeInput,
    pub job_description: String,
    pub style: TemplateStyle,
    pub base_name: String,
}

impl ResumeRequest {
    pub fn new(input: ResumeInput) -> Self {
        Self {
            input,
            job_description: String::new(),
            style: TemplateStyle::default(),
            base_name: "resume".to_string(),
        }
    }

    pub fn with_job_description(mut self, job_description: impl Into<String>) -> Self {
        self.job_description = job_description.into();
        self
    }

    /// Unknown tokens fall back to the professional template.
    pub fn with_style_token(mut self, token: &str) -> Self {
        self.style = TemplateStyle::resolve(token);
        self
    }

    pub fn with_style(mut self, style: TemplateStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_base_name(mut self, base_name: impl Into<String>) -> Self {
        self.base_name = base_name.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub original_text: String,
    pub enhanced_text: String,
    /// Present when the run started from a form.
    pub original_document: Option<ResumeDocument>,
    pub enhanced_document: ResumeDocument,
    pub initial_score: ScoreResult,
    pub final_score: ScoreResult,
    pub outputs: RenderedFiles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

enum Staged {
    File(PathBuf),
    Form(ResumeDocument),
}

/// Runs the resume pipeline and the advice chat on top of one completion
/// client. Holds no per-run state, so one agent serves any number of runs.
pub struct ResumeAgent<C> {
    client: C,
    renderer: Renderer,
    formats: OutputFormats,
    scratch_dir: PathBuf,
}

impl<C: CompletionClient> ResumeAgent<C> {
    pub fn new(
        client: C,
        renderer: Renderer,
        formats: OutputFormats,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            renderer,
            formats,
            scratch_dir: scratch_dir.into(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub async fn process_resume(
        &self,
        request: ResumeRequest,
    ) -> std::result::Result<ProcessOutcome, PipelineError> {
        let ResumeRequest {
            input,
            job_description,
            style,
            base_name,
        } = request;

        info!("processing resume (style: {}, formats: {:?})", style, self.formats);

        // dropped on every return path, taking staged inputs and renders with it
        let workspace = Workspace::create_in(&self.scratch_dir).at(Stage::Received)?;
        let staged = match input {
            ResumeInput::File(path) => {
                Staged::File(workspace.stage_file(&path).at(Stage::Received)?)
            }
            ResumeInput::Upload { file_name, bytes } => {
                Staged::File(workspace.stage_bytes(&file_name, &bytes).at(Stage::Received)?)
            }
            ResumeInput::Form(doc) => Staged::Form(doc),
        };
        debug!("stage {} complete", Stage::Received);

        let original_text = match &staged {
            Staged::File(path) => extract_text(path).at(Stage::Extracted)?,
            Staged::Form(doc) => assemble_text(doc),
        };
        if original_text.trim().is_empty() {
            return Err(Error::EmptyInput("no resume text found in the input".to_string()))
                .at(Stage::Extracted);
        }
        debug!("stage {} complete", Stage::Extracted);

        let initial_score = calculate_score(&original_text, &job_description);
        info!("initial ATS score: {}/{}", initial_score.score, initial_score.max_score);

        let (enhanced_text, enhanced_document) = match &staged {
            Staged::File(_) => {
                let text = ResumeEnhancer::for_text(original_text.clone(), job_description.as_str())
                    .run_text(&self.client)
                    .await
                    .at(Stage::Enhanced)?;
                let doc = ResumeExtractor::new(text.clone())
                    .run(&self.client)
                    .await
                    .at(Stage::Enhanced)?;
                (text, doc)
            }
            Staged::Form(doc) => {
                let enhanced = ResumeEnhancer::for_document(doc.clone(), job_description.as_str())
                    .run_document(&self.client)
                    .await
                    .at(Stage::Enhanced)?;
                (assemble_text(&enhanced), enhanced)
            }
        };
        debug!("stage {} complete", Stage::Enhanced);

        let final_score = calculate_score(&enhanced_text, &job_description);
        info!(
            "final ATS score: {}/{} ({:+})",
            final_score.score,
            final_score.max_score,
            final_score.improvement_over(&initial_score)
        );

        let rendered = Renderer::new(workspace.path())
            .render(&enhanced_document, style, &base_name, self.formats)
            .await
            .at(Stage::Rendered)?;
        let outputs = self.publish(&rendered).at(Stage::Rendered)?;
        debug!("stage {} complete", Stage::Rendered);

        drop(workspace);
        info!("resume processed, stage {}", Stage::Done);

        Ok(ProcessOutcome {
            original_text,
            enhanced_text,
            original_document: match staged {
                Staged::Form(doc) => Some(doc),
                Staged::File(_) => None,
            },
            enhanced_document,
            initial_score,
            final_score,
            outputs,
        })
    }

    /// Copies finished renders to the output directory. Either every file
    /// arrives or none is left behind.
    fn publish(&self, rendered: &RenderedFiles) -> Result<RenderedFiles> {
        let mut published = RenderedFiles::default();

        if let Err(e) = self.publish_into(rendered, &mut published) {
            for path in published.paths() {
                if let Err(cleanup) = fs::remove_file(path) {
                    warn!("could not remove partial output {}: {}", path.display(), cleanup);
                }
            }
            return Err(e);
        }

        Ok(published)
    }

    fn publish_into(&self, rendered: &RenderedFiles, published: &mut RenderedFiles) -> Result<()> {
        if let Some(source) = &rendered.docx {
            published.docx = Some(self.copy_out(source)?);
        }
        if let Some(source) = &rendered.pdf {
            published.pdf = Some(self.copy_out(source)?);
        }
        Ok(())
    }

    fn copy_out(&self, source: &Path) -> Result<PathBuf> {
        let name = source.file_name().ok_or_else(|| {
            Error::RenderIo(std::io::Error::other(format!(
                "rendered file {} has no name",
                source.display()
            )))
        })?;
        let target = self.renderer.output_dir().join(name);

        // a failed copy must never leave a truncated file under the final name
        let mut staged = NamedTempFile::new_in(self.renderer.output_dir())?;
        io::copy(&mut File::open(source)?, staged.as_file_mut())?;
        staged.persist(&target).map_err(|e| e.error)?;
        Ok(target)
    }

    /// One advice turn. `history` is only read, never stored.
    pub async fn chat(&self, message: &str, history: &[ChatTurn]) -> Result<String> {
        let history = if history.is_empty() {
            "(no earlier messages)".to_string()
        } else {
            history
                .iter()
                .map(|turn| match turn.role {
                    ChatRole::User => format!("User: {}", turn.content),
                    ChatRole::Assistant => format!("Assistant: {}", turn.content),
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        debug!("chat turn with {} characters of history", history.len());
        let prompt = CHAT.render(&[("history", history.as_str()), ("message", message)]);
        let request = CompletionRequest::new(prompt).temperature(CHAT.temperature);

        Ok(self.client.complete(&request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::client::CompletionError;
    use crate::test_support::{ScriptedClient, sample};

    struct Dirs {
        scratch: tempfile::TempDir,
        output: tempfile::TempDir,
    }

    impl Dirs {
        fn new() -> Self {
            Self {
                scratch: tempfile::tempdir().unwrap(),
                output: tempfile::tempdir().unwrap(),
            }
        }

        fn agent(
            &self,
            replies: Vec<std::result::Result<String, CompletionError>>,
        ) -> ResumeAgent<ScriptedClient> {
            ResumeAgent::new(
                ScriptedClient::new(replies),
                Renderer::new(self.output.path()),
                OutputFormats::Docx,
                self.scratch.path(),
            )
        }

        fn count(dir: &Path) -> usize {
            fs::read_dir(dir).unwrap().count()
        }
    }

    fn enhanced() -> ResumeDocument {
        let mut doc = sample();
        doc.summary =
            "Backend engineer with 8 years of experience who led and improved payment systems."
                .into();
        doc.experience[0].responsibilities.push("Reduced costs by $20000".into());
        doc
    }

    #[tokio::test]
    async fn form_pipeline_renders_enhanced_document() {
        let dirs = Dirs::new();
        let agent = dirs.agent(vec![Ok(enhanced().to_json_pretty())]);

        let outcome = agent
            .process_resume(
                ResumeRequest::new(ResumeInput::Form(sample()))
                    .with_style_token("modern")
                    .with_base_name("jane"),
            )
            .await
            .unwrap();

        assert_eq!(outcome.original_document, Some(sample()));
        assert_eq!(outcome.enhanced_document, enhanced());
        assert!(outcome.enhanced_text.contains("who led and improved"));
        assert!(outcome.final_score.score <= 100);
        assert!(outcome.final_score.score >= outcome.initial_score.score);

        let docx = outcome.outputs.docx.unwrap();
        assert_eq!(docx, dirs.output.path().join("jane_modern.docx"));
        assert!(docx.is_file());
        assert_eq!(outcome.outputs.pdf, None);
        assert_eq!(Dirs::count(dirs.scratch.path()), 0);
    }

    #[tokio::test]
    async fn upstream_failure_during_enhancement_leaves_nothing_behind() {
        let dirs = Dirs::new();
        let agent = dirs.agent(vec![Err(CompletionError::Api {
            status: 400,
            message: "bad request".into(),
        })]);

        let err = agent
            .process_resume(ResumeRequest::new(ResumeInput::Form(sample())))
            .await
            .unwrap_err();

        assert_eq!(err.stage, Stage::Enhanced);
        assert!(matches!(err.source, Error::UpstreamFailure(_)));
        assert!(err.to_string().contains("enhanced"));
        assert_eq!(Dirs::count(dirs.output.path()), 0);
        assert_eq!(Dirs::count(dirs.scratch.path()), 0);
    }

    #[tokio::test]
    async fn malformed_enhancement_aborts_the_run() {
        let dirs = Dirs::new();
        let agent = dirs.agent(vec![Ok("I improved your resume!".into())]);

        let err = agent
            .process_resume(ResumeRequest::new(ResumeInput::Form(sample())))
            .await
            .unwrap_err();

        assert_eq!(err.stage, Stage::Enhanced);
        assert!(matches!(err.source, Error::MalformedResponse { .. }));
        assert_eq!(Dirs::count(dirs.output.path()), 0);
    }

    #[tokio::test]
    async fn file_pipeline_enhances_text_then_extracts() {
        let dirs = Dirs::new();
        let input_dir = tempfile::tempdir().unwrap();
        let input = Renderer::new(input_dir.path())
            .render_docx(&sample(), TemplateStyle::Professional, "input")
            .unwrap();

        let agent = dirs.agent(vec![
            Ok("Jane Doe\nSenior Engineer who led the ledger rewrite.".into()),
            Ok(enhanced().to_json_pretty()),
        ]);

        let outcome = agent
            .process_resume(
                ResumeRequest::new(ResumeInput::File(input))
                    .with_job_description("Rust backend role"),
            )
            .await
            .unwrap();

        assert!(outcome.original_text.contains("Jane Doe"));
        assert_eq!(outcome.enhanced_text, "Jane Doe\nSenior Engineer who led the ledger rewrite.");
        assert_eq!(outcome.original_document, None);
        assert_eq!(outcome.enhanced_document, enhanced());
        assert!(outcome.outputs.docx.unwrap().is_file());

        let requests = agent.client().requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].prompt.contains("Rust backend role"));
        assert!(requests[1].prompt.contains("who led the ledger rewrite"));
        assert_eq!(Dirs::count(dirs.scratch.path()), 0);
    }

    #[tokio::test]
    async fn unsupported_upload_fails_at_extraction() {
        let dirs = Dirs::new();
        let agent = dirs.agent(vec![]);

        let err = agent
            .process_resume(ResumeRequest::new(ResumeInput::Upload {
                file_name: "resume.txt".into(),
                bytes: b"plain text".to_vec(),
            }))
            .await
            .unwrap_err();

        assert_eq!(err.stage, Stage::Extracted);
        assert!(matches!(err.source, Error::UnsupportedInputType(_)));
        assert!(agent.client().requests().is_empty());
        assert_eq!(Dirs::count(dirs.scratch.path()), 0);
    }

    #[test]
    fn failed_publish_leaves_output_directory_clean() {
        let dirs = Dirs::new();
        let agent = dirs.agent(Vec::new());
        let docx = dirs.scratch.path().join("jane_professional.docx");
        fs::write(&docx, b"docx bytes").unwrap();

        let err = agent
            .publish(&RenderedFiles {
                docx: Some(docx),
                pdf: Some(dirs.scratch.path().join("jane_professional.pdf")),
            })
            .unwrap_err();

        assert!(matches!(err, Error::RenderIo(_)));
        assert_eq!(Dirs::count(dirs.output.path()), 0);
    }

    #[tokio::test]
    async fn blank_form_fails_before_any_model_call() {
        let dirs = Dirs::new();
        let agent = dirs.agent(vec![Ok(enhanced().to_json_pretty())]);

        let err = agent
            .process_resume(ResumeRequest::new(ResumeInput::Form(ResumeDocument::default())))
            .await
            .unwrap_err();

        assert_eq!(err.stage, Stage::Extracted);
        assert!(matches!(err.source, Error::EmptyInput(_)));
        assert!(agent.client().requests().is_empty());
    }

    #[tokio::test]
    async fn missing_output_directory_fails_at_rendering() {
        let scratch = tempfile::tempdir().unwrap();
        let agent = ResumeAgent::new(
            ScriptedClient::new(vec![Ok(enhanced().to_json_pretty())]),
            Renderer::new(scratch.path().join("missing")),
            OutputFormats::Docx,
            scratch.path().join("runs"),
        );

        let err = agent
            .process_resume(ResumeRequest::new(ResumeInput::Form(sample())))
            .await
            .unwrap_err();

        assert_eq!(err.stage, Stage::Rendered);
        assert!(matches!(err.source, Error::RenderIo(_)));
        assert_eq!(Dirs::count(&scratch.path().join("runs")), 0);
    }

    #[tokio::test]
    async fn chat_threads_history_into_prompt() {
        let dirs = Dirs::new();
        let agent = dirs.agent(vec![Ok("Use the academic template.".into())]);
        let history = vec![
            ChatTurn::user("I am applying for a lecturer post."),
            ChatTurn::assistant("Great, tell me more."),
        ];

        let reply = agent.chat("Which template?", &history).await.unwrap();

        assert_eq!(reply, "Use the academic template.");
        let prompt = &agent.client().requests()[0].prompt;
        assert!(prompt.contains("User: I am applying for a lecturer post.\nAssistant: Great, tell me more."));
        assert!(prompt.contains("User: Which template?"));
    }

    #[test]
    fn unknown_style_token_falls_back() {
        let request = ResumeRequest::new(ResumeInput::Form(sample())).with_style_token("fancy");
        assert_eq!(request.style, TemplateStyle::Professional);
    }

    #[test]
    fn stages_are_ordered() {
        assert!(Stage::Received < Stage::Extracted);
        assert!(Stage::ScoredFinal < Stage::Rendered);
        assert_eq!(Stage::ScoredInitial.to_string(), "scored-initial");
    }
}
