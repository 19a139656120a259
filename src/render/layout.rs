//! Backend-neutral resume layout.
//!
//! [`layout`] walks the style's section order and emits styled blocks for
//! every section that has content. The DOCX and LaTeX backends only translate
//! these blocks; neither makes layout decisions of its own.

use crate::models::resume::{Education, Experience, PersonalInfo, Project, ResumeDocument};
use crate::render::style::{SectionKind, SkillsLayout, StyleDescriptor};

/// Which palette colour a run is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Heading,
    Accent,
    Body,
    Muted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub tone: Tone,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Run {
            text: text.into(),
            bold: false,
            italic: false,
            tone: Tone::Body,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Run {
            bold: true,
            ..Run::plain(text)
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Run {
            italic: true,
            ..Run::plain(text)
        }
    }

    pub fn tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Name(String),
    Contact(String),
    Heading(String),
    Paragraph {
        runs: Vec<Run>,
        justify: bool,
        /// First line of an entry; backends put extra space above it.
        space_before: bool,
    },
    Bullet(String),
}

impl Block {
    fn line(runs: Vec<Run>) -> Self {
        Block::Paragraph {
            runs,
            justify: false,
            space_before: false,
        }
    }

    fn text(text: &str) -> Self {
        Block::Paragraph {
            runs: vec![Run::plain(text.trim())],
            justify: true,
            space_before: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaidOutSection {
    pub kind: SectionKind,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub sections: Vec<LaidOutSection>,
}

impl Layout {
    pub fn kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(|s| s.kind).collect()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.sections.iter().flat_map(|s| s.blocks.iter())
    }
}

pub fn layout(doc: &ResumeDocument, style: &StyleDescriptor) -> Layout {
    let sections = style
        .section_order
        .iter()
        .filter_map(|&kind| {
            let body = match kind {
                SectionKind::Header => header(&doc.personal_info, style),
                SectionKind::Summary => summary(&doc.summary),
                SectionKind::Education => education(&doc.education),
                SectionKind::Skills => skills(&doc.skills, style),
                SectionKind::Experience => experience(&doc.experience, style),
                SectionKind::Projects => projects(&doc.projects),
            }?;

            let mut blocks = Vec::with_capacity(body.len() + 1);
            if let Some(title) = style.titles.get(kind) {
                blocks.push(Block::Heading(title.to_string()));
            }
            blocks.extend(body);

            Some(LaidOutSection { kind, blocks })
        })
        .collect();

    Layout { sections }
}

/// Joins the non-blank parts with `separator`, so a missing field never
/// leaves a dangling separator behind.
pub fn join_present(parts: &[&str], separator: &str) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

fn non_empty(blocks: Vec<Block>) -> Option<Vec<Block>> {
    if blocks.is_empty() { None } else { Some(blocks) }
}

fn header(info: &PersonalInfo, style: &StyleDescriptor) -> Option<Vec<Block>> {
    let mut blocks = Vec::new();

    let name = info.name.trim();
    if !name.is_empty() {
        blocks.push(Block::Name(if style.uppercase_name {
            name.to_uppercase()
        } else {
            name.to_string()
        }));
    }

    let contact = join_present(&info.contact_fields(), style.contact_separator);
    if !contact.is_empty() {
        blocks.push(Block::Contact(contact));
    }

    non_empty(blocks)
}

fn summary(summary: &str) -> Option<Vec<Block>> {
    if summary.trim().is_empty() {
        return None;
    }
    Some(vec![Block::text(summary)])
}

fn education(entries: &[Education]) -> Option<Vec<Block>> {
    let mut blocks = Vec::new();

    for entry in entries.iter().filter(|e| !e.is_blank()) {
        let mut entry_blocks = Vec::new();

        let degree = entry.degree.trim();
        if !degree.is_empty() {
            entry_blocks.push(Block::line(vec![Run::bold(degree).tone(Tone::Heading)]));
        }
        let details = join_present(&[entry.institution.as_str(), entry.year.as_str()], " • ");
        if !details.is_empty() {
            entry_blocks.push(Block::line(vec![Run::italic(details).tone(Tone::Muted)]));
        }
        let gpa = entry.gpa.trim();
        if !gpa.is_empty() {
            entry_blocks.push(Block::line(vec![Run::plain(format!("GPA: {}", gpa))]));
        }

        push_entry(&mut blocks, entry_blocks);
    }

    non_empty(blocks)
}

fn skills(skills: &[String], style: &StyleDescriptor) -> Option<Vec<Block>> {
    let skills: Vec<&str> = skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if skills.is_empty() {
        return None;
    }

    let runs = match style.skills_layout {
        SkillsLayout::CommaList => vec![Run::plain(skills.join(", "))],
        SkillsLayout::Inline(separator) => {
            let mut runs = Vec::with_capacity(skills.len() * 2);
            for (i, skill) in skills.iter().enumerate() {
                if i > 0 {
                    runs.push(Run::plain(separator));
                }
                runs.push(Run::bold(*skill).tone(Tone::Heading));
            }
            runs
        }
    };

    Some(vec![Block::line(runs)])
}

fn experience(entries: &[Experience], style: &StyleDescriptor) -> Option<Vec<Block>> {
    let mut blocks = Vec::new();

    for entry in entries.iter().filter(|e| !e.is_blank()) {
        let mut entry_blocks = Vec::new();

        let title = entry.title.trim();
        let company = entry.company.trim();
        let mut heading = Vec::new();
        if !title.is_empty() {
            heading.push(Run::bold(title).tone(Tone::Heading));
        }
        if !company.is_empty() {
            if !heading.is_empty() {
                heading.push(Run::plain(style.title_connector));
            }
            heading.push(Run::bold(company).tone(Tone::Accent));
        }
        if !heading.is_empty() {
            entry_blocks.push(Block::line(heading));
        }

        let duration = entry.duration.trim();
        if !duration.is_empty() {
            entry_blocks.push(Block::line(vec![Run::italic(duration).tone(Tone::Muted)]));
        }
        if !entry.description.trim().is_empty() {
            entry_blocks.push(Block::text(&entry.description));
        }
        entry_blocks.extend(
            entry
                .responsibilities
                .iter()
                .map(|r| r.trim())
                .filter(|r| !r.is_empty())
                .map(|r| Block::Bullet(r.to_string())),
        );

        push_entry(&mut blocks, entry_blocks);
    }

    non_empty(blocks)
}

fn projects(entries: &[Project]) -> Option<Vec<Block>> {
    let mut blocks = Vec::new();

    for entry in entries.iter().filter(|p| !p.is_blank()) {
        let mut entry_blocks = Vec::new();

        let name = entry.name.trim();
        if !name.is_empty() {
            entry_blocks.push(Block::line(vec![Run::bold(name).tone(Tone::Heading)]));
        }
        if !entry.description.trim().is_empty() {
            entry_blocks.push(Block::text(&entry.description));
        }

        push_entry(&mut blocks, entry_blocks);
    }

    non_empty(blocks)
}

/// Appends one entry's blocks, flagging its first paragraph as an entry start.
fn push_entry(blocks: &mut Vec<Block>, mut entry: Vec<Block>) {
    if let Some(Block::Paragraph { space_before, .. }) = entry.first_mut() {
        *space_before = true;
    }
    blocks.append(&mut entry);
}
