//! WordprocessingML backend.
//!
//! The package is assembled in memory and written in one go, so a failed
//! write never leaves a half-built `.docx` behind.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use log::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::Result;
use crate::render::layout::{Block, Layout, Run, Tone};
use crate::render::style::{Alignment, HeadingDecoration, Rgb, StyleDescriptor};

static CONTENT_TYPES: &str = include_str!("ooxml/content_types.xml");
static ROOT_RELS: &str = include_str!("ooxml/rels.xml");
static DOCUMENT_RELS: &str = include_str!("ooxml/document.xml.rels");
static STYLES: &str = include_str!("ooxml/styles.xml");
static DOCUMENT: &str = include_str!("ooxml/document.xml");

pub fn write_docx(layout: &Layout, style: &StyleDescriptor, path: &Path) -> Result<()> {
    let package = build_package(layout, style)?;
    fs::write(path, &package)?;

    debug!("wrote {} bytes to {}", package.len(), path.display());
    Ok(())
}

pub fn build_package(layout: &Layout, style: &StyleDescriptor) -> Result<Vec<u8>> {
    let document = document_xml(layout, style);

    // fixed timestamp: identical input must give identical bytes
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS),
        ("word/styles.xml", STYLES),
        ("word/document.xml", document.as_str()),
    ] {
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

pub fn document_xml(layout: &Layout, style: &StyleDescriptor) -> String {
    let body = layout
        .blocks()
        .map(|block| paragraph(block, style))
        .collect::<Vec<_>>()
        .join("\n");

    DOCUMENT
        .replace("<<BODY>>", &body)
        .replace("<<MARGIN_TOP>>", &style.margins.top.to_string())
        .replace("<<MARGIN_RIGHT>>", &style.margins.right.to_string())
        .replace("<<MARGIN_BOTTOM>>", &style.margins.bottom.to_string())
        .replace("<<MARGIN_LEFT>>", &style.margins.left.to_string())
}

/// Paragraph properties. Children are emitted in schema order.
#[derive(Default)]
struct Para {
    border: Option<Rgb>,
    shading: Option<Rgb>,
    before: u32,
    after: u32,
    indent: Option<(u32, u32)>,
    justify: Option<&'static str>,
}

impl Para {
    fn xml(&self) -> String {
        let mut out = String::from("<w:pPr>");
        if let Some(color) = self.border {
            out.push_str(&format!(
                "<w:pBdr><w:bottom w:val=\"single\" w:sz=\"6\" w:space=\"1\" w:color=\"{}\"/></w:pBdr>",
                color.hex()
            ));
        }
        if let Some(fill) = self.shading {
            out.push_str(&format!(
                "<w:shd w:val=\"clear\" w:color=\"auto\" w:fill=\"{}\"/>",
                fill.hex()
            ));
        }
        out.push_str(&format!(
            "<w:spacing w:before=\"{}\" w:after=\"{}\"/>",
            self.before, self.after
        ));
        if let Some((left, hanging)) = self.indent {
            out.push_str(&format!(
                "<w:ind w:left=\"{}\" w:hanging=\"{}\"/>",
                left, hanging
            ));
        }
        if let Some(jc) = self.justify {
            out.push_str(&format!("<w:jc w:val=\"{}\"/>", jc));
        }
        out.push_str("</w:pPr>");
        out
    }
}

fn run(text: &str, bold: bool, italic: bool, color: Rgb, size: u32) -> String {
    let mut props = String::new();
    if bold {
        props.push_str("<w:b/>");
    }
    if italic {
        props.push_str("<w:i/>");
    }
    props.push_str(&format!(
        "<w:color w:val=\"{}\"/><w:sz w:val=\"{}\"/><w:szCs w:val=\"{}\"/>",
        color.hex(),
        size,
        size
    ));

    format!(
        "<w:r><w:rPr>{}</w:rPr><w:t xml:space=\"preserve\">{}</w:t></w:r>",
        props,
        escape_xml(text)
    )
}

fn tone_color(tone: Tone, style: &StyleDescriptor) -> Rgb {
    match tone {
        Tone::Heading => style.palette.heading,
        Tone::Accent => style.palette.accent,
        Tone::Body => style.palette.body,
        Tone::Muted => style.palette.muted,
    }
}

fn alignment(style: &StyleDescriptor) -> &'static str {
    match style.header_alignment {
        Alignment::Left => "left",
        Alignment::Center => "center",
    }
}

fn paragraph(block: &Block, style: &StyleDescriptor) -> String {
    let sizes = &style.sizes;

    let (props, runs) = match block {
        Block::Name(name) => {
            let color = style.header_banner.map_or(style.palette.heading, |_| Rgb::WHITE);
            let props = Para {
                shading: style.header_banner,
                before: 0,
                after: 60,
                justify: Some(alignment(style)),
                ..Default::default()
            };
            (props, run(name, true, false, color, sizes.name))
        }
        Block::Contact(contact) => {
            let color = style.header_banner.map_or(style.palette.accent, |_| Rgb::WHITE);
            let props = Para {
                shading: style.header_banner,
                before: 0,
                after: 160,
                justify: Some(alignment(style)),
                ..Default::default()
            };
            (props, run(contact, false, false, color, sizes.contact))
        }
        Block::Heading(title) => {
            let mut props = Para {
                before: 240,
                after: 100,
                ..Default::default()
            };
            match style.decoration {
                HeadingDecoration::None => {}
                HeadingDecoration::BottomBorder => props.border = Some(style.palette.heading),
                HeadingDecoration::Shaded(fill) => props.shading = Some(fill),
            }
            (
                props,
                run(title, true, false, style.palette.heading, sizes.heading),
            )
        }
        Block::Paragraph {
            runs,
            justify,
            space_before,
        } => {
            let props = Para {
                before: if *space_before { 120 } else { 0 },
                after: 40,
                justify: justify.then_some("both"),
                ..Default::default()
            };
            let runs = runs
                .iter()
                .map(|r: &Run| {
                    run(
                        &r.text,
                        r.bold,
                        r.italic,
                        tone_color(r.tone, style),
                        sizes.body,
                    )
                })
                .collect::<String>();
            (props, runs)
        }
        Block::Bullet(text) => {
            let props = Para {
                before: 0,
                after: 20,
                indent: Some((360, 240)),
                ..Default::default()
            };
            let glyph = format!("{} ", style.bullet.glyph());
            let runs = run(&glyph, false, false, style.palette.accent, sizes.body)
                + &run(text, false, false, style.palette.body, sizes.body);
            (props, runs)
        }
    };

    format!("<w:p>{}{}</w:p>", props.xml(), runs)
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // control characters are not allowed in XML 1.0
            c if c.is_control() && !matches!(c, '\t' | '\n' | '\r') => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::extract_text;
    use crate::render::layout::layout;
    use crate::render::style::{ACADEMIC, MODERN, PROFESSIONAL};
    use crate::test_support::sample;

    fn xml_for(style: &StyleDescriptor) -> String {
        document_xml(&layout(&sample(), style), style)
    }

    #[test]
    fn headings_follow_style_order() {
        let xml = xml_for(&MODERN);
        let skills = xml.find("CORE COMPETENCIES").unwrap();
        let experience = xml.find("PROFESSIONAL EXPERIENCE").unwrap();
        let education = xml.find(">EDUCATION<").unwrap();
        assert!(skills < experience && experience < education);

        let xml = xml_for(&PROFESSIONAL);
        assert!(xml.find(">EDUCATION<").unwrap() < xml.find("WORK EXPERIENCE").unwrap());
    }

    #[test]
    fn decoration_follows_style() {
        let modern = xml_for(&MODERN);
        assert!(modern.contains("w:fill=\"E8F4F8\""));
        assert!(!modern.contains("<w:pBdr>"));

        let academic = xml_for(&ACADEMIC);
        assert!(academic.contains("<w:pBdr><w:bottom"));
        assert!(!academic.contains("<w:shd"));

        let professional = xml_for(&PROFESSIONAL);
        assert!(!professional.contains("<w:pBdr>"));
        assert!(!professional.contains("<w:shd"));
    }

    #[test]
    fn margins_come_from_the_style() {
        let xml = xml_for(&ACADEMIC);
        assert!(xml.contains(
            "<w:pgMar w:top=\"1440\" w:right=\"1440\" w:bottom=\"1440\" w:left=\"1440\""
        ));
    }

    #[test]
    fn modern_banner_draws_white_header() {
        let xml = xml_for(&MODERN);
        assert!(xml.contains("w:fill=\"1A4D7E\""));
        assert!(xml.contains("<w:color w:val=\"FFFFFF\"/><w:sz w:val=\"56\"/>"));
    }

    #[test]
    fn muted_runs_use_the_muted_colour() {
        let xml = xml_for(&PROFESSIONAL);
        assert!(xml.contains(
            "<w:i/><w:color w:val=\"666666\"/><w:sz w:val=\"21\"/><w:szCs w:val=\"21\"/></w:rPr><w:t xml:space=\"preserve\">2019 - present"
        ));
    }

    #[test]
    fn text_is_escaped() {
        let mut doc = sample();
        doc.summary = "R&D <lead> \"ops\"".into();
        let xml = document_xml(&layout(&doc, &PROFESSIONAL), &PROFESSIONAL);

        assert!(xml.contains("R&amp;D &lt;lead&gt; &quot;ops&quot;"));
        assert_eq!(escape_xml("a\u{1}b"), "ab");
    }

    #[test]
    fn same_input_gives_identical_bytes() {
        let doc = sample();
        let first = build_package(&layout(&doc, &MODERN), &MODERN).unwrap();
        let second = build_package(&layout(&doc, &MODERN), &MODERN).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("cv.docx");
        let err = write_docx(&layout(&sample(), &PROFESSIONAL), &PROFESSIONAL, &path).unwrap_err();
        assert!(matches!(err, crate::error::Error::RenderIo(_)));
    }

    #[test]
    fn written_package_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.docx");
        write_docx(&layout(&sample(), &ACADEMIC), &ACADEMIC, &path).unwrap();

        let text = extract_text(&path).unwrap();
        assert!(text.starts_with("Jane Doe\njane@example.com | 555-123-4567 | Berlin"));
        assert!(text.contains("Senior Engineer, Acme"));
        assert!(text.contains("– Led the ledger rewrite"));
    }
}
