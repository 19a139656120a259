use crate::render::layout::{Block, Layout, Run, Tone};
use crate::render::style::{Alignment, Bullet, StyleDescriptor, twips_to_inches};

static TEMPLATE: &str = include_str!("template.tex");

/// Turns a laid-out resume into a LaTeX document for the PDF backend.
///
/// Heading decorations other than colour and weight are not reproduced here;
/// borders and shading only exist in the DOCX output.
pub struct LatexResumeAssembler<'a> {
    layout: &'a Layout,
    style: &'a StyleDescriptor,
}

impl<'a> LatexResumeAssembler<'a> {
    pub fn new(layout: &'a Layout, style: &'a StyleDescriptor) -> Self {
        Self { layout, style }
    }

    pub fn assemble(&self) -> String {
        let (size, leading) = Self::font_size(self.style.sizes.body);

        TEMPLATE
            .replace("<<GEOMETRY>>", &self.geometry())
            .replace("<<COLORS>>", &self.colors())
            .replace("<<BODY_SIZE>>", &size)
            .replace("<<BODY_LEADING>>", &leading)
            .replace("<<BODY>>", &self.body())
    }

    fn geometry(&self) -> String {
        let m = &self.style.margins;
        format!(
            "top={:.2}in,bottom={:.2}in,left={:.2}in,right={:.2}in",
            twips_to_inches(m.top),
            twips_to_inches(m.bottom),
            twips_to_inches(m.left),
            twips_to_inches(m.right)
        )
    }

    fn colors(&self) -> String {
        let p = &self.style.palette;
        [
            ("heading", p.heading),
            ("accent", p.accent),
            ("body", p.body),
            ("muted", p.muted),
        ]
            .iter()
            .map(|(name, rgb)| format!("\\definecolor{{{}}}{{HTML}}{{{}}}", name, rgb.hex()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Half-points to a `\fontsize` pair with 120% leading.
    fn font_size(half_points: u32) -> (String, String) {
        let pt = f64::from(half_points) / 2.0;
        (format!("{:.1}pt", pt), format!("{:.1}pt", pt * 1.2))
    }

    fn body(&self) -> String {
        let mut out = String::new();
        let mut in_list = false;

        for block in self.layout.blocks() {
            let is_bullet = matches!(block, Block::Bullet(_));
            if is_bullet && !in_list {
                out.push_str(&format!(
                    "\\begin{{itemize}}[leftmargin=1.2em,label={{{}}},noitemsep,topsep=1pt]\n",
                    Self::bullet_label(self.style.bullet)
                ));
            } else if !is_bullet && in_list {
                out.push_str("\\end{itemize}\n");
            }
            in_list = is_bullet;

            out.push_str(&self.block(block));
            out.push('\n');
        }

        if in_list {
            out.push_str("\\end{itemize}\n");
        }

        out
    }

    fn block(&self, block: &Block) -> String {
        let sizes = &self.style.sizes;

        match block {
            Block::Name(name) => {
                let (size, leading) = Self::font_size(sizes.name);
                self.header_line(format!(
                    "{{\\fontsize{{{}}}{{{}}}\\selectfont\\bfseries\\color{{heading}} {}}}",
                    size,
                    leading,
                    Self::escape_latex(name)
                ))
            }
            Block::Contact(contact) => {
                let (size, leading) = Self::font_size(sizes.contact);
                self.header_line(format!(
                    "{{\\fontsize{{{}}}{{{}}}\\selectfont\\color{{accent}} {}}}",
                    size,
                    leading,
                    Self::escape_latex(contact)
                ))
            }
            Block::Heading(title) => {
                let (size, leading) = Self::font_size(sizes.heading);
                format!(
                    "\\vspace{{8pt}}{{\\fontsize{{{}}}{{{}}}\\selectfont\\bfseries\\color{{heading}} {}}}\\par\\vspace{{3pt}}",
                    size,
                    leading,
                    Self::escape_latex(title)
                )
            }
            Block::Paragraph {
                runs,
                justify,
                space_before,
            } => {
                let mut out = String::new();
                if *space_before {
                    out.push_str("\\vspace{4pt}");
                }
                let text = Self::runs(runs);
                if *justify {
                    out.push_str(&format!("{}\\par", text));
                } else {
                    out.push_str(&format!("{{\\raggedright {}\\par}}", text));
                }
                out
            }
            Block::Bullet(text) => format!("    \\item{{}} {}", Self::escape_latex(text)),
        }
    }

    fn header_line(&self, content: String) -> String {
        match self.style.header_alignment {
            Alignment::Center => format!("{{\\centering {}\\par}}\\vspace{{2pt}}", content),
            Alignment::Left => format!("{}\\par\\vspace{{2pt}}", content),
        }
    }

    fn runs(runs: &[Run]) -> String {
        runs.iter()
            .map(|run| {
                let mut text = Self::escape_latex(&run.text);
                if run.bold {
                    text = format!("\\textbf{{{}}}", text);
                }
                if run.italic {
                    text = format!("\\textit{{{}}}", text);
                }
                match run.tone {
                    Tone::Heading => format!("\\textcolor{{heading}}{{{}}}", text),
                    Tone::Accent => format!("\\textcolor{{accent}}{{{}}}", text),
                    Tone::Muted => format!("\\textcolor{{muted}}{{{}}}", text),
                    Tone::Body => text,
                }
            })
            .collect()
    }

    fn bullet_label(bullet: Bullet) -> &'static str {
        match bullet {
            Bullet::Dot => "\\textbullet{}",
            Bullet::Triangle => "$\\triangleright$",
            Bullet::Dash => "\\textendash{}",
        }
    }

    /// Escapes TeX specials. Inline `**bold**` and `` `code` `` markup, which
    /// model output tends to contain, is turned into the matching commands.
    pub fn escape_latex(text: &str) -> String {
        let mut result = String::new();
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '*' && chars.peek() == Some(&'*') {
                chars.next();
                let mut bold_text = String::new();
                let mut found_end = false;

                while let Some(bc) = chars.next() {
                    if bc == '*' && chars.peek() == Some(&'*') {
                        chars.next();
                        found_end = true;
                        break;
                    }
                    bold_text.push(bc);
                }

                if found_end {
                    result.push_str(&format!("\\textbf{{{}}}", Self::escape_latex(&bold_text)));
                } else {
                    result.push_str("**");
                    result.push_str(&Self::escape_latex(&bold_text));
                }
            } else if c == '`' {
                let mut code_text = String::new();
                let mut found_end = false;

                for bc in chars.by_ref() {
                    if bc == '`' {
                        found_end = true;
                        break;
                    }
                    code_text.push(bc);
                }

                if found_end {
                    result.push_str(&format!("\\texttt{{{}}}", Self::escape_latex(&code_text)));
                } else {
                    result.push('`');
                    result.push_str(&Self::escape_latex(&code_text));
                }
            } else {
                match c {
                    '&' => result.push_str("\\&"),
                    '%' => result.push_str("\\%"),
                    '$' => result.push_str("\\$"),
                    '#' => result.push_str("\\#"),
                    '_' => result.push_str("\\_"),
                    '{' => result.push_str("\\{"),
                    '}' => result.push_str("\\}"),
                    '^' => result.push_str("\\textasciicircum{}"),
                    '~' => result.push_str("\\textasciitilde{}"),
                    '\\' => result.push_str("\\textbackslash{}"),
                    '•' => result.push_str("\\textbullet{}"),
                    '▸' => result.push_str("$\\triangleright$"),
                    '–' => result.push_str("\\textendash{}"),
                    '—' => result.push_str("\\textemdash{}"),
                    _ => result.push(c),
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::layout::layout;
    use crate::render::style::{ACADEMIC, MODERN, PROFESSIONAL, TemplateStyle};
    use crate::test_support::sample;
    use pretty_assertions::assert_eq;

    fn source(style: &StyleDescriptor) -> String {
        let laid_out = layout(&sample(), style);
        LatexResumeAssembler::new(&laid_out, style).assemble()
    }

    #[test]
    fn escapes_specials() {
        assert_eq!(
            LatexResumeAssembler::escape_latex("50% of $10 & #1_a {x} ~ ^ \\"),
            "50\\% of \\$10 \\& \\#1\\_a \\{x\\} \\textasciitilde{} \\textasciicircum{} \\textbackslash{}"
        );
    }

    #[test]
    fn honours_inline_markup() {
        assert_eq!(
            LatexResumeAssembler::escape_latex("**Rust** and `cargo_test`"),
            "\\textbf{Rust} and \\texttt{cargo\\_test}"
        );
        assert_eq!(LatexResumeAssembler::escape_latex("**open"), "**open");
    }

    #[test]
    fn glyphs_become_commands() {
        assert_eq!(
            LatexResumeAssembler::escape_latex("a • b ▸ c – d — e"),
            "a \\textbullet{} b $\\triangleright$ c \\textendash{} d \\textemdash{} e"
        );
    }

    #[test]
    fn sources_are_plain_ascii() {
        for style in TemplateStyle::ALL {
            let tex = source(style.descriptor());
            assert!(tex.is_ascii(), "{} emitted non-ASCII source", style);
        }
    }

    #[test]
    fn margins_and_colours_follow_style() {
        let tex = source(&ACADEMIC);
        assert!(tex.contains("top=1.00in,bottom=1.00in,left=1.00in,right=1.00in"));

        let tex = source(&MODERN);
        assert!(tex.contains("top=0.40in,bottom=0.40in,left=0.60in,right=0.60in"));
        assert!(tex.contains("\\definecolor{heading}{HTML}{1A4D7E}"));
    }

    #[test]
    fn bullets_share_one_list_per_entry() {
        let tex = source(&MODERN);
        assert_eq!(tex.matches("\\begin{itemize}").count(), 1);
        assert_eq!(tex.matches("\\end{itemize}").count(), 1);
        assert!(tex.contains("label={$\\triangleright$}"));
        assert!(tex.contains("\\item{} Reduced p99 by 40\\%"));
    }

    #[test]
    fn muted_colour_is_defined_and_used() {
        let tex = source(&ACADEMIC);
        assert!(tex.contains("\\definecolor{muted}{HTML}{555555}"));
        assert!(tex.contains("\\textcolor{muted}{\\textit{2019 - present}}"));
    }

    #[test]
    fn bracketed_bullet_is_not_an_item_label() {
        let mut doc = sample();
        doc.experience[0].responsibilities = vec!["[draft] Wrote the RFC".into()];
        let laid_out = layout(&doc, &PROFESSIONAL);
        let tex = LatexResumeAssembler::new(&laid_out, &PROFESSIONAL).assemble();

        assert!(tex.contains("\\item{} [draft] Wrote the RFC"));
        assert!(!tex.contains("\\item ["));
    }

    #[test]
    fn headings_follow_section_order() {
        let tex = source(&PROFESSIONAL);
        let summary = tex.find("PROFESSIONAL SUMMARY").unwrap();
        let skills = tex.find("SKILLS").unwrap();
        let projects = tex.find("PROJECTS").unwrap();
        assert!(summary < skills && skills < projects);
    }

    #[test]
    fn trailing_bullets_close_their_list() {
        let mut doc = sample();
        doc.projects.clear();
        doc.skills.clear();
        doc.education.clear();
        let laid_out = layout(&doc, &PROFESSIONAL);
        let tex = LatexResumeAssembler::new(&laid_out, &PROFESSIONAL).assemble();

        assert!(tex.contains("\\item{} Reduced p99 by 40\\%\n\\end{itemize}"));
    }
}
