//! Visual template descriptors.
//!
//! The three templates share one layout engine; everything that makes them
//! look different lives in a [`StyleDescriptor`].

use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateStyle {
    #[default]
    Professional,
    Modern,
    Academic,
}

impl TemplateStyle {
    pub const ALL: [TemplateStyle; 3] = [
        TemplateStyle::Professional,
        TemplateStyle::Modern,
        TemplateStyle::Academic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateStyle::Professional => "professional",
            TemplateStyle::Modern => "modern",
            TemplateStyle::Academic => "academic",
        }
    }

    pub fn from_token(token: &str) -> Result<Self> {
        match token.trim().to_lowercase().as_str() {
            "professional" => Ok(TemplateStyle::Professional),
            "modern" => Ok(TemplateStyle::Modern),
            "academic" => Ok(TemplateStyle::Academic),
            _ => Err(Error::InvalidTemplateStyle(token.to_string())),
        }
    }

    /// Like [`TemplateStyle::from_token`], but an unknown token falls back to
    /// the professional template instead of failing.
    pub fn resolve(token: &str) -> Self {
        Self::from_token(token).unwrap_or_else(|e| {
            warn!("{}, falling back to professional", e);
            TemplateStyle::default()
        })
    }

    pub fn descriptor(&self) -> &'static StyleDescriptor {
        match self {
            TemplateStyle::Professional => &PROFESSIONAL,
            TemplateStyle::Modern => &MODERN,
            TemplateStyle::Academic => &ACADEMIC,
        }
    }
}

impl fmt::Display for TemplateStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_token(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Header,
    Summary,
    Education,
    Skills,
    Experience,
    Projects,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Page margins in twips (1/1440 inch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margins {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl Margins {
    pub const fn uniform(twips: u32) -> Self {
        Margins {
            top: twips,
            bottom: twips,
            left: twips,
            right: twips,
        }
    }
}

pub fn twips_to_inches(twips: u32) -> f64 {
    f64::from(twips) / 1440.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub heading: Rgb,
    pub accent: Rgb,
    pub body: Rgb,
    /// Secondary details such as dates and institutions.
    pub muted: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingDecoration {
    None,
    BottomBorder,
    Shaded(Rgb),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillsLayout {
    CommaList,
    Inline(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bullet {
    Dot,
    Triangle,
    Dash,
}

impl Bullet {
    pub fn glyph(&self) -> char {
        match self {
            Bullet::Dot => '•',
            Bullet::Triangle => '▸',
            Bullet::Dash => '–',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionTitles {
    pub summary: &'static str,
    pub education: &'static str,
    pub skills: &'static str,
    pub experience: &'static str,
    pub projects: &'static str,
}

impl SectionTitles {
    pub fn get(&self, kind: SectionKind) -> Option<&'static str> {
        match kind {
            SectionKind::Header => None,
            SectionKind::Summary => Some(self.summary),
            SectionKind::Education => Some(self.education),
            SectionKind::Skills => Some(self.skills),
            SectionKind::Experience => Some(self.experience),
            SectionKind::Projects => Some(self.projects),
        }
    }
}

/// Font sizes in half-points, the unit WordprocessingML uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSizes {
    pub name: u32,
    pub heading: u32,
    pub body: u32,
    pub contact: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleDescriptor {
    pub style: TemplateStyle,
    pub margins: Margins,
    pub palette: Palette,
    pub decoration: HeadingDecoration,
    pub section_order: [SectionKind; 6],
    pub header_alignment: Alignment,
    /// Fill behind the name and contact lines; text is drawn white on it.
    pub header_banner: Option<Rgb>,
    pub uppercase_name: bool,
    pub contact_separator: &'static str,
    pub skills_layout: SkillsLayout,
    pub title_connector: &'static str,
    pub bullet: Bullet,
    pub titles: SectionTitles,
    pub sizes: FontSizes,
}

pub const PROFESSIONAL: StyleDescriptor = StyleDescriptor {
    style: TemplateStyle::Professional,
    margins: Margins {
        top: 720,
        bottom: 720,
        left: 1080,
        right: 1080,
    },
    palette: Palette {
        heading: Rgb::BLACK,
        accent: Rgb(0x33, 0x33, 0x33),
        body: Rgb::BLACK,
        muted: Rgb(0x66, 0x66, 0x66),
    },
    decoration: HeadingDecoration::None,
    section_order: [
        SectionKind::Header,
        SectionKind::Summary,
        SectionKind::Education,
        SectionKind::Skills,
        SectionKind::Experience,
        SectionKind::Projects,
    ],
    header_alignment: Alignment::Center,
    header_banner: None,
    uppercase_name: false,
    contact_separator: " | ",
    skills_layout: SkillsLayout::CommaList,
    title_connector: " | ",
    bullet: Bullet::Dot,
    titles: SectionTitles {
        summary: "PROFESSIONAL SUMMARY",
        education: "EDUCATION",
        skills: "SKILLS",
        experience: "WORK EXPERIENCE",
        projects: "PROJECTS",
    },
    sizes: FontSizes {
        name: 40,
        heading: 24,
        body: 21,
        contact: 20,
    },
};

pub const MODERN: StyleDescriptor = StyleDescriptor {
    style: TemplateStyle::Modern,
    margins: Margins {
        top: 576,
        bottom: 576,
        left: 864,
        right: 864,
    },
    palette: Palette {
        heading: Rgb(0x1A, 0x4D, 0x7E),
        accent: Rgb(0xE6, 0x5A, 0x5A),
        body: Rgb(0x3C, 0x3C, 0x3C),
        muted: Rgb(0x7F, 0x7F, 0x7F),
    },
    decoration: HeadingDecoration::Shaded(Rgb(0xE8, 0xF4, 0xF8)),
    section_order: [
        SectionKind::Header,
        SectionKind::Summary,
        SectionKind::Skills,
        SectionKind::Experience,
        SectionKind::Projects,
        SectionKind::Education,
    ],
    header_alignment: Alignment::Center,
    header_banner: Some(Rgb(0x1A, 0x4D, 0x7E)),
    uppercase_name: true,
    contact_separator: "  •  ",
    skills_layout: SkillsLayout::Inline(" • "),
    title_connector: " @ ",
    bullet: Bullet::Triangle,
    titles: SectionTitles {
        summary: "PROFESSIONAL PROFILE",
        education: "EDUCATION",
        skills: "CORE COMPETENCIES",
        experience: "PROFESSIONAL EXPERIENCE",
        projects: "NOTABLE PROJECTS",
    },
    sizes: FontSizes {
        name: 56,
        heading: 24,
        body: 20,
        contact: 20,
    },
};

pub const ACADEMIC: StyleDescriptor = StyleDescriptor {
    style: TemplateStyle::Academic,
    margins: Margins::uniform(1440),
    palette: Palette {
        heading: Rgb(0x1F, 0x1F, 0x1F),
        accent: Rgb(0x55, 0x55, 0x55),
        body: Rgb::BLACK,
        muted: Rgb(0x55, 0x55, 0x55),
    },
    decoration: HeadingDecoration::BottomBorder,
    section_order: [
        SectionKind::Header,
        SectionKind::Summary,
        SectionKind::Education,
        SectionKind::Experience,
        SectionKind::Projects,
        SectionKind::Skills,
    ],
    header_alignment: Alignment::Center,
    header_banner: None,
    uppercase_name: false,
    contact_separator: " | ",
    skills_layout: SkillsLayout::CommaList,
    title_connector: ", ",
    bullet: Bullet::Dash,
    titles: SectionTitles {
        summary: "RESEARCH SUMMARY",
        education: "EDUCATION",
        skills: "SKILLS",
        experience: "EXPERIENCE",
        projects: "PROJECTS",
    },
    sizes: FontSizes {
        name: 36,
        heading: 26,
        body: 22,
        contact: 20,
    },
};
