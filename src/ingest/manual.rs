use crate::models::resume::ResumeDocument;

/// Flattens a structured resume into the plain text the scorer and the
/// enhancer work on. Empty sections are left out.
pub fn assemble_text(doc: &ResumeDocument) -> String {
    let mut sections: Vec<String> = Vec::new();

    let info = &doc.personal_info;
    if !info.is_empty() {
        let lines = [
            info.name.as_str(),
            info.email.as_str(),
            info.phone.as_str(),
            info.location.as_str(),
        ]
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n");
        sections.push(format!("PERSONAL INFORMATION\n{}", lines));
    }

    if !doc.summary.trim().is_empty() {
        sections.push(format!("PROFESSIONAL SUMMARY\n{}", doc.summary.trim()));
    }

    let education = doc
        .education
        .iter()
        .filter(|e| !e.is_blank())
        .map(|e| {
            let mut line = format!("{} - {} ({})", e.degree, e.institution, e.year);
            if !e.gpa.trim().is_empty() {
                line.push_str(&format!(", GPA {}", e.gpa));
            }
            line
        })
        .collect::<Vec<_>>();
    if !education.is_empty() {
        sections.push(format!("EDUCATION\n{}", education.join("\n")));
    }

    let skills = doc
        .skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();
    if !skills.is_empty() {
        sections.push(format!("SKILLS\n{}", skills.join(", ")));
    }

    let experience = doc
        .experience
        .iter()
        .filter(|e| !e.is_blank())
        .map(|e| {
            let mut block = format!("{} at {} ({})", e.title, e.company, e.duration);
            if !e.description.trim().is_empty() {
                block.push('\n');
                block.push_str(e.description.trim());
            }
            for item in e.responsibilities.iter().filter(|r| !r.trim().is_empty()) {
                block.push_str(&format!("\n- {}", item.trim()));
            }
            block
        })
        .collect::<Vec<_>>();
    if !experience.is_empty() {
        sections.push(format!("WORK EXPERIENCE\n{}", experience.join("\n")));
    }

    let projects = doc
        .projects
        .iter()
        .filter(|p| !p.is_blank())
        .map(|p| format!("{}: {}", p.name, p.description))
        .collect::<Vec<_>>();
    if !projects.is_empty() {
        sections.push(format!("PROJECTS\n{}", projects.join("\n")));
    }

    sections.join("\n\n")
}
