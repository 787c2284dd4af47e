const PDF_EXTENSION: &str = ".pdf";
/// Below the 255 byte `NAME_MAX` of common filesystems.
const MAX_FILE_NAME_LEN: usize = 200;

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ' ')
}

fn sanitize(raw: &str) -> String {
    raw.chars().filter(|c| is_name_char(*c)).collect::<String>().trim().to_string()
}

/// `<name>-<subject>-<suffix>.pdf` with every part reduced to
/// `[A-Za-z0-9-_ ]`. `None` when the name or subject has nothing left or
/// the result is longer than [`MAX_FILE_NAME_LEN`].
pub(crate) fn paper_file_name(pdf_name: &str, subject: &str, suffix: &str) -> Option<String> {
    let name = sanitize(pdf_name);
    let subject = sanitize(subject);
    if name.is_empty() || subject.is_empty() {
        return None;
    }

    let suffix = sanitize(suffix);
    let file_name = if suffix.is_empty() {
        format!("{name}-{subject}{PDF_EXTENSION}")
    } else {
        format!("{name}-{subject}-{suffix}{PDF_EXTENSION}")
    };
    (file_name.len() <= MAX_FILE_NAME_LEN).then_some(file_name)
}

/// Accepts `stem` or `stem.pdf` where the stem only holds `[A-Za-z0-9-_ ]`
/// and returns the name with the extension.
pub(crate) fn normalize_rename_target(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let stem = trimmed
        .strip_suffix(PDF_EXTENSION)
        .or_else(|| trimmed.strip_suffix(".PDF"))
        .unwrap_or(trimmed);

    if stem.trim().is_empty() || !stem.chars().all(is_name_char) {
        return None;
    }

    let file_name = format!("{stem}{PDF_EXTENSION}");
    (file_name.len() <= MAX_FILE_NAME_LEN).then_some(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paper_file_name_strips_unsafe_characters() {
        assert_eq!(
            paper_file_name("Mid/term: 1", "Physics!", "CIEET").as_deref(),
            Some("Midterm 1-Physics-CIEET.pdf")
        );
        assert_eq!(paper_file_name("../..", "Physics", "CIEET"), None);
        assert_eq!(paper_file_name("Final", "Math", "").as_deref(), Some("Final-Math.pdf"));
    }

    #[test]
    fn overlong_names_are_refused() {
        assert_eq!(paper_file_name(&"x".repeat(300), "Physics", "CIEET"), None);
        assert_eq!(paper_file_name("Final", &"p".repeat(300), "CIEET"), None);
        let longest = "x".repeat(MAX_FILE_NAME_LEN - "-Math.pdf".len());
        assert!(paper_file_name(&longest, "Math", "").is_some());
        assert_eq!(normalize_rename_target(&"y".repeat(MAX_FILE_NAME_LEN)), None);
    }

    #[test]
    fn rename_target_requires_plain_stem() {
        assert_eq!(normalize_rename_target("final_v2").as_deref(), Some("final_v2.pdf"));
        assert_eq!(normalize_rename_target("final v2.pdf").as_deref(), Some("final v2.pdf"));
        assert_eq!(normalize_rename_target("../etc/passwd"), None);
        assert_eq!(normalize_rename_target(".pdf"), None);
        assert_eq!(normalize_rename_target("  "), None);
    }
}
