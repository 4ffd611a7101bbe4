use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Characters stripped from client-supplied filenames before they touch
    /// the filesystem: path separators, NUL and other control characters.
    static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r#"[/\\\x00-\x1f]"#).unwrap();
}

/// Sanitize a client-supplied filename so it can never escape its document
/// folder. Keeps the original name readable; falls back to "fichier" when
/// nothing safe remains.
pub fn sanitize_filename(original: &str) -> String {
    // Drop any directory components a hostile client may have sent
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original)
        .trim();

    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(base, "_");
    let cleaned = cleaned.trim_matches('.').trim();

    if cleaned.is_empty() {
        "fichier".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Split a filename into (stem, extension). The extension excludes the dot.
pub fn split_filename(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => (&name[..idx], Some(&name[idx + 1..])),
        _ => (name, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_pass_through() {
        assert_eq!(sanitize_filename("jugement.pdf"), "jugement.pdf");
        assert_eq!(sanitize_filename("pièce à conviction.docx"), "pièce à conviction.docx");
    }

    #[test]
    fn path_components_are_dropped() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\greffe\\note.txt"), "note.txt");
        assert_eq!(sanitize_filename("/var/tmp/dossier.pdf"), "dossier.pdf");
    }

    #[test]
    fn control_characters_are_replaced() {
        assert_eq!(sanitize_filename("rapport\x00final.pdf"), "rapport_final.pdf");
    }

    #[test]
    fn hostile_names_fall_back() {
        assert_eq!(sanitize_filename(""), "fichier");
        assert_eq!(sanitize_filename("..."), "fichier");
        assert_eq!(sanitize_filename("  "), "fichier");
    }

    #[test]
    fn split_keeps_last_extension() {
        assert_eq!(split_filename("audience.tar.gz"), ("audience.tar", Some("gz")));
        assert_eq!(split_filename("sans_extension"), ("sans_extension", None));
        assert_eq!(split_filename(".bashrc"), (".bashrc", None));
        assert_eq!(split_filename("trailing."), ("trailing.", None));
    }
}
