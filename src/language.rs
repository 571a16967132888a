/*!
 * Fence language tags derived from file names
 */

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// File names that carry their language without an extension
static SPECIAL_NAMES: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| HashMap::from([("Dockerfile", "dockerfile"), ("Makefile", "make")]));

/// Lower-cased extension to fence tag
static EXTENSIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("go", "go"),
        ("md", "markdown"),
        ("markdown", "markdown"),
        ("txt", "text"),
        ("js", "javascript"),
        ("ts", "typescript"),
        ("json", "json"),
        ("yaml", "yaml"),
        ("yml", "yaml"),
        ("toml", "toml"),
        ("sh", "bash"),
        ("bash", "bash"),
        ("zsh", "zsh"),
        ("py", "python"),
        ("rb", "ruby"),
        ("php", "php"),
        ("java", "java"),
        ("kt", "kotlin"),
        ("rs", "rust"),
        ("c", "c"),
        ("h", "c"),
        ("cc", "cpp"),
        ("cpp", "cpp"),
        ("cxx", "cpp"),
        ("hpp", "cpp"),
        ("hh", "cpp"),
        ("cs", "csharp"),
        ("html", "html"),
        ("htm", "html"),
        ("css", "css"),
        ("scss", "scss"),
        ("sql", "sql"),
        ("xml", "xml"),
        ("ini", "ini"),
        ("conf", "ini"),
    ])
});

/// Fence tag for a slash-separated path, or `None` when the block
/// should stay untagged.
///
/// The extension is whatever follows the last `.` of the file name, so
/// dotfiles such as `.bashrc` are tagged `bashrc`. Unknown extensions are
/// used as-is.
pub fn language_for(path: &str) -> Option<String> {
    let name = path.rsplit('/').next().unwrap_or(path);

    if let Some(lang) = SPECIAL_NAMES.get(name) {
        return Some((*lang).to_string());
    }

    let ext = name.rfind('.').map(|i| name[i + 1..].to_lowercase())?;
    if ext.is_empty() {
        return None;
    }

    Some(
        EXTENSIONS
            .get(ext.as_str())
            .map(|lang| (*lang).to_string())
            .unwrap_or(ext),
    )
}
