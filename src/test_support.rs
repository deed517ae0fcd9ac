use crate::config::{DocumentType, RenderOption, RendererConfig};

/// A renderer that runs `script` through `/bin/sh -c`.
///
/// Further options land after the script, so the first one becomes `$0`.
pub(crate) fn sh_renderer(doc_type: DocumentType, script: &str) -> RendererConfig {
    RendererConfig::new(doc_type, "/bin/sh").with_option(RenderOption::new("-c", script))
}

/// Write a config file into `dir` and return its path.
pub(crate) fn write_config(dir: &std::path::Path, yaml: &str) -> std::path::PathBuf {
    let path = dir.join("render-shim.yaml");
    std::fs::write(&path, yaml).unwrap();
    path
}
