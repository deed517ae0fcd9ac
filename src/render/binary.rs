//! Renderer binary location and pre-flight checks.

use crate::config::RendererConfig;
use crate::error::{Result, ShimError};
use std::path::{Component, Path, PathBuf};

/// Check that a renderer may run: it must be enabled and its binary must
/// resolve to an executable file.
///
/// Returns the resolved binary path. No process is spawned.
pub fn check_binary(config: &RendererConfig) -> Result<PathBuf> {
    if !config.enabled {
        return Err(ShimError::Disabled(config.doc_type));
    }
    locate_binary(&config.binary)
}

/// Resolve a configured binary to an executable path.
///
/// A bare name such as `wkhtmltopdf` is searched for on `PATH`; anything with
/// a directory component is checked as given.
pub fn locate_binary(binary: &Path) -> Result<PathBuf> {
    let not_found = || ShimError::BinaryNotFound {
        path: binary.to_path_buf(),
    };

    if is_bare_name(binary) {
        return search_path(binary).ok_or_else(not_found);
    }

    if is_executable(binary) {
        Ok(binary.to_path_buf())
    } else {
        Err(not_found())
    }
}

fn is_bare_name(binary: &Path) -> bool {
    let mut components = binary.components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn search_path(name: &Path) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocumentType;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_disabled_renderer_fails_before_lookup() {
        let config = RendererConfig::new(DocumentType::Pdf, "/nonexistent/wkhtmltopdf")
            .with_enabled(false);

        let err = check_binary(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Disabled);
    }

    #[test]
    fn test_missing_binary() {
        let config = RendererConfig::new(DocumentType::Image, "/nonexistent/wkhtmltoimage");

        let err = check_binary(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BinaryNotFound);
        assert!(err.to_string().contains("/nonexistent/wkhtmltoimage"));
    }

    #[test]
    fn test_directory_is_not_a_binary() {
        let temp_dir = TempDir::new().unwrap();

        let err = locate_binary(temp_dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BinaryNotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_file_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("wkhtmltopdf");
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let err = locate_binary(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BinaryNotFound);

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(locate_binary(&path).unwrap(), path);
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_binary_resolves_to_itself() {
        assert_eq!(
            locate_binary(Path::new("/bin/sh")).unwrap(),
            PathBuf::from("/bin/sh")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_bare_name_searched_on_path() {
        let resolved = locate_binary(Path::new("sh")).unwrap();
        assert!(resolved.is_absolute() || resolved.components().count() > 1);
        assert!(resolved.ends_with("sh"));
    }

    #[test]
    fn test_bare_name_not_on_path() {
        let err = locate_binary(Path::new("render_shim_no_such_binary_xyz")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BinaryNotFound);
    }

    #[test]
    fn test_bare_name_detection() {
        assert!(is_bare_name(Path::new("wkhtmltopdf")));
        assert!(!is_bare_name(Path::new("./wkhtmltopdf")));
        assert!(!is_bare_name(Path::new("vendor/bin/wkhtmltopdf")));
        assert!(!is_bare_name(Path::new("/usr/bin/wkhtmltopdf")));
    }
}
