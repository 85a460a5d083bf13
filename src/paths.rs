use std::path::PathBuf;
use std::sync::OnceLock;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Returns the logs directory: `<exe_dir>/logs/`
pub fn get_logs_dir() -> PathBuf {
    get_exe_dir().join("logs")
}

/// Returns the default directory for saved section crops: `<exe_dir>/crops/`
pub fn get_crops_dir() -> PathBuf {
    get_exe_dir().join("crops")
}

/// Ensures all output directories exist. Call at startup.
pub fn ensure_directories() -> std::io::Result<()> {
    std::fs::create_dir_all(get_logs_dir())?;
    std::fs::create_dir_all(get_crops_dir())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_dirs_under_exe_dir() {
        assert_eq!(get_logs_dir(), get_exe_dir().join("logs"));
        assert_eq!(get_crops_dir(), get_exe_dir().join("crops"));
    }

    #[test]
    fn test_ensure_directories() {
        ensure_directories().unwrap();
        assert!(get_logs_dir().is_dir());
        assert!(get_crops_dir().is_dir());
    }
}
