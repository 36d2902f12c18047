use std::path::PathBuf;

pub fn data_dir() -> PathBuf {
    // On macOS and Linux, use ~/.local/share/grilla/ (XDG standard)
    // instead of macOS Application Support for consistency
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".local")
            .join("share")
            .join("grilla")
    }
    #[cfg(windows)]
    {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("grilla")
    }
}

pub fn config_dir() -> PathBuf {
    // On Windows, check for a portable config.toml in the executable directory first
    #[cfg(windows)]
    {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let portable_config = exe_dir.join("config.toml");
                if portable_config.exists() {
                    return exe_dir.to_path_buf();
                }
            }
        }
    }

    // On macOS and Linux, always use ~/.config/grilla/
    // (avoid macOS Application Support folder for consistency)
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("grilla")
    }

    #[cfg(windows)]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("grilla")
    }
}

pub fn temp_dir() -> PathBuf {
    std::env::temp_dir()
}

pub fn cache_dir() -> PathBuf {
    // On macOS and Linux, use ~/.cache/grilla/ (XDG standard)
    // instead of macOS ~/Library/Caches/ for consistency
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(temp_dir)
            .join(".cache")
            .join("grilla")
    }
    #[cfg(windows)]
    {
        dirs::cache_dir().unwrap_or_else(temp_dir).join("grilla")
    }
}
