/// Log version info using the appropriate logging mechanism for the platform.
/// On Android, we use the `log` crate (which android_logger handles).
/// On other platforms, we use `tracing` (which our tracing_subscriber handles).
pub fn log_version_info(app_name: &str, version: &str) {
    #[cfg(target_os = "android")]
    {
        log::info!("{}", short_version_info(app_name, version));
    }
    #[cfg(not(target_os = "android"))]
    {
        tracing::info!(
            os = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            "{}",
            short_version_info(app_name, version)
        );
    }
}

/// `"<app> <version> (<profile>)"`
pub fn short_version_info(app_name: &str, version: &str) -> String {
    let profile = if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    };
    format!("{app_name} {version} ({profile})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_version_info() {
        let info = short_version_info("Route Builder", "0.1.0");
        assert!(info.starts_with("Route Builder 0.1.0 ("));
        assert!(info.ends_with("debug)") || info.ends_with("release)"));
    }
}
