//! Build metadata generated by the build script

include!(concat!(env!("OUT_DIR"), "/version.rs"));

/// Module API version from `[package.metadata]`, parsed into a number
///
/// Falls back to the version this engine was first released with.
pub fn module_api_version() -> u32 {
    MODULE_API_VERSION.parse().unwrap_or(20261016)
}

/// Build time string from the build script (UTC)
pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Short git hash captured by the build script
pub fn git_hash() -> &'static str {
    GIT_HASH
}

/// One-line summary logged at startup
pub fn summary() -> String {
    format!(
        "{} {} (module api {}, git {}, built {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        module_api_version(),
        git_hash(),
        build_time()
    )
}
