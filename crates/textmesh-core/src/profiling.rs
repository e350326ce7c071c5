//! Profiling utilities based on the `puffin` crate.
//!
//! Scopes are free when profiling is off, so the layout hot paths carry them unconditionally.

pub use puffin::{GlobalProfiler, profile_function, profile_scope};

/// Turn scope collection on or off.
pub fn set_enabled(enabled: bool) {
    puffin::set_scopes_on(enabled);
}

/// Whether scopes are currently being collected.
pub fn is_enabled() -> bool {
    puffin::are_scopes_on()
}

/// Mark the start of a new frame for profiling.
///
/// Call once per update of the hosting application so passes are grouped by frame.
#[inline]
pub fn new_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(feature = "profiling-http")]
mod http {
    use std::sync::OnceLock;

    static PROFILING_SERVER: OnceLock<puffin_http::Server> = OnceLock::new();

    /// Enable scopes and serve them to `puffin_viewer` on `addr` (e.g. `"0.0.0.0:8585"`).
    ///
    /// ```no_run
    /// textmesh_core::profiling::init_profiling("0.0.0.0:8585");
    /// ```
    pub fn init_profiling(addr: &str) {
        puffin::set_scopes_on(true);
        match puffin_http::Server::new(addr) {
            Ok(server) => {
                tracing::info!("Puffin profiler server started on http://{}", addr);
                let _ = PROFILING_SERVER.set(server);
            }
            Err(e) => {
                tracing::error!("Failed to start puffin server: {}", e);
            }
        }
    }
}

#[cfg(feature = "profiling-http")]
pub use http::init_profiling;
