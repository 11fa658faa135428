//! Settings for viewkit.
//!
//! [`Settings`] holds the handful of knobs the view mixins read: where to send
//! anonymous users, which query parameters trigger CSV export or disable
//! default filters, and how logging is configured. Defaults mirror the
//! conventions of Django's auth views and list filters.

use serde::{Deserialize, Serialize};

/// The complete set of viewkit settings.
///
/// # Examples
///
/// ```
/// use viewkit_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert_eq!(settings.login_url, "/accounts/login/");
/// assert_eq!(settings.export_param, "export");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Whether debug mode is enabled. Selects the human-readable log format.
    pub debug: bool,
    /// The tracing filter directive (e.g. `"info"`, `"viewkit_views=debug"`).
    pub log_level: String,

    // ── Access guards ────────────────────────────────────────────────

    /// Where anonymous users are redirected by access guards.
    pub login_url: String,
    /// The query parameter carrying the path to return to after login.
    pub redirect_field_name: String,

    // ── List views ───────────────────────────────────────────────────

    /// The query parameter that requests an export of a list view.
    pub export_param: String,
    /// The value of [`export_param`](Self::export_param) that selects CSV.
    pub export_csv_value: String,
    /// The query parameter that suppresses default filters.
    pub show_all_param: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            login_url: "/accounts/login/".to_string(),
            redirect_field_name: "next".to_string(),
            export_param: "export".to_string(),
            export_csv_value: "csv".to_string(),
            show_all_param: "all".to_string(),
        }
    }
}
