//! API constants

/// Access token cookie name
pub const ACCESS_COOKIE_NAME: &str = "finitura_access";

/// Refresh token cookie name
pub const REFRESH_COOKIE_NAME: &str = "finitura_refresh";

/// Path prefix the refresh cookie is scoped to
pub const AUTH_COOKIE_PATH: &str = "/api/auth";
