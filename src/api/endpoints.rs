//! Relative paths of the clinic backend endpoints.

pub const AUTH_LOGIN: &str = "/auth/login";
pub const AUTH_REFRESH: &str = "/auth/refresh";
pub const AUTH_ME: &str = "/auth/me";
pub const AUTH_LOGOUT: &str = "/auth/logout";
pub const AUTH_REGISTER: &str = "/auth/register";
pub const AUTH_VERIFY: &str = "/auth/verify";

pub const USERS: &str = "/users";
pub const ROLES: &str = "/roles";

pub const APPOINTMENT_TYPES: &str = "/appointment-types";
pub const SPECIALTIES: &str = "/specialties";

pub const HOSPITALS: &str = "/hospitals";
pub const PATIENT_PROFILE: &str = "/patients/me";
pub const APPOINTMENTS: &str = "/appointments";

pub const NOTIFICATIONS: &str = "/notifications";
pub const NOTIFICATIONS_BROADCAST: &str = "/notifications/broadcast";

/// Whether `path` targets the login endpoint. Query strings are ignored.
pub fn is_login(path: &str) -> bool {
    let path = path.split('?').next().unwrap_or(path);
    path.trim_end_matches('/').ends_with(AUTH_LOGIN)
}

/// `{collection}/{id}` with the id percent-encoded.
pub fn item(collection: &str, id: &str) -> String {
    format!("{}/{}", collection, urlencoding::encode(id))
}
