//! Handle server response codes and their fixed descriptions.

/// The `responseCode` denoting success.
pub const SUCCESS: i64 = 1;

/// Server response codes with a fixed human-readable description.
///
/// `100` is not listed; without a body `message` it reports as
/// `Unexpected error`.
pub const KNOWN_RESPONSE_CODES: &[(i64, &str)] = &[
    (2, "An unexpected error occurred on the server"),
    (101, "Handle already exists"),
    (102, "Invalid handle"),
    (200, "Values not found"),
    (201, "Value already exists"),
    (202, "Invalid value"),
    (301, "Server not responsible for handle"),
    (400, "Not authorized"),
    (402, "Authentication needed"),
];

/// Looks up the description of a known response code.
pub fn describe(code: i64) -> Option<&'static str> {
    KNOWN_RESPONSE_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, description)| *description)
}
