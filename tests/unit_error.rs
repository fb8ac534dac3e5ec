use std::path::PathBuf;

use calgrid::error::{exit_codes, Error, EventError, ParseError};

#[test]
fn exit_codes_map_correctly() {
    let user = Error::InvalidArgument("bad".to_string());
    assert_eq!(user.exit_code(), exit_codes::USER_ERROR);

    let parse = Error::from(ParseError::InvalidDate("2026-13-01".to_string()));
    assert_eq!(parse.exit_code(), exit_codes::USER_ERROR);

    let missing = Error::EventsNotFound(PathBuf::from("events.json"));
    assert_eq!(missing.exit_code(), exit_codes::USER_ERROR);

    let io = Error::from(std::io::Error::other("boom"));
    assert_eq!(io.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn event_errors_name_the_field() {
    let err = EventError::Malformed {
        id: "e1".to_string(),
        field: "end",
        source: ParseError::InvalidTimestamp("soon".to_string()),
    };
    let message = err.to_string();
    assert!(message.contains("e1"));
    assert!(message.contains("end"));
    assert!(message.contains("soon"));
}

#[test]
fn config_errors_are_user_errors() {
    let err = Error::InvalidConfig("layout.max_visible must be >= 1".to_string());
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    assert!(err.to_string().contains("Invalid configuration"));
}
