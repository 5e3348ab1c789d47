use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

/// Attendance status of one member on one date.
///
/// Text forms are case-insensitive; `Present` is accepted as an alias of
/// `On Time`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum StatusCode {
    #[strum(to_string = "On Time", serialize = "OnTime", serialize = "Present")]
    OnTime,
    #[strum(to_string = "Late")]
    Late,
    #[strum(to_string = "Absent")]
    Absent,
    #[strum(to_string = "Half Day", serialize = "HalfDay")]
    HalfDay,
    #[strum(to_string = "On Leave", serialize = "OnLeave")]
    OnLeave,
}

impl StatusCode {
    /// Parse an optional stored/submitted value. Blank means "no status".
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>, strum::ParseError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => StatusCode::from_str(value).map(Some),
        }
    }
}

impl Serialize for StatusCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        StatusCode::from_str(raw.trim())
            .map_err(|_| D::Error::custom(format!("unknown attendance status `{}`", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labels_compact_forms_and_alias() {
        assert_eq!("On Time".parse::<StatusCode>(), Ok(StatusCode::OnTime));
        assert_eq!("ontime".parse::<StatusCode>(), Ok(StatusCode::OnTime));
        assert_eq!("PRESENT".parse::<StatusCode>(), Ok(StatusCode::OnTime));
        assert_eq!("half day".parse::<StatusCode>(), Ok(StatusCode::HalfDay));
        assert_eq!("OnLeave".parse::<StatusCode>(), Ok(StatusCode::OnLeave));
        assert!("Sick".parse::<StatusCode>().is_err());
    }

    #[test]
    fn blank_is_no_status() {
        assert_eq!(StatusCode::parse(None), Ok(None));
        assert_eq!(StatusCode::parse(Some("  ")), Ok(None));
        assert_eq!(StatusCode::parse(Some(" late ")), Ok(Some(StatusCode::Late)));
    }

    #[test]
    fn serializes_as_label() {
        assert_eq!(StatusCode::OnLeave.to_string(), "On Leave");
        assert_eq!(serde_json::to_string(&StatusCode::OnTime).unwrap(), "\"On Time\"");
        let parsed: StatusCode = serde_json::from_str("\"Half Day\"").unwrap();
        assert_eq!(parsed, StatusCode::HalfDay);
    }
}
