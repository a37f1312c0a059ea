//! Cell payload values

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use super::User;

/// The payload of a cell, without its type tag.
///
/// This is what the mutation entry point and the `PATCH` body carry. Several
/// cell types share a shape (text, date, tag and link all hold a string), so
/// the tag is taken from the target cell rather than from the value.
///
/// # Example
///
/// ```
/// use taskgrid_lib::model::CellValue;
///
/// let value: CellValue = serde_json::from_str("\"done\"").unwrap();
/// assert_eq!(value, CellValue::from("done"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Numeric payload.
    Number(f64),
    /// String payload (text, date, tag, link label).
    Text(String),
    /// Single user.
    User(User),
    /// List of users.
    Users(Vec<User>),
}

impl CellValue {
    /// Returns the name of the payload shape.
    pub fn shape_name(&self) -> &'static str {
        match self {
            CellValue::Number(_) => "number",
            CellValue::Text(_) => "string",
            CellValue::User(_) => "user",
            CellValue::Users(_) => "user list",
        }
    }

    /// Stringifies the value the way the default cell display does.
    pub fn display_string(&self) -> String {
        match self {
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
            CellValue::User(user) => user.label().to_string(),
            CellValue::Users(users) => users
                .iter()
                .map(|u| u.label())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())
    }
}

/// Formats a number without a trailing `.0` for integral values.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Number(v as f64)
    }
}

impl From<User> for CellValue {
    fn from(v: User) -> Self {
        CellValue::User(v)
    }
}

impl From<Vec<User>> for CellValue {
    fn from(v: Vec<User>) -> Self {
        CellValue::Users(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_shapes() {
        let n: CellValue = serde_json::from_str("3").unwrap();
        assert_eq!(n, CellValue::Number(3.0));

        let users: CellValue =
            serde_json::from_str(r#"[{"id":"1","name":"Kenny Williams"}]"#).unwrap();
        assert_eq!(users, CellValue::Users(vec![User::new("1", "Kenny Williams")]));

        let user: CellValue = serde_json::from_str(r#"{"id":"2","name":"Gabriel Lima"}"#).unwrap();
        assert_eq!(user, CellValue::User(User::new("2", "Gabriel Lima")));
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_display_users() {
        let value = CellValue::Users(vec![
            User::new("1", "Kenny Williams"),
            User::new("9", ""),
        ]);
        assert_eq!(value.display_string(), "Kenny Williams, 9");
    }
}
