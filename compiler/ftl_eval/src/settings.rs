//! Per-render settings changed by `#setting` and by the host.

use ftl_ir::camel_to_snake;

use crate::TimeZone;

/// A rejected setting name or value.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SettingError {
    #[error("unknown setting {0:?}")]
    Unknown(String),

    #[error("invalid value {value:?} for setting {name}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

/// Which cached formatters a setting change makes stale.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SettingChange {
    None,
    Locale,
    TimeZone,
}

/// Formatting settings in force during a render.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    pub locale: String,
    pub time_zone: TimeZone,
    pub number_format: String,
    /// `""` leaves booleans unformattable, `"c"` prints `true`/`false`,
    /// `"yes,no"` picks one of the two texts.
    pub boolean_format: String,
    pub date_format: String,
    pub time_format: String,
    pub datetime_format: String,
    pub output_encoding: Option<String>,
    /// `?size` of `a..` answers `i32::MAX` instead of failing.
    pub legacy_unbounded_range_size: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            locale: "en_US".to_owned(),
            time_zone: TimeZone::utc(),
            number_format: "number".to_owned(),
            boolean_format: String::new(),
            date_format: "yyyy-MM-dd".to_owned(),
            time_format: "HH:mm:ss".to_owned(),
            datetime_format: "yyyy-MM-dd HH:mm:ss".to_owned(),
            output_encoding: None,
            legacy_unbounded_range_size: false,
        }
    }
}

impl RenderSettings {
    /// Apply `name=value`; the name may be snake_case or camelCase.
    pub fn set(&mut self, name: &str, value: &str) -> Result<SettingChange, SettingError> {
        let snake = camel_to_snake(name);
        match snake.as_str() {
            "locale" => {
                if value.trim().is_empty() {
                    return Err(invalid(&snake, value, "the locale can't be empty"));
                }
                self.locale = value.trim().to_owned();
                Ok(SettingChange::Locale)
            }
            "time_zone" => {
                self.time_zone = TimeZone::parse(value).ok_or_else(|| {
                    invalid(&snake, value, "expected UTC, GMT or an offset like +02:00")
                })?;
                Ok(SettingChange::TimeZone)
            }
            "number_format" => {
                self.number_format = value.to_owned();
                Ok(SettingChange::None)
            }
            "boolean_format" => {
                if !value.is_empty() && value != "c" && value.split(',').count() != 2 {
                    return Err(invalid(
                        &snake,
                        value,
                        "expected \"c\" or two comma separated texts like \"yes,no\"",
                    ));
                }
                self.boolean_format = value.to_owned();
                Ok(SettingChange::None)
            }
            "date_format" => {
                self.date_format = value.to_owned();
                Ok(SettingChange::None)
            }
            "time_format" => {
                self.time_format = value.to_owned();
                Ok(SettingChange::None)
            }
            "datetime_format" => {
                self.datetime_format = value.to_owned();
                Ok(SettingChange::None)
            }
            "output_encoding" => {
                self.output_encoding = Some(value.to_owned()).filter(|v| !v.is_empty());
                Ok(SettingChange::None)
            }
            _ => Err(SettingError::Unknown(name.to_owned())),
        }
    }

    /// Text for a boolean under `boolean_format`; `None` when unset.
    pub fn boolean_text(&self, value: bool) -> Option<&str> {
        match self.boolean_format.as_str() {
            "" => None,
            "c" => Some(if value { "true" } else { "false" }),
            format => {
                let (yes, no) = format.split_once(',')?;
                Some(if value { yes } else { no })
            }
        }
    }

    /// The language part of the locale: `en` for `en_US`.
    pub fn language(&self) -> &str {
        self.locale
            .split(['_', '-'])
            .next()
            .unwrap_or(&self.locale)
    }
}

fn invalid(name: &str, value: &str, reason: &str) -> SettingError {
    SettingError::InvalidValue {
        name: name.to_owned(),
        value: value.to_owned(),
        reason: reason.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn camel_case_names_accepted() {
        let mut settings = RenderSettings::default();
        assert_eq!(settings.set("numberFormat", "0.00"), Ok(SettingChange::None));
        assert_eq!(settings.number_format, "0.00");
        assert_eq!(settings.set("timeZone", "+02:00"), Ok(SettingChange::TimeZone));
        assert_eq!(settings.time_zone.name(), "+02:00");
    }

    #[test]
    fn boolean_format_texts() {
        let mut settings = RenderSettings::default();
        assert_eq!(settings.boolean_text(true), None);
        settings.set("boolean_format", "yes,no").unwrap();
        assert_eq!(settings.boolean_text(true), Some("yes"));
        assert_eq!(settings.boolean_text(false), Some("no"));
        settings.set("boolean_format", "c").unwrap();
        assert_eq!(settings.boolean_text(false), Some("false"));
        assert!(settings.set("boolean_format", "a,b,c").is_err());
    }

    #[test]
    fn rejects_unknown_and_bad_values() {
        let mut settings = RenderSettings::default();
        assert_eq!(
            settings.set("colour", "red"),
            Err(SettingError::Unknown("colour".to_owned()))
        );
        assert!(settings.set("time_zone", "Europe/Paris").is_err());
        assert_eq!(settings.time_zone, TimeZone::utc());
    }

    #[test]
    fn language_of_locale() {
        let mut settings = RenderSettings::default();
        assert_eq!(settings.language(), "en");
        settings.set("locale", "de-AT").unwrap();
        assert_eq!(settings.language(), "de");
        assert_eq!(settings.set("locale", "fr"), Ok(SettingChange::Locale));
    }
}
