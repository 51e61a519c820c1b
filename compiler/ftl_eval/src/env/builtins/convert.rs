//! Conversions between types, date built-ins and escaping.

use ftl_ir::{BuiltIn, ExprId};
use ftl_output::escape;

use super::Args;
use crate::env::text::format_error;
use crate::env::Environment;
use crate::format::parse_computer;
use crate::{DateKind, TemplateError, TimeZone, Value};

impl Environment<'_> {
    /// `?number`, `?boolean`, `?c` and `?string`.
    pub(super) fn convert_builtin(
        &mut self,
        builtin: BuiltIn,
        value: &Value,
        target: ExprId,
        args: &Args<'_>,
    ) -> Result<Value, TemplateError> {
        let number = self.facet(value.as_number(), target)?;
        let boolean = self.facet(value.as_bool(), target)?;
        match builtin {
            BuiltIn::Number => {
                if let Some(number) = number {
                    return Ok(Value::Number(number));
                }
                let text = self.require_string(value, target)?;
                parse_computer(&text).map(Value::Number).ok_or_else(|| {
                    self.blame(
                        TemplateError::custom(format!(
                            "Can't convert this string to number: {text:?}"
                        )),
                        target,
                    )
                })
            }
            BuiltIn::Boolean => {
                if let Some(b) = boolean {
                    return Ok(Value::Boolean(b));
                }
                let text = self.require_string(value, target)?;
                let parsed = match text.as_str() {
                    "true" => Some(true),
                    "false" => Some(false),
                    other if self.settings.boolean_text(true) == Some(other) => Some(true),
                    other if self.settings.boolean_text(false) == Some(other) => Some(false),
                    _ => None,
                };
                parsed.map(Value::Boolean).ok_or_else(|| {
                    self.blame(
                        TemplateError::custom(format!(
                            "Can't convert this string to boolean: {text:?}"
                        )),
                        target,
                    )
                })
            }
            BuiltIn::C => {
                if let Some(number) = number {
                    return self.format_number(number, Some("c")).map(Value::from);
                }
                if let Some(b) = boolean {
                    return Ok(Value::from(if b { "true" } else { "false" }));
                }
                let text = self.require_string(value, target)?;
                Ok(Value::from(format!("\"{}\"", escape::json_string(&text))))
            }
            _ => self.string_of(value, number, boolean, target, args),
        }
    }

    /// `?string`, `?string(format)` and `?string(true_text, false_text)`.
    fn string_of(
        &mut self,
        value: &Value,
        number: Option<crate::Number>,
        boolean: Option<bool>,
        target: ExprId,
        args: &Args<'_>,
    ) -> Result<Value, TemplateError> {
        let wrong_arity = |env: &Self, what: &str| {
            env.blame(
                TemplateError::custom(format!(
                    "?string on {what} accepts {} arguments, but got {}",
                    if what == "a boolean" { "0 or 2" } else { "0 or 1" },
                    args.len()
                )),
                target,
            )
        };
        if let Some(number) = number {
            let format = match args.len() {
                0 => None,
                1 => Some(self.arg_string(args, 0)?),
                _ => return Err(wrong_arity(self, "a number")),
            };
            let text = self
                .format_number(number, format.as_deref())
                .map_err(|e| self.blame(e, target))?;
            return Ok(Value::from(text));
        }
        if let Some(date) = self.facet(value.as_date(), target)? {
            let format = match args.len() {
                0 => None,
                1 => Some(self.arg_string(args, 0)?),
                _ => return Err(wrong_arity(self, "a date")),
            };
            let text = self
                .format_date(&date, format.as_deref())
                .map_err(|e| self.blame(e, target))?;
            return Ok(Value::from(text));
        }
        if let Some(b) = boolean {
            return match args.len() {
                0 => Ok(Value::from(
                    self.settings
                        .boolean_text(b)
                        .unwrap_or(if b { "true" } else { "false" }),
                )),
                2 => self.arg_string(args, usize::from(!b)).map(Value::from),
                _ => Err(wrong_arity(self, "a boolean")),
            };
        }
        if args.len() > 0 {
            return Err(wrong_arity(self, "a string"));
        }
        self.require_string(value, target).map(Value::from)
    }

    /// The pre-auto-escaping built-ins `?html`, `?xml`, `?xhtml`, `?rtf`.
    pub(super) fn legacy_escape(
        &self,
        builtin: BuiltIn,
        value: &Value,
        target: ExprId,
    ) -> Result<Value, TemplateError> {
        if let Value::Markup(markup) = value {
            if markup.format().is_legacy_builtin_bypassed(builtin.name()) {
                return Ok(value.clone());
            }
            return Err(self.blame(
                TemplateError::custom(format!(
                    "?{} can't be applied to markup of the {} format",
                    builtin.name(),
                    markup.format()
                )),
                target,
            ));
        }
        let text = self.require_string(value, target)?;
        let escaped = match builtin {
            BuiltIn::Html => escape::html(&text),
            BuiltIn::Xml => escape::xml(&text),
            BuiltIn::Xhtml => escape::xhtml(&text),
            _ => escape::rtf(&text),
        };
        Ok(Value::from(escaped.into_owned()))
    }

    /// `?date`, `?time`, `?datetime` and `?iso_utc`.
    pub(super) fn date_builtin(
        &mut self,
        builtin: BuiltIn,
        value: &Value,
        target: ExprId,
        args: &Args<'_>,
    ) -> Result<Value, TemplateError> {
        let kind = match builtin {
            BuiltIn::Date => DateKind::Date,
            BuiltIn::Time => DateKind::Time,
            BuiltIn::Datetime => DateKind::DateTime,
            _ => {
                let date = self.require_date(value, target)?;
                let kind = match date.kind {
                    DateKind::Unknown => DateKind::DateTime,
                    known => known,
                };
                let formatter = self.formats.date("iso", kind).map_err(|e| format_error(&e))?;
                return formatter
                    .format(&date.with_kind(kind), &TimeZone::utc())
                    .map(Value::from)
                    .map_err(|e| self.blame(format_error(&e), target));
            }
        };
        if let Some(date) = self.facet(value.as_date(), target)? {
            return Ok(Value::Date(date.with_kind(kind)));
        }
        let text = self.require_string(value, target)?;
        let pattern = match self.opt_arg_string(args, 0)? {
            Some(pattern) => pattern,
            None => match kind {
                DateKind::Date => self.settings.date_format.clone(),
                DateKind::Time => self.settings.time_format.clone(),
                _ => self.settings.datetime_format.clone(),
            },
        };
        let formatter = self
            .formats
            .date(&pattern, kind)
            .map_err(|e| self.blame(format_error(&e), target))?;
        formatter
            .parse(&text, kind, &self.settings.time_zone)
            .map(Value::Date)
            .map_err(|e| self.blame(format_error(&e), target))
    }

    /// `?esc`, `?no_esc` and `?markup_string`, against the current format.
    pub(super) fn markup_builtin(
        &mut self,
        builtin: BuiltIn,
        value: &Value,
        target: ExprId,
    ) -> Result<Value, TemplateError> {
        if let Value::Markup(markup) = value {
            return Ok(match builtin {
                BuiltIn::MarkupString => Value::from(markup.markup()),
                _ => value.clone(),
            });
        }
        if builtin == BuiltIn::MarkupString {
            return Err(self.type_mismatch(target, ftl_ir::Capabilities::MARKUP, value));
        }
        let text = self.to_text(value, target)?;
        let (format, _) = self.current_format();
        let markup = if builtin == BuiltIn::Esc {
            format.escape_plain_text(text)
        } else {
            format.from_markup(text)
        };
        markup
            .map(Value::Markup)
            .map_err(|e| self.blame(TemplateError::markup(&e), target))
    }
}
