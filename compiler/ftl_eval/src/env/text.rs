//! Value coercions: to text through the formatters, to numbers, booleans.

use ftl_ir::{Capabilities, ExprId};

use super::{Environment, Operand};
use crate::format::FormatError;
use crate::model::ModelResult;
use crate::{DateKind, DateValue, Number, TemplateError, Value};

pub(crate) fn format_error(error: &FormatError) -> TemplateError {
    match error {
        FormatError::Unformattable { .. } => TemplateError::unformattable(error.to_string()),
        FormatError::MalformedPattern { .. } | FormatError::Unparsable { .. } => {
            TemplateError::custom(error.to_string())
        }
    }
}

impl Environment<'_> {
    /// Host-model failure while reading a facet of a value.
    pub(crate) fn facet<T>(
        &self,
        result: ModelResult<T>,
        at: impl Into<Operand>,
    ) -> Result<T, TemplateError> {
        let at = at.into();
        result.map_err(|e| {
            let error = TemplateError::custom(format!(
                "A data model object failed while evaluating {}: {e}",
                self.operand_text(at)
            ));
            self.blame_at(error, at)
        })
    }

    /// Text of a value in string context (`${...}`, concatenation, `?join`).
    pub(crate) fn to_text(
        &mut self,
        value: &Value,
        at: impl Into<Operand>,
    ) -> Result<String, TemplateError> {
        let at = at.into();
        let result = match value {
            Value::String(s) => Ok(s.to_string()),
            Value::Empty => Ok(String::new()),
            Value::Number(n) => self.format_number(*n, None),
            Value::Boolean(b) => self.format_boolean(*b),
            Value::Date(d) => self.format_date(d, None),
            Value::Markup(m) => Ok(m.markup().to_owned()),
            Value::Adapted(_) => return self.adapted_text(value, at),
            Value::Sequence(_) | Value::Range(_) => Err(self
                .type_mismatch(at, Capabilities::STRINGABLE, value)
                .with_tip("Use ?join(\", \") to print the items of a sequence.")),
            Value::Hash(_) | Value::Macro(_) => {
                Err(self.type_mismatch(at, Capabilities::STRINGABLE, value))
            }
        };
        result.map_err(|e| self.blame_at(e, at))
    }

    fn adapted_text(&mut self, value: &Value, at: Operand) -> Result<String, TemplateError> {
        if let Some(text) = self.facet(value.as_string(), at)? {
            return Ok(text.into_owned());
        }
        let result = if let Some(number) = self.facet(value.as_number(), at)? {
            self.format_number(number, None)
        } else if let Some(date) = self.facet(value.as_date(), at)? {
            self.format_date(&date, None)
        } else if let Some(b) = self.facet(value.as_bool(), at)? {
            self.format_boolean(b)
        } else {
            Err(self.type_mismatch(at, Capabilities::STRINGABLE, value))
        };
        result.map_err(|e| self.blame_at(e, at))
    }

    /// Format with `format`, or with the `number_format` setting.
    pub(crate) fn format_number(
        &mut self,
        number: Number,
        format: Option<&str>,
    ) -> Result<String, TemplateError> {
        let pattern = match format {
            Some(format) => format,
            None => self.settings.number_format.as_str(),
        };
        let formatter = self.formats.number(pattern).map_err(|e| format_error(&e))?;
        formatter.format(number).map_err(|e| format_error(&e))
    }

    /// Format with `format`, or with the setting matching the date kind.
    pub(crate) fn format_date(
        &mut self,
        date: &DateValue,
        format: Option<&str>,
    ) -> Result<String, TemplateError> {
        let pattern = match (format, date.kind) {
            (Some(format), _) => format,
            (None, DateKind::Date) => self.settings.date_format.as_str(),
            (None, DateKind::Time) => self.settings.time_format.as_str(),
            (None, DateKind::DateTime) => self.settings.datetime_format.as_str(),
            (None, DateKind::Unknown) => {
                return Err(TemplateError::unformattable(
                    "Can't convert the date to string, because it isn't known which parts \
                     of the date are in use (date, time or date-time).",
                )
                .with_tip("Mark the value with ?date, ?time or ?datetime before printing it."));
            }
        };
        let formatter = self
            .formats
            .date(pattern, date.kind)
            .map_err(|e| format_error(&e))?;
        formatter
            .format(date, &self.settings.time_zone)
            .map_err(|e| format_error(&e))
    }

    pub(crate) fn format_boolean(&self, value: bool) -> Result<String, TemplateError> {
        self.settings
            .boolean_text(value)
            .map(str::to_owned)
            .ok_or_else(|| {
                TemplateError::unformattable(
                    "Can't convert boolean to string automatically, because the \
                     \"boolean_format\" setting isn't set.",
                )
                .with_tip(
                    "Use ?c for \"true\"/\"false\", or ?string(\"yes\", \"no\") for other texts; \
                     or set boolean_format.",
                )
            })
    }

    pub(crate) fn eval_text(&mut self, expr: ExprId) -> Result<String, TemplateError> {
        let value = self.eval(expr)?;
        self.to_text(&value, expr)
    }

    /// The string facet of a value; numbers and dates are not accepted.
    pub(crate) fn require_string(
        &self,
        value: &Value,
        at: impl Into<Operand>,
    ) -> Result<String, TemplateError> {
        let at = at.into();
        match self.facet(value.as_string(), at)? {
            Some(text) => Ok(text.into_owned()),
            None => Err(self.type_mismatch(at, Capabilities::STRING, value)),
        }
    }

    pub(crate) fn require_number(
        &self,
        value: &Value,
        at: impl Into<Operand>,
    ) -> Result<Number, TemplateError> {
        let at = at.into();
        match self.facet(value.as_number(), at)? {
            Some(number) => Ok(number),
            None => Err(self.type_mismatch(at, Capabilities::NUMBER, value)),
        }
    }

    pub(crate) fn require_bool(
        &self,
        value: &Value,
        at: impl Into<Operand>,
    ) -> Result<bool, TemplateError> {
        let at = at.into();
        match self.facet(value.as_bool(), at)? {
            Some(b) => Ok(b),
            None => Err(self.type_mismatch(at, Capabilities::BOOLEAN, value)),
        }
    }

    pub(crate) fn require_date(
        &self,
        value: &Value,
        at: impl Into<Operand>,
    ) -> Result<DateValue, TemplateError> {
        let at = at.into();
        match self.facet(value.as_date(), at)? {
            Some(date) => Ok(date),
            None => Err(self.type_mismatch(at, Capabilities::DATE, value)),
        }
    }

    /// An integral number in `i64` range.
    pub(crate) fn require_int(
        &self,
        value: &Value,
        at: impl Into<Operand>,
    ) -> Result<i64, TemplateError> {
        let at = at.into();
        let number = self.require_number(value, at)?;
        number.to_i64().ok_or_else(|| {
            self.blame_at(
                TemplateError::custom(format!(
                    "Expected an integer, but {} has evaluated to {number}",
                    self.operand_text(at)
                )),
                at,
            )
        })
    }

    pub(crate) fn eval_bool(&mut self, expr: ExprId) -> Result<bool, TemplateError> {
        let value = self.eval(expr)?;
        self.require_bool(&value, expr)
    }

    pub(crate) fn eval_number(&mut self, expr: ExprId) -> Result<Number, TemplateError> {
        let value = self.eval(expr)?;
        self.require_number(&value, expr)
    }

    pub(crate) fn eval_int(&mut self, expr: ExprId) -> Result<i64, TemplateError> {
        let value = self.eval(expr)?;
        self.require_int(&value, expr)
    }
}
