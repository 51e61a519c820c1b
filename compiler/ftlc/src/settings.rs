//! Settings files for the `ftl` command.
//!
//! ```json
//! {
//!   "tag_syntax": "square",
//!   "output_format": "HTML",
//!   "number_format": "0.##",
//!   "time_zone": "+01:00"
//! }
//! ```

use std::collections::BTreeMap;

use ftl_ir::{InterpolationSyntax, TagSyntax};
use serde::Deserialize;

use crate::config::{ConfigError, ConfigurationBuilder};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagSyntaxSetting {
    Angle,
    Square,
    AutoDetect,
}

impl From<TagSyntaxSetting> for TagSyntax {
    fn from(setting: TagSyntaxSetting) -> Self {
        match setting {
            TagSyntaxSetting::Angle => TagSyntax::Angle,
            TagSyntaxSetting::Square => TagSyntax::Square,
            TagSyntaxSetting::AutoDetect => TagSyntax::AutoDetect,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationSetting {
    Dollar,
    Bracket,
}

impl From<InterpolationSetting> for InterpolationSyntax {
    fn from(setting: InterpolationSetting) -> Self {
        match setting {
            InterpolationSetting::Dollar => InterpolationSyntax::Dollar,
            InterpolationSetting::Bracket => InterpolationSyntax::Bracket,
        }
    }
}

/// Parser options plus render settings by name; every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tag_syntax: Option<TagSyntaxSetting>,
    pub interpolation_syntax: Option<InterpolationSetting>,
    pub output_format: Option<String>,
    pub auto_escape: Option<bool>,
    pub strip_whitespace: Option<bool>,
    /// Everything else, as `#setting` names and values.
    #[serde(flatten)]
    pub render: BTreeMap<String, String>,
}

impl Settings {
    pub fn from_json(text: &str) -> Result<Settings, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Apply on top of `builder`.
    pub fn apply(
        &self,
        mut builder: ConfigurationBuilder,
    ) -> Result<ConfigurationBuilder, ConfigError> {
        if let Some(syntax) = self.tag_syntax {
            builder = builder.tag_syntax(syntax.into());
        }
        if let Some(syntax) = self.interpolation_syntax {
            builder = builder.interpolation_syntax(syntax.into());
        }
        if let Some(format) = &self.output_format {
            builder = builder.output_format_name(format)?;
        }
        if let Some(enabled) = self.auto_escape {
            builder = builder.auto_escape(enabled);
        }
        if let Some(enabled) = self.strip_whitespace {
            builder = builder.strip_whitespace(enabled);
        }
        for (name, value) in &self.render {
            builder = builder.setting(name, value)?;
        }
        Ok(builder)
    }
}
