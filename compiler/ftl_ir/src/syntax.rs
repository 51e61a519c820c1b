//! Tag and interpolation syntax choices.

/// Which brackets delimit FTL tags.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum TagSyntax {
    /// `<#if x>...</#if>`, `<@m/>`
    Angle,
    /// `[#if x]...[/#if]`, `[@m/]`
    Square,
    /// The first FTL tag in the template decides.
    #[default]
    AutoDetect,
}

impl TagSyntax {
    pub const fn open(self) -> char {
        match self {
            TagSyntax::Square => '[',
            TagSyntax::Angle | TagSyntax::AutoDetect => '<',
        }
    }

    pub const fn close(self) -> char {
        match self {
            TagSyntax::Square => ']',
            TagSyntax::Angle | TagSyntax::AutoDetect => '>',
        }
    }
}

/// How interpolations are written.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum InterpolationSyntax {
    /// `${expr}`
    #[default]
    Dollar,
    /// `[=expr]`
    Bracket,
}

impl InterpolationSyntax {
    pub const fn open(self) -> &'static str {
        match self {
            InterpolationSyntax::Dollar => "${",
            InterpolationSyntax::Bracket => "[=",
        }
    }

    pub const fn close(self) -> char {
        match self {
            InterpolationSyntax::Dollar => '}',
            InterpolationSyntax::Bracket => ']',
        }
    }
}
