// Cast types and their refinements

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::PlanError;

/// Target type requested for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CastType {
    /// Leave the column to backend inference
    Default,
    Uint,
    Int,
    Float,
    Category,
    Complex,
    Object,
    Datetime,
    Timedelta,
}

impl CastType {
    pub const ALL: [CastType; 9] = [
        CastType::Default,
        CastType::Uint,
        CastType::Int,
        CastType::Float,
        CastType::Category,
        CastType::Complex,
        CastType::Object,
        CastType::Datetime,
        CastType::Timedelta,
    ];

    /// Wire tag, also used as the directive value when no option is set.
    pub fn tag(&self) -> &'static str {
        match self {
            CastType::Default => "default",
            CastType::Uint => "uint",
            CastType::Int => "int",
            CastType::Float => "float",
            CastType::Category => "category",
            CastType::Complex => "complex",
            CastType::Object => "object",
            CastType::Datetime => "datetime",
            CastType::Timedelta => "timedelta",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CastType::Default => "No Change",
            CastType::Uint => "Unsigned Integer",
            CastType::Int => "Signed Integer",
            CastType::Float => "Floating Point",
            CastType::Category => "Category",
            CastType::Complex => "Complex Number",
            CastType::Object => "Text",
            CastType::Datetime => "Date and Time",
            CastType::Timedelta => "Time Delta",
        }
    }

    /// Enumerated option tags with their labels, for numeric types.
    pub fn width_options(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            CastType::Uint => UintWidth::OPTIONS,
            CastType::Int => IntWidth::OPTIONS,
            CastType::Float => FloatWidth::OPTIONS,
            _ => &[],
        }
    }

    /// Whether a refinement can be attached.
    pub fn accepts_option(&self) -> bool {
        matches!(
            self,
            CastType::Uint | CastType::Int | CastType::Float | CastType::Datetime
        )
    }
}

impl fmt::Display for CastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for CastType {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CastType::ALL
            .into_iter()
            .find(|t| t.tag() == s)
            .ok_or_else(|| PlanError::UnknownType(s.to_string()))
    }
}

macro_rules! widths {
    ($name:ident: $name_type:ident { $($variant:ident => $tag:literal, $label:literal;)+ }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const OPTIONS: &'static [(&'static str, &'static str)] = &[$(($tag, $label),)+];

            pub fn tag(&self) -> &'static str {
                match self {
                    $($name::$variant => $tag,)+
                }
            }

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            fn parse(s: &str) -> Option<Self> {
                match s {
                    $($tag => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl FromStr for $name {
            type Err = PlanError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::parse(s).ok_or_else(|| PlanError::InvalidOption {
                    cast_type: CastType::$name_type,
                    value: s.to_string(),
                })
            }
        }
    };
}

// 64-bit unsigned is left out: the storage layer tops out at 2**63.
widths!(UintWidth: Uint {
    Uint8 => "uint8", "8 bits";
    Uint16 => "uint16", "16 bits";
    Uint32 => "uint32", "32 bits";
});

widths!(IntWidth: Int {
    Int8 => "int8", "8 bits";
    Int16 => "int16", "16 bits";
    Int32 => "int32", "32 bits";
    Int64 => "int64", "64 bits";
});

widths!(FloatWidth: Float {
    Float32 => "float32", "32 bits";
    Float64 => "float64", "64 bits";
});

/// A column's requested cast: the type plus whatever refinement it allows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CastSpec {
    #[default]
    Default,
    Uint(Option<UintWidth>),
    Int(Option<IntWidth>),
    Float(Option<FloatWidth>),
    Category,
    Complex,
    Object,
    /// Optional strftime-style format; `None` lets the backend auto-detect
    Datetime(Option<String>),
    Timedelta,
}

impl CastSpec {
    /// Spec for a type with no refinement.
    pub fn of(cast_type: CastType) -> Self {
        match cast_type {
            CastType::Default => CastSpec::Default,
            CastType::Uint => CastSpec::Uint(None),
            CastType::Int => CastSpec::Int(None),
            CastType::Float => CastSpec::Float(None),
            CastType::Category => CastSpec::Category,
            CastType::Complex => CastSpec::Complex,
            CastType::Object => CastSpec::Object,
            CastType::Datetime => CastSpec::Datetime(None),
            CastType::Timedelta => CastSpec::Timedelta,
        }
    }

    pub fn cast_type(&self) -> CastType {
        match self {
            CastSpec::Default => CastType::Default,
            CastSpec::Uint(_) => CastType::Uint,
            CastSpec::Int(_) => CastType::Int,
            CastSpec::Float(_) => CastType::Float,
            CastSpec::Category => CastType::Category,
            CastSpec::Complex => CastType::Complex,
            CastSpec::Object => CastType::Object,
            CastSpec::Datetime(_) => CastType::Datetime,
            CastSpec::Timedelta => CastType::Timedelta,
        }
    }

    /// The refinement as its wire text, if any.
    pub fn option(&self) -> Option<&str> {
        match self {
            CastSpec::Uint(w) => w.map(|w| w.tag()),
            CastSpec::Int(w) => w.map(|w| w.tag()),
            CastSpec::Float(w) => w.map(|w| w.tag()),
            CastSpec::Datetime(fmt) => fmt.as_deref(),
            _ => None,
        }
    }

    /// Replace the refinement, keeping the type.
    ///
    /// For numeric types `value` must be one of the enumerated widths, or
    /// `default`/empty to clear it. For datetimes any text is a format and
    /// empty text clears it.
    pub fn with_option(&self, value: &str) -> Result<Self, PlanError> {
        let cast_type = self.cast_type();
        let clear = value.is_empty() || (value == "default" && cast_type != CastType::Datetime);
        let invalid = || PlanError::InvalidOption {
            cast_type,
            value: value.to_string(),
        };

        let spec = match self {
            CastSpec::Uint(_) if clear => CastSpec::Uint(None),
            CastSpec::Uint(_) => CastSpec::Uint(Some(UintWidth::parse(value).ok_or_else(invalid)?)),
            CastSpec::Int(_) if clear => CastSpec::Int(None),
            CastSpec::Int(_) => CastSpec::Int(Some(IntWidth::parse(value).ok_or_else(invalid)?)),
            CastSpec::Float(_) if clear => CastSpec::Float(None),
            CastSpec::Float(_) => CastSpec::Float(Some(FloatWidth::parse(value).ok_or_else(invalid)?)),
            CastSpec::Datetime(_) if value.is_empty() => CastSpec::Datetime(None),
            CastSpec::Datetime(_) => CastSpec::Datetime(Some(value.to_string())),
            _ => return Err(PlanError::OptionNotSupported(cast_type)),
        };
        Ok(spec)
    }

    /// Directive value sent with the upload, or `None` for `default`.
    pub fn directive_value(&self) -> Option<String> {
        match self {
            CastSpec::Default => None,
            CastSpec::Datetime(Some(fmt)) => Some(format!("datetime({})", fmt)),
            other => Some(
                other
                    .option()
                    .unwrap_or_else(|| other.cast_type().tag())
                    .to_string(),
            ),
        }
    }
}
