//! Closed string enumerations used for statuses and device modes.
//!
//! [`define_choice!`] generates an enum whose variants map one-to-one to
//! wire strings, plus the parsing and listing helpers the device setters
//! and the drift engine rely on.

macro_rules! define_choice {
    (
        $(#[doc = $doc:expr])*
        $name:ident($field:literal) {
            #[default] $default:ident => $default_text:literal,
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            #[default] $default,
            $($variant),+
        }

        impl $name {
            /// Every value, in declaration order.
            pub const ALL: &'static [Self] = &[Self::$default, $(Self::$variant),+];

            /// Wire representation.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    Self::$default => $default_text,
                    $(Self::$variant => $text),+
                }
            }

            /// Parse a JSON value holding one of the wire strings.
            ///
            /// # Errors
            ///
            /// Returns a validation error when the value is not a string
            /// or names no variant.
            pub fn from_value(
                value: &serde_json::Value,
            ) -> Result<Self, $crate::error::ValidationError> {
                value
                    .as_str()
                    .ok_or($crate::error::ValidationError::WrongType {
                        field: $field,
                        expected: "string",
                    })?
                    .parse()
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|choice| choice.as_str() == s)
                    .ok_or_else(|| $crate::error::ValidationError::InvalidChoice {
                        field: $field,
                        value: s.to_string(),
                    })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use define_choice;
