//! Human-labelled enums ("In Progress", "Due Soon", ...).
//!
//! Dispatch screens, CSV rosters and the CLI all speak in these labels, so the
//! serde form and `Display` use the label and parsing is forgiving about case
//! and separators: `in-progress`, `IN_PROGRESS` and `In Progress` are the same.

macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::SchedulingError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = $crate::labels::normalize_label(s);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| $crate::labels::normalize_label(v.label()) == wanted)
                    .ok_or_else(|| {
                        $crate::error::SchedulingError::invalid_input(format!(
                            "unknown {} '{}'",
                            stringify!($name),
                            s.trim()
                        ))
                    })
            }
        }
    };
}

pub(crate) use labeled_enum;

/// Lowercase and drop spaces, dashes and underscores.
pub fn normalize_label(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}
