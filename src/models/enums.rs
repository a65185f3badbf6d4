use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid value for {field}: {value}")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + case-insensitive std::str::FromStr
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(SearchField {
    Name => "name",
    Category => "category",
});

str_enum!(ExportFormat {
    Csv => "csv",
    Pdf => "pdf",
});

impl SearchField {
    /// Column the field filters on. Fixed strings only, never user input.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Category => "category",
        }
    }
}

impl ExportFormat {
    /// Infer the export format from a destination file extension.
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::str::FromStr;

    #[test]
    fn search_field_parses_case_insensitively() {
        assert_eq!(SearchField::from_str("Name").unwrap(), SearchField::Name);
        assert_eq!(SearchField::from_str(" CATEGORY ").unwrap(), SearchField::Category);
    }

    #[test]
    fn unknown_search_field_rejected() {
        let err = SearchField::from_str("address").unwrap_err();
        assert_eq!(err.field, "SearchField");
        assert_eq!(err.value, "address");
    }

    #[test]
    fn export_format_from_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("out/producers.CSV")), Some(ExportFormat::Csv));
        assert_eq!(ExportFormat::from_path(Path::new("report.pdf")), Some(ExportFormat::Pdf));
        assert_eq!(ExportFormat::from_path(Path::new("report.xlsx")), None);
        assert_eq!(ExportFormat::from_path(Path::new("no_extension")), None);
    }
}
