use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to parse {format} input: {details} (line {line_number})")]
    Parse {
        format: &'static str,
        line_number: usize,
        details: String,
    },

    #[error("{field} '{value}' does not fit its {width}-column field")]
    FieldTooWide {
        field: &'static str,
        value: String,
        width: usize,
    },

    #[error("inconsistent {format} data: {details}")]
    InconsistentData {
        format: &'static str,
        details: String,
    },
}

impl Error {
    pub fn parse(format: &'static str, line_number: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            format,
            line_number,
            details: details.into(),
        }
    }

    pub fn field_too_wide(field: &'static str, value: impl ToString, width: usize) -> Self {
        Self::FieldTooWide {
            field,
            value: value.to_string(),
            width,
        }
    }

    pub fn inconsistent_data(format: &'static str, details: impl Into<String>) -> Self {
        Self::InconsistentData {
            format,
            details: details.into(),
        }
    }
}
