use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("heterogen '{heterogen}' has a bond to atom '{key}' that is not in its atom registry")]
    DanglingBond { heterogen: String, key: String },

    #[error("template '{template}' cannot be applied to heterogen '{heterogen}'")]
    TemplateMismatch { template: String, heterogen: String },
}

impl Error {
    pub fn dangling_bond(heterogen: impl Into<String>, key: impl Into<String>) -> Self {
        Self::DanglingBond {
            heterogen: heterogen.into(),
            key: key.into(),
        }
    }

    pub fn template_mismatch(template: impl Into<String>, heterogen: impl Into<String>) -> Self {
        Self::TemplateMismatch {
            template: template.into(),
            heterogen: heterogen.into(),
        }
    }
}
