use std::fmt;
use thiserror::Error;

/// Which uploaded input failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Xml,
    Docx,
    Template,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::Xml => write!(f, "XML"),
            InputKind::Docx => write!(f, "DOCX"),
            InputKind::Template => write!(f, "template DOCX"),
        }
    }
}

/// Stage of the template fill that failed after the template parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStage {
    Mutation,
    Serialization,
}

impl fmt::Display for FillStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillStage::Mutation => write!(f, "mutation"),
            FillStage::Serialization => write!(f, "serialization"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Erro ao processar {kind}: {detail}")]
    MalformedInput { kind: InputKind, detail: String },

    #[error("Erro ao preencher template ({stage}): {detail}")]
    TemplateFill { stage: FillStage, detail: String },
}

impl ProcessingError {
    pub fn malformed(kind: InputKind, detail: impl fmt::Display) -> Self {
        ProcessingError::MalformedInput {
            kind,
            detail: detail.to_string(),
        }
    }

    pub fn fill(stage: FillStage, detail: impl fmt::Display) -> Self {
        ProcessingError::TemplateFill {
            stage,
            detail: detail.to_string(),
        }
    }

    /// True when the uploaded data was at fault rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ProcessingError::MalformedInput { .. })
    }
}

pub type ProcessingResult<T> = Result<T, ProcessingError>;
