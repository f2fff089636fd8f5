use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The listing page or feed could not be parsed into a document.
    #[error("cannot load {kind} document: {message}")]
    DocumentParse {
        kind: DocumentKind,
        message: String,
    },

    /// A query over a parsed document could not be constructed.
    #[error("cannot create query handler: {0}")]
    QueryEngine(String),

    #[error("no show id referenced on listing page {uri}")]
    ShowIdNotFound { uri: String },

    #[error("fetch {uri}")]
    Fetch {
        uri: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("episode store: {operation}")]
    Store {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("submit season candidates")]
    Submit(#[source] anyhow::Error),
}

impl ScrapeError {
    pub(crate) fn html(message: impl Into<String>) -> Self {
        Self::DocumentParse {
            kind: DocumentKind::Html,
            message: message.into(),
        }
    }

    pub(crate) fn xml(message: impl Into<String>) -> Self {
        Self::DocumentParse {
            kind: DocumentKind::Xml,
            message: message.into(),
        }
    }

    pub(crate) fn store(operation: &'static str, source: anyhow::Error) -> Self {
        Self::Store { operation, source }
    }

    /// Whether this error came from a collaborator (transport or store)
    /// rather than from the documents themselves.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. } | Self::Store { .. } | Self::Submit(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Html,
    Xml,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Html => f.write_str("HTML"),
            Self::Xml => f.write_str("XML"),
        }
    }
}
