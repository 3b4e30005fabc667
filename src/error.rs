//! Error types for the chat widget.
//!
//! The `Display` text of every runtime variant is what the user sees in the
//! chat view, so it is written in the widget's language.

use thiserror::Error;

/// Failure of a single backend exchange.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Backend unreachable, or the response body could not be read.
    #[error("Không thể kết nối với server: {0}")]
    Transport(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Có lỗi xảy ra khi kết nối với server (HTTP {status}).")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// JSON body or parameter rows could not be interpreted.
    #[error("Phản hồi không hợp lệ từ server: {0}")]
    Malformed(String),

    /// Content type is neither JSON nor a binary stream.
    #[error("Server trả về kiểu nội dung không được hỗ trợ: {0}")]
    UnsupportedContentType(String),

    /// Well-formed JSON carrying neither `response` nor `parameters`.
    #[error("Không nhận được phản hồi phù hợp từ server.")]
    NoSuitableResponse,

    /// The exchange task died before producing a reply.
    #[error("Yêu cầu tới server bị gián đoạn: {0}")]
    Interrupted(#[from] tokio::task::JoinError),

    /// Backend base URL or chat path does not form a valid URL.
    #[error("Địa chỉ backend không hợp lệ: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ChatError {
    /// Text of the error-styled bot message rendered for this failure.
    #[must_use]
    pub fn chat_text(&self) -> String {
        match self {
            Self::NoSuitableResponse => self.to_string(),
            other => format!("Lỗi: {other}"),
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Result type alias for backend exchanges.
pub type Result<T> = std::result::Result<T, ChatError>;
