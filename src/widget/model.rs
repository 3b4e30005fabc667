//! View entries rendered by the chat widget.

use std::fmt;

use axum::body::Bytes;
use serde::Serialize;
use uuid::Uuid;

use crate::protocol::Parameters;

/// Text shown by the typing placeholder.
pub const TYPING_TEXT: &str = "Đang tạo...";

/// Prompt appended after a parameter table.
pub const CONFIRM_PROMPT: &str =
    "Nếu bạn thấy thông số đã ổn, hãy nhập 'Xác nhận' để tôi bắt đầu tạo bản vẽ.";

/// Bot message appended after a generated design.
pub const DESIGN_READY_TEXT: &str = "File thiết kế đã được tạo.";

/// File name the design is offered under.
pub const DESIGN_FILE_NAME: &str = "design.png";

/// Alt text of the design image.
pub const DESIGN_ALT_TEXT: &str = "Thiết kế phòng net";

/// Header of the parameter table.
pub const TABLE_HEADERS: [&str; 4] = ["Thực thể", "Kích thước", "Đơn vị", "Có/Không"];

/// Token correlating a submission with its placeholder and outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SubmissionId(Uuid);

impl SubmissionId {
    /// Generate a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an id from its string form.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Position-independent id of a view entry within one widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntryId(pub(crate) u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Who a message comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person typing.
    User,
    /// The design assistant.
    Bot,
}

impl Sender {
    /// CSS class of messages from this sender.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::User => "user-message",
            Self::Bot => "bot-message",
        }
    }
}

/// Presentation kind of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Regular message.
    Normal,
    /// Transient "typing" indicator.
    Typing,
    /// Error-styled message.
    Error,
}

/// A single chat bubble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Message text.
    pub text: String,
    /// Author.
    pub sender: Sender,
    /// Presentation kind.
    pub kind: MessageKind,
}

impl ChatMessage {
    /// Message typed by the user.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            kind: MessageKind::Normal,
        }
    }

    /// Regular bot message.
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
            kind: MessageKind::Normal,
        }
    }

    /// Error-styled bot message.
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
            kind: MessageKind::Error,
        }
    }

    /// Typing placeholder.
    #[must_use]
    pub fn typing() -> Self {
        Self {
            text: TYPING_TEXT.to_string(),
            sender: Sender::Bot,
            kind: MessageKind::Typing,
        }
    }

    /// Whether this is a typing placeholder.
    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.kind == MessageKind::Typing
    }
}

/// Display label for an entity-type code.
///
/// ```rust
/// use netcafe_chat::widget::entity_label;
///
/// assert_eq!(entity_label("lối"), "lối đi");
/// assert_eq!(entity_label("phòng"), "phòng");
/// ```
#[must_use]
pub fn entity_label(code: &str) -> &str {
    match code {
        "lối" => "lối đi",
        "giữa" => "khoảng cách giữa các bàn",
        "quầy" => "quầy lễ tân",
        other => other,
    }
}

/// Parameter summary, one row of four display cells per backend entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterTable {
    rows: Vec<[String; 4]>,
}

impl ParameterTable {
    /// Build the table from decoded parameters.
    #[must_use]
    pub fn from_parameters(parameters: &Parameters) -> Self {
        let rows = parameters
            .iter()
            .map(|(_, row)| {
                [
                    entity_label(&row.entity_type).to_string(),
                    row.size_text(),
                    row.unit.clone().unwrap_or_default(),
                    row.present.clone().unwrap_or_default(),
                ]
            })
            .collect();
        Self { rows }
    }

    /// Header cells.
    #[must_use]
    pub fn headers(&self) -> [&'static str; 4] {
        TABLE_HEADERS
    }

    /// Body rows.
    #[must_use]
    pub fn rows(&self) -> &[[String; 4]] {
        &self.rows
    }
}

/// A generated design plus its download action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageView {
    /// Id used in the image and download URLs.
    pub id: Uuid,
    /// Image bytes, shared by the view and the download.
    #[serde(skip)]
    pub payload: Bytes,
    /// Image alt text.
    pub alt: &'static str,
    /// File name offered by the download action.
    pub download_name: &'static str,
}

impl ImageView {
    /// Wrap a design payload.
    #[must_use]
    pub fn new(payload: Bytes) -> Self {
        Self {
            id: Uuid::new_v4(),
            payload,
            alt: DESIGN_ALT_TEXT,
            download_name: DESIGN_FILE_NAME,
        }
    }
}

/// Content of one entry in the chat output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ViewEntry {
    /// Chat bubble.
    Message(ChatMessage),
    /// Parameter table.
    Table(ParameterTable),
    /// Design image with download action.
    Image(ImageView),
}

/// A view entry placed in the widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    /// Id within the widget.
    pub id: EntryId,
    /// Submission this entry answers; `None` for user messages.
    pub reply_to: Option<SubmissionId>,
    /// What to render.
    pub view: ViewEntry,
}

impl Entry {
    /// Whether this entry is the typing placeholder of a submission.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(&self.view, ViewEntry::Message(m) if m.is_typing())
    }
}
