//! HTML rendering of the chat widget.
//!
//! Everything the browser sees is produced here from a [`ChatWidget`]. The
//! page loads htmx; typing placeholders long-poll their submission and the
//! server answers with an out-of-band append of the outcome.

use std::fmt::Write as _;

use crate::config::UiConfig;
use crate::widget::{
    ChatMessage, ChatWidget, Entry, ImageView, MessageKind, ParameterTable, Submission,
    SubmissionId, ViewEntry,
};

/// Id of the chat output container.
pub const CHAT_OUTPUT_ID: &str = "chat-output";

/// Label of the download action.
pub const DOWNLOAD_LABEL: &str = "Tải về";

/// Escape text for use in HTML content and quoted attributes.
///
/// ```rust
/// use netcafe_chat::render::html_escape;
///
/// assert_eq!(html_escape("<b>\"2\" & 3</b>"), "&lt;b&gt;&quot;2&quot; &amp; 3&lt;/b&gt;");
/// ```
#[must_use]
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Full HTML document for a session.
#[must_use]
pub fn render_page(ui: &UiConfig, session_id: &str, widget: &ChatWidget) -> String {
    let title = html_escape(&ui.title);
    let htmx_src = html_escape(&ui.htmx_src);
    let stylesheet = html_escape(&ui.stylesheet);
    let content = render_widget(session_id, widget);
    format!(
        r#"<!DOCTYPE html>
<html lang="vi">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <script src="{htmx_src}"></script>
    <link rel="stylesheet" href="{stylesheet}">
</head>
<body>
    <main id="app" class="chat-container">
        <h1>{title}</h1>
        {content}
    </main>
</body>
</html>"#
    )
}

/// Chat output plus the input form.
#[must_use]
pub fn render_widget(session_id: &str, widget: &ChatWidget) -> String {
    let sid = html_escape(session_id);
    let mut entries = String::new();
    for entry in widget.entries() {
        entries.push_str(&render_entry(session_id, entry));
    }
    let draft = html_escape(widget.input());
    format!(
        r##"<div id="{CHAT_OUTPUT_ID}" class="chat-output" hx-on::after-settle="this.scrollTop = this.scrollHeight">{entries}</div>
<form id="chat-form" class="chat-form"
      hx-post="/chat/{sid}/messages"
      hx-target="#{CHAT_OUTPUT_ID}"
      hx-swap="beforeend"
      hx-on::after-request="if (event.detail.xhr.status === 200) this.reset()">
    <input id="user-input" type="text" name="message" value="{draft}" autocomplete="off" autofocus>
    <button id="send-button" type="submit">Gửi</button>
</form>"##
    )
}

/// One view entry.
#[must_use]
pub fn render_entry(session_id: &str, entry: &Entry) -> String {
    match &entry.view {
        ViewEntry::Message(message) => match entry.reply_to {
            Some(submission) if message.is_typing() => {
                render_placeholder(session_id, submission, message)
            }
            _ => render_message(message),
        },
        ViewEntry::Table(table) => render_parameter_table(table),
        ViewEntry::Image(image) => render_image_with_download(session_id, image),
    }
}

fn message_classes(message: &ChatMessage) -> String {
    let base = message.sender.css_class();
    match message.kind {
        MessageKind::Normal => base.to_string(),
        MessageKind::Typing => format!("{base} typing"),
        MessageKind::Error => format!("{base} error-message"),
    }
}

fn render_message(message: &ChatMessage) -> String {
    format!(
        r#"<div class="{}">{}</div>"#,
        message_classes(message),
        html_escape(&message.text)
    )
}

// Swapping the response in place of itself removes the placeholder.
fn render_placeholder(session_id: &str, submission: SubmissionId, message: &ChatMessage) -> String {
    format!(
        r#"<div class="{}" hx-get="/chat/{}/submissions/{submission}" hx-trigger="load" hx-swap="outerHTML">{}</div>"#,
        message_classes(message),
        html_escape(session_id),
        html_escape(&message.text)
    )
}

/// Parameter summary table.
#[must_use]
pub fn render_parameter_table(table: &ParameterTable) -> String {
    let mut html = String::from(r#"<table class="parameters-table"><thead><tr>"#);
    for header in table.headers() {
        let _ = write!(html, "<th>{}</th>", html_escape(header));
    }
    html.push_str("</tr></thead><tbody>");
    for row in table.rows() {
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", html_escape(cell));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

/// Design image followed by its download link. Both point at the same
/// stored payload.
#[must_use]
pub fn render_image_with_download(session_id: &str, image: &ImageView) -> String {
    let src = format!("/chat/{}/designs/{}", html_escape(session_id), image.id);
    format!(
        r#"<div class="image-container"><img class="design-image" src="{src}" alt="{alt}"><a class="download-button" href="{src}/download" download="{name}">{DOWNLOAD_LABEL}</a></div>"#,
        alt = html_escape(image.alt),
        name = html_escape(image.download_name),
    )
}

/// Fragment answering a form post: the user message and whatever the
/// submission shows so far.
#[must_use]
pub fn render_submission(session_id: &str, widget: &ChatWidget, submission: &Submission) -> String {
    widget
        .submission_entries(submission)
        .map(|entry| render_entry(session_id, entry))
        .collect()
}

/// Fragment answering a settled placeholder poll.
///
/// The main swap is empty, so the placeholder disappears. The outcome
/// entries are appended to the end of the chat output out of band.
#[must_use]
pub fn render_outcome(session_id: &str, widget: &ChatWidget, submission: SubmissionId) -> String {
    let entries: String = widget
        .outcome(submission)
        .map(|entry| render_entry(session_id, entry))
        .collect();
    format!(r#"<div hx-swap-oob="beforeend:#{CHAT_OUTPUT_ID}">{entries}</div>"#)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;
    use crate::protocol::{ParameterRow, ServerResponse};
    use axum::body::Bytes;
    use serde_json::json;

    fn ui() -> UiConfig {
        UiConfig {
            title: "Thiết kế phòng net".to_string(),
            htmx_src: "/static/htmx.js".to_string(),
            stylesheet: "/static/app.css".to_string(),
        }
    }

    #[test]
    fn test_page_contains_form_and_script() {
        let mut widget = ChatWidget::new();
        widget.set_input("3 bàn");
        let html = render_page(&ui(), "abc", &widget);

        assert!(html.contains(r#"<script src="/static/htmx.js"></script>"#));
        assert!(html.contains(r#"hx-post="/chat/abc/messages""#));
        assert!(html.contains(r#"id="chat-output""#));
        assert!(html.contains(r#"value="3 bàn""#));
    }

    #[test]
    fn test_form_appends_to_chat_output() {
        let html = render_widget("abc", &ChatWidget::new());

        assert!(html.contains(r##"hx-target="#chat-output""##));
        assert!(html.contains(r#"hx-swap="beforeend""#));
        assert!(html.ends_with("</form>"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut widget = ChatWidget::new();
        widget.submit("<script>alert(1)</script>").unwrap();
        let html = render_widget("abc", &widget);

        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>alert"));
    }

    #[test]
    fn test_submission_fragment_has_polling_placeholder() {
        let mut widget = ChatWidget::new();
        let submission = widget.submit("2 bàn").unwrap();
        widget.begin(submission.id);

        let html = render_submission("abc", &widget, &submission);

        assert!(html.starts_with(r#"<div class="user-message">2 bàn</div>"#));
        assert!(html.contains(r#"class="bot-message typing""#));
        assert!(html.contains(&format!(
            r#"hx-get="/chat/abc/submissions/{}""#,
            submission.id
        )));
        assert!(html.contains(r#"hx-trigger="load""#));
    }

    #[test]
    fn test_submission_fragment_skips_other_submissions() {
        let mut widget = ChatWidget::new();
        let first = widget.submit("một").unwrap();
        widget.begin(first.id);
        let second = widget.submit("hai").unwrap();
        widget.begin(second.id);

        let html = render_submission("abc", &widget, &second);

        assert!(!html.contains("một"));
        assert!(!html.contains(&first.id.to_string()));
    }

    #[test]
    fn test_outcome_is_out_of_band() {
        let mut widget = ChatWidget::new();
        let submission = widget.submit("2 bàn").unwrap();
        widget.begin(submission.id);
        widget.complete(
            submission.id,
            Ok(ServerResponse::Text {
                message: "Đã ghi nhận.".to_string(),
            }),
        );

        let html = render_outcome("abc", &widget, submission.id);

        assert_eq!(
            html,
            r#"<div hx-swap-oob="beforeend:#chat-output"><div class="bot-message">Đã ghi nhận.</div></div>"#
        );
    }

    #[test]
    fn test_error_outcome_is_styled() {
        let mut widget = ChatWidget::new();
        let submission = widget.submit("2 bàn").unwrap();
        widget.begin(submission.id);
        widget.complete(submission.id, Err(ChatError::Status { status: 500 }));

        let html = render_outcome("abc", &widget, submission.id);
        assert!(html.contains(r#"class="bot-message error-message""#));
        assert!(!html.contains("typing"));
    }

    #[test]
    fn test_parameter_table_markup() {
        let parameters = vec![(
            "1".to_string(),
            ParameterRow {
                entity_type: "lối".to_string(),
                size: json!(5),
                unit: Some("m".to_string()),
                present: None,
            },
        )];
        let html = render_parameter_table(&ParameterTable::from_parameters(&parameters));

        assert!(html.starts_with(r#"<table class="parameters-table">"#));
        assert!(html.contains(
            "<tr><th>Thực thể</th><th>Kích thước</th><th>Đơn vị</th><th>Có/Không</th></tr>"
        ));
        assert!(html.contains("<tr><td>lối đi</td><td>5</td><td>m</td><td></td></tr>"));
    }

    #[test]
    fn test_image_and_download_share_payload_url() {
        let image = ImageView::new(Bytes::from_static(b"\x89PNG"));
        let html = render_image_with_download("abc", &image);
        let src = format!("/chat/abc/designs/{}", image.id);

        assert!(html.contains(&format!(r#"<img class="design-image" src="{src}""#)));
        assert!(html.contains(&format!(r#"href="{src}/download" download="design.png""#)));
        assert!(html.contains("Tải về"));
    }
}
