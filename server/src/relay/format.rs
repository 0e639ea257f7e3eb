//! Notification templates.
//!
//! One fixed template per form type, rendered as Telegram HTML. Field values
//! are [`SafeText`] and are interpolated without further escaping.

use std::fmt::Write as _;

use super::error::RelayError;
use super::types::{FormType, SafeText, Submission};

/// Telegram rejects longer texts; the relay refuses instead of truncating.
///
/// Counted in UTF-16 code units, the unit Telegram measures message length in.
pub const MAX_MESSAGE_LEN: usize = 4000;

const LEAD_TITLE: &str = "🎯 <b>НОВАЯ ЗАЯВКА С САЙТА</b>";
const CONSULTATION_TITLE: &str = "🎯 <b>НОВАЯ ЗАЯВКА НА КОНСУЛЬТАЦИЮ</b>";
const CONSULTATION_FOOTER: &str = "📍 <b>Форма:</b> Запись на консультацию (футер сайта)";

/// Render the notification text for a submission.
pub fn format_message(submission: &Submission) -> String {
    match submission.form_type {
        FormType::Lead => format_lead(submission),
        FormType::Consultation => format_consultation(submission),
    }
}

/// Render and enforce [`MAX_MESSAGE_LEN`].
pub fn render(submission: &Submission) -> Result<String, RelayError> {
    let message = format_message(submission);
    let length = message.encode_utf16().count();
    if length > MAX_MESSAGE_LEN {
        return Err(RelayError::MessageTooLong { length });
    }
    Ok(message)
}

fn format_lead(s: &Submission) -> String {
    let mut out = format!("{LEAD_TITLE}\n\n");

    push_line(&mut out, "📱 <b>Контакт:</b> ", s.contact.as_ref());
    push_line(&mut out, "📧 <b>Email:</b> ", s.email.as_ref());
    push_line(&mut out, "💬 <b>Сообщение:</b>\n", s.message.as_ref());

    if !s.modules.is_empty() {
        out.push_str("\n📦 <b>Выбранные модули:</b>\n");
        for module in &s.modules {
            let _ = writeln!(out, "  • {module}");
        }
    }

    if let Some(total) = &s.total {
        let _ = write!(out, "\n💰 <b>Итого:</b> {total}");
    }

    out
}

fn format_consultation(s: &Submission) -> String {
    let mut out = format!("{CONSULTATION_TITLE}\n\n");

    push_line(&mut out, "👤 <b>Имя:</b> ", s.name.as_ref());
    push_line(&mut out, "📱 <b>Контакт:</b> ", s.contact.as_ref());

    out.push('\n');
    out.push_str(CONSULTATION_FOOTER);
    out
}

fn push_line(out: &mut String, label: &str, value: Option<&SafeText>) {
    if let Some(value) = value {
        let _ = writeln!(out, "{label}{value}");
    }
}
