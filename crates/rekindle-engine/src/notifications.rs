// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification email composition.
//!
//! Builds subject and HTML body; transports are behind the
//! [`rekindle_core::Notifier`] trait and know nothing about content.

/// Email telling an agent that a client replied to a follow-up.
///
/// Returns `(subject, html_body)`.
pub fn reply_notification(
    agent_first_name: &str,
    client_name: &str,
    reply_text: &str,
) -> (String, String) {
    let subject = format!("{client_name} replied to your message");
    let html = format!(
        "<h2>You got a reply!</h2>\
         <p>Hey {agent_first_name}, {client_name} just replied to your message:</p>\
         <blockquote style=\"padding:12px;background:#f0f0f0;border-left:4px solid #1e8a9c;margin:16px 0;\">{reply_text}</blockquote>\
         <p>Log in to your dashboard to respond.</p>"
    );
    (subject, html)
}
