// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template rendering against client and agent attributes.
//!
//! Pure and total: unresolved placeholders fall back to neutral defaults,
//! so rendering never fails. Supported placeholders are `{{first_name}}`,
//! `{{last_name}}`, `{{city}}`, `{{state}}`, `{{property_type}}`,
//! `{{agent_name}}`, and `{{company_name}}`.

use rekindle_core::types::{Agent, Client};

/// Render a template body for one client.
///
/// If the result does not already contain the agent's full name, a
/// signature line is appended so every outbound message is self-identifying
/// even when a template omits it by mistake.
pub fn render(template: &str, client: &Client, agent: &Agent) -> String {
    let property_label = client
        .property_type
        .map(|t| t.display_label())
        .unwrap_or("place");
    let agent_name = agent.full_name();

    let mut body = template
        .replace("{{first_name}}", &client.first_name)
        .replace("{{last_name}}", &client.last_name)
        .replace("{{city}}", client.city.as_deref().unwrap_or("your area"))
        .replace("{{state}}", client.state.as_deref().unwrap_or(""))
        .replace("{{property_type}}", property_label)
        .replace("{{agent_name}}", &agent_name)
        .replace(
            "{{company_name}}",
            agent.company_name.as_deref().unwrap_or(""),
        )
        .trim()
        .to_string();

    if !body.contains(&agent_name) {
        match agent.company_name.as_deref() {
            Some(company) => body.push_str(&format!("\n\n— {agent_name}, {company}")),
            None => body.push_str(&format!("\n\n— {agent_name}")),
        }
    }

    body
}
