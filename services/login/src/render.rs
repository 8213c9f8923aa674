//! Presentation adapter for the login flow.
//!
//! The flow controller only reports which form is active; this module decides
//! how that reaches the client. Progressive-enhancement callers (marked by the
//! `HX-Request` header) receive just the active form fragment to swap in
//! place; everyone else receives the full page around it.

use axum::response::Html;

/// Minimal HTML attribute/text escaping for values interpolated into forms.
fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn message_block(message: Option<&str>) -> String {
    match message {
        Some(text) => format!(r#"<p class="message error">{}</p>"#, escape_html(text)),
        None => String::new(),
    }
}

/// The email-entry form. `passcode_sent` is false here: no code is in flight.
pub fn email_form(error: Option<&str>) -> String {
    format!(
        r#"<form id="login-form" data-passcode-sent="false" method="post" action="/" hx-post="/" hx-target="#login-form" hx-swap="outerHTML">
  {message}
  <label for="email">Email</label>
  <input type="email" id="email" name="email" required autofocus>
  <button type="submit">Send passcode</button>
</form>"#,
        message = message_block(error),
    )
}

/// The passcode-entry form. Carries the email forward in a hidden field so it
/// is never cleared within one flow iteration; the greeting only appears when
/// this submission actually issued a code.
pub fn passcode_form(
    email: &str,
    user_has_account: bool,
    passcode_sent: bool,
    error: Option<&str>,
) -> String {
    let greeting = match (passcode_sent, user_has_account) {
        (false, _) => "",
        (true, true) => "<p>Welcome back! We sent a passcode to your email.</p>\n  ",
        (true, false) => "<p>We sent a passcode to your email.</p>\n  ",
    };
    format!(
        r#"<form id="login-form" data-passcode-sent="{passcode_sent}" method="post" action="/" hx-post="/" hx-target="#login-form" hx-swap="outerHTML">
  {message}
  {greeting}<input type="hidden" name="email" value="{email}">
  <label for="passcode">Passcode</label>
  <input type="text" id="passcode" name="passcode" inputmode="numeric" autocomplete="one-time-code" required autofocus>
  <button type="submit">Sign in</button>
</form>"#,
        message = message_block(error),
        email = escape_html(email),
    )
}

pub fn page(body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Littlenote</title>
</head>
<body>
  <main>
    <h1>Littlenote</h1>
    {body}
  </main>
</body>
</html>"#
    )
}

/// Authenticated landing stub: greets the signed-in account and shows the
/// one-time notice when there is one.
pub fn notes_page(display_name: &str, notice: Option<&str>) -> String {
    let notice_block = match notice {
        Some(text) => format!(r#"<p class="message success">{}</p>"#, escape_html(text)),
        None => String::new(),
    };
    let body = format!(
        r#"{notice_block}
<p>Signed in as {name}.</p>
<section id="notes"><p>No notes yet.</p></section>
<form method="post" action="/logout"><button type="submit">Sign out</button></form>"#,
        name = escape_html(display_name),
    );
    page(&body)
}

/// Wrap a form fragment for the transport: bare fragment for `HX-Request`
/// callers, full page otherwise.
pub fn form_response(partial: bool, fragment: String) -> Html<String> {
    if partial {
        Html(fragment)
    } else {
        Html(page(&fragment))
    }
}
