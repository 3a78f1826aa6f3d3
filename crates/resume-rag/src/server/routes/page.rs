//! The browser chat page

use axum::{extract::State, response::Html};

use crate::server::state::AppState;

const CHAT_PAGE: &str = include_str!("../../../static/chat.html");

/// GET / - chat page with the configured title and description
pub async fn chat_page(State(state): State<AppState>) -> Html<String> {
    let ui = &state.config().ui;
    Html(render(&ui.title, &ui.description))
}

fn render(title: &str, description: &str) -> String {
    CHAT_PAGE
        .replace("{{title}}", &escape_html(title))
        .replace("{{description}}", &escape_html(description))
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_and_escapes() {
        let html = render("Resume <Helper>", "Ask about \"data/\" & more");
        assert!(html.contains("<title>Resume &lt;Helper&gt;</title>"));
        assert!(html.contains("Ask about &quot;data/&quot; &amp; more"));
        assert!(!html.contains("{{title}}"));
        assert!(!html.contains("{{description}}"));
    }
}
