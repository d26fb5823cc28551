//! Server-rendered HTML pages.
//!
//! Every page shares one layout. Values are HTML-escaped where they land in
//! markup and JSON-encoded where they land in inline scripts.

use http_common::{html_escape, js_string};

const APP_NAME: &str = "LinkySteps";

fn layout(title: &str, content: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - {app}</title>
    <style>
        body {{ font-family: system-ui, sans-serif; margin: 0; background: #0b1220; color: #e5e7eb; }}
        a {{ color: #22d3ee; }}
        main {{ max-width: 720px; margin: 0 auto; padding: 24px 16px; }}
        .card {{ background: #0f172a; border-radius: 12px; padding: 20px; }}
        input, .btn {{ width: 100%; padding: 12px; border-radius: 8px; box-sizing: border-box; }}
        .btn {{ display: block; text-align: center; cursor: pointer; font-weight: 600; }}
        .btn:disabled {{ opacity: .6; cursor: not-allowed; }}
        .muted {{ color: #94a3b8; }}
        .error {{ color: #f87171; }}
    </style>
</head>
<body>
    <header><main><a href="/"><strong>{app}</strong></a></main></header>
    <main>
{content}
    </main>
    <footer><main class="muted"><a href="/privacy">Privacy</a></main></footer>
</body>
</html>"##,
        title = html_escape(title),
        app = APP_NAME,
        content = content,
    )
}

/// Home page with the submission form. `error` is shown above the form.
pub fn home(wait_seconds: u32, error: Option<&str>) -> String {
    let error_html = error
        .map(|e| format!(r#"<p class="error" id="form-error">{}</p>"#, html_escape(e)))
        .unwrap_or_default();
    let content = format!(
        r#"<div class="card">
    <h1>Shorten a link</h1>
    <p class="muted">Visitors pass through a short waiting page ({wait} seconds) before reaching the destination.</p>
    {error_html}
    <form method="post" action="/create">
        <label for="target">Original URL</label>
        <input type="url" id="target" name="target" placeholder="https://example.com/article" required>
        <p></p>
        <button class="btn" type="submit">Shorten</button>
    </form>
</div>"#,
        wait = wait_seconds,
        error_html = error_html,
    );
    layout("Shorten a link", &content)
}

/// Confirmation page showing the new short URL.
pub fn created(short_url: &str) -> String {
    let content = format!(
        r#"<div class="card">
    <h2>Your link is ready</h2>
    <p>Copy the short link and share it:</p>
    <input id="short-url" value="{url}" readonly onclick="this.select()">
    <p><a href="{url}">{url}</a></p>
    <a class="btn" href="/">Shorten another link</a>
</div>"#,
        url = html_escape(short_url),
    );
    layout("Link created", &content)
}

/// Waiting page. The continue button unlocks after `wait_seconds` and sends
/// the visitor to `next_url`.
pub fn interstitial(step: u32, total: u32, wait_seconds: u32, next_url: &str) -> String {
    let content = format!(
        r#"<div class="card">
    <h1>Please wait {wait} seconds</h1>
    <p class="muted">Step {step} of {total}</p>
    <div>
        <button id="btn-next" class="btn" data-next="{next_attr}" disabled>Continue</button>
        <p class="muted" id="countdown">{wait} seconds left</p>
    </div>
    <noscript><p><a href="{next_attr}">Continue</a></p></noscript>
</div>
<script>
    const nextUrl = {next_js};
    let remaining = {wait};
    const countdown = document.getElementById('countdown');
    const btn = document.getElementById('btn-next');
    function tick() {{
        if (remaining <= 0) {{
            btn.disabled = false;
            countdown.textContent = 'You can continue now';
            return;
        }}
        countdown.textContent = remaining + ' seconds left';
        remaining -= 1;
        setTimeout(tick, 1000);
    }}
    tick();
    btn.addEventListener('click', () => {{ window.location.href = nextUrl; }});
</script>"#,
        wait = wait_seconds,
        step = step,
        total = total,
        next_attr = html_escape(next_url),
        next_js = js_string(next_url),
    );
    layout("Please wait", &content)
}

/// Final page: redirects to `target` after `delay_ms`, with a manual link.
pub fn final_redirect(target: &str, delay_ms: u32) -> String {
    let content = format!(
        r#"<div class="card">
    <h1>Ready to go</h1>
    <p class="muted">If you are not redirected automatically, use the button below.</p>
    <a class="btn" id="go-now" href="{target_attr}">Go now</a>
</div>
<script>
    setTimeout(function () {{ window.location.href = {target_js}; }}, {delay});
</script>"#,
        target_attr = html_escape(target),
        target_js = js_string(target),
        delay = delay_ms,
    );
    layout("Redirecting", &content)
}

pub fn privacy() -> String {
    let content = r#"<div class="card">
    <h1>Privacy</h1>
    <p>We store the links you shorten together with a visit counter. No personal data is attached to them.</p>
    <p>To have a short link removed, contact the site operator with proof of ownership.</p>
</div>"#;
    layout("Privacy", content)
}

pub fn not_found() -> String {
    let content = r#"<div class="card">
    <h2>Link not found</h2>
    <p class="muted">Check that the short link is correct.</p>
    <a class="btn" href="/">Back to home</a>
</div>"#;
    layout("Not found", content)
}

pub fn server_error(message: &str) -> String {
    let content = format!(
        r#"<div class="card">
    <h2>Request failed</h2>
    <p class="error">{}</p>
    <a class="btn" href="/">Back to home</a>
</div>"#,
        html_escape(message)
    );
    layout("Error", &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_shows_wait_and_error() {
        let page = home(20, Some("bad <url>"));
        assert!(page.contains("(20 seconds)"));
        assert!(page.contains(r#"action="/create""#));
        assert!(page.contains("bad &lt;url&gt;"));
        assert!(!home(20, None).contains("form-error"));
    }

    #[test]
    fn interstitial_embeds_next_url() {
        let page = interstitial(1, 2, 7, "/s/abc123/2");
        assert!(page.contains(r#"const nextUrl = "/s/abc123/2";"#));
        assert!(page.contains("let remaining = 7;"));
        assert!(page.contains("Step 1 of 2"));
    }

    #[test]
    fn final_redirect_escapes_target() {
        let page = final_redirect("https://e.com/?a=1&b=\"2\"", 1200);
        assert!(page.contains(r#"href="https://e.com/?a=1&amp;b=&quot;2&quot;""#));
        assert!(page.contains(r#"window.location.href = "https://e.com/?a=1\u0026b=\"2\""; }, 1200);"#));
    }

    #[test]
    fn created_shows_short_url() {
        assert!(created("http://h/go/abc123").contains(r#"value="http://h/go/abc123""#));
    }
}
