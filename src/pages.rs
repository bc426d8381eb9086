//! Inline HTML pages, no template engine.

use time::format_description::well_known::Rfc3339;

use crate::qr::repo::QrCode;

const COMMON_STYLES: &str = r#"
    body { font-family: -apple-system, "Segoe UI", Roboto, Arial, sans-serif;
           max-width: 720px; margin: 40px auto; padding: 0 20px; background: #f5f5f5; }
    .container { background: white; padding: 30px; border-radius: 8px;
                 box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
    h1 { color: #333; border-bottom: 2px solid #0066cc; padding-bottom: 10px; }
    .notice { background: #fff3cd; border: 1px solid #ffeeba; color: #856404;
              padding: 10px; border-radius: 4px; margin: 15px 0; }
    label { display: block; font-weight: bold; margin: 12px 0 4px; color: #333; }
    input[type=text], input[type=password] { width: 100%; padding: 8px;
              border: 1px solid #ccc; border-radius: 4px; box-sizing: border-box; }
    button { margin-top: 15px; padding: 8px 20px; background: #0066cc; color: white;
             border: none; border-radius: 4px; cursor: pointer; }
    table { border-collapse: collapse; width: 100%; margin: 15px 0; }
    th, td { text-align: left; padding: 8px; border-bottom: 1px solid #ddd; }
    th { background-color: #f0f0f0; }
    a { color: #0066cc; }
"#;

fn escape_html(s: &str) -> String {
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

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <style>{COMMON_STYLES}</style>
</head>
<body>
    <div class="container">
{body}
    </div>
</body>
</html>"#
    )
}

fn notice_block(notice: Option<&str>) -> String {
    match notice {
        Some(msg) => format!(r#"<div class="notice">{}</div>"#, escape_html(msg)),
        None => String::new(),
    }
}

pub fn landing_page() -> String {
    layout(
        "QR Keep",
        r#"        <h1>QR Keep</h1>
        <p>Generate QR codes for any text and keep them in one place.</p>
        <p><a href="/login">Log in</a> or <a href="/register">register</a> to get started.</p>"#,
    )
}

pub fn login_page(notice: Option<&str>) -> String {
    let body = format!(
        r#"        <h1>Log in</h1>
{}
        <form method="post" action="/login">
            <label for="username">Username</label>
            <input type="text" id="username" name="username" required>
            <label for="password">Password</label>
            <input type="password" id="password" name="password" required>
            <button type="submit">Log in</button>
        </form>
        <p>No account? <a href="/register">Register</a></p>"#,
        notice_block(notice)
    );
    layout("Log in - QR Keep", &body)
}

pub fn register_page(notice: Option<&str>) -> String {
    let body = format!(
        r#"        <h1>Register</h1>
{}
        <form method="post" action="/register">
            <label for="username">Username</label>
            <input type="text" id="username" name="username" required>
            <label for="password">Password</label>
            <input type="password" id="password" name="password" required>
            <button type="submit">Register</button>
        </form>
        <p>Already registered? <a href="/login">Log in</a></p>"#,
        notice_block(notice)
    );
    layout("Register - QR Keep", &body)
}

pub fn dashboard_page(username: &str, codes: &[QrCode]) -> String {
    let mut rows = String::new();
    for code in codes {
        let created = code
            .created_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| code.created_at.to_string());
        rows.push_str(&format!(
            r#"            <tr><td>{}</td><td>{}</td><td><a href="/download/{}">download</a></td></tr>
"#,
            escape_html(&code.data),
            escape_html(&created),
            escape_html(&code.filename),
        ));
    }
    let table = if codes.is_empty() {
        "        <p>No QR codes yet.</p>".to_string()
    } else {
        format!(
            r#"        <table>
            <tr><th>Text</th><th>Created</th><th></th></tr>
{rows}        </table>"#
        )
    };
    let body = format!(
        r#"        <h1>Welcome, {}</h1>
        <form method="post" action="/generate">
            <label for="data">Text to encode</label>
            <input type="text" id="data" name="data" maxlength="500" required>
            <button type="submit">Generate QR code</button>
        </form>
        <h2>Your QR codes</h2>
{}
        <p><a href="/logout">Log out</a></p>"#,
        escape_html(username),
        table
    );
    layout("Dashboard - QR Keep", &body)
}

pub fn error_page(notice: &str) -> String {
    let body = format!(
        r#"        <h1>QR Keep</h1>
{}
        <p><a href="/">Back</a></p>"#,
        notice_block(Some(notice))
    );
    layout("QR Keep", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_data_is_escaped() {
        let page = dashboard_page("<script>alert(1)</script>", &[]);
        assert!(!page.contains("<script>alert(1)</script>"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn login_page_shows_notice() {
        let page = login_page(Some("Invalid credentials!"));
        assert!(page.contains("Invalid credentials!"));
        assert!(login_page(None).find("class=\"notice\"").is_none());
    }
}
