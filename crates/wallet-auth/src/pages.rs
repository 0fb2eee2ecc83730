//! HTML pages returned to the browser by the callback route.

const STYLE: &str = "body { font-family: Arial, sans-serif; text-align: center; padding: 50px; background: #f5f5f5; } \
     .success { color: #28a745; font-size: 24px; margin-bottom: 20px; } \
     .error { color: #dc3545; font-size: 24px; margin-bottom: 20px; } \
     .address { background: #e9ecef; padding: 10px; border-radius: 5px; font-family: monospace; }";

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>DocWalrus - {title}</title>\n\
         <style>{STYLE}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

pub(crate) fn connected(address: &str) -> String {
    page(
        "Wallet Connected",
        &format!(
            "<div class=\"success\">Wallet Connected Successfully!</div>\n\
             <p>Address: <span class=\"address\">{}</span></p>\n\
             <p>You can now close this window and return to your terminal.</p>",
            escape_html(address)
        ),
    )
}

pub(crate) fn invalid_request(reason: &str) -> String {
    page(
        "Invalid Request",
        &format!(
            "<div class=\"error\">Invalid Request</div>\n\
             <p>{}</p>\n\
             <p>Please try connecting again from the DocWalrus website.</p>",
            escape_html(reason)
        ),
    )
}

pub(crate) fn connection_failed(reason: &str) -> String {
    page(
        "Connection Failed",
        &format!(
            "<div class=\"error\">Connection Failed</div>\n\
             <p>Error: {}</p>\n\
             <p>Please try again or connect manually.</p>",
            escape_html(reason)
        ),
    )
}

pub(crate) fn session_closed() -> String {
    page(
        "Session Closed",
        "<div class=\"error\">This connection request has already completed.</div>\n\
         <p>Run the command again from your terminal to start a new one.</p>",
    )
}

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
