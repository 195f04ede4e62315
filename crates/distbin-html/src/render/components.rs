//! Shared HTML components used across pages.

use maud::{DOCTYPE, Markup, PreEscaped, html};

/// Inline CSS for all pages.
///
/// Serif reading layout with a fixed-height composition area above the fold.
pub const PAGE_CSS: &str = r#"
html{box-sizing:border-box}
*,*::before,*::after{box-sizing:inherit}
:root{--bg:#fff;--fg:#111;--fg2:#555;--fg3:#999;--accent:#0645ad;--field:#f4f4f4;--mono:"SF Mono",SFMono-Regular,ui-monospace,Menlo,monospace}
body{font-family:Georgia,"Times New Roman",serif;margin:0 auto;max-width:42em;padding:1em;color:var(--fg);background:var(--bg)}
pre{max-width:100%;overflow-x:auto;font-family:var(--mono);font-size:.85em}
p a{word-wrap:break-word}
p img{max-width:100%}
a{color:var(--accent)}

.distbin-header{margin-bottom:1em;width:100%;display:flex;justify-content:space-between;align-items:baseline}
.distbin-header a{color:var(--fg);text-decoration:none}
.distbin-header-title{font-weight:bold}
.distbin-above-fold{height:calc(100vh - 3em)}

.footer{text-align:center;margin-top:2em;font-size:.8em;color:var(--fg3)}

@media(prefers-color-scheme:dark){
:root{--bg:#111;--fg:#e5e5e5;--fg2:#a0a0a0;--fg3:#666;--accent:#8ab4f8;--field:#1c1c1c}
}
"#;

/// Inline CSS for error pages.
pub const ERROR_CSS: &str = r#"
*{margin:0;padding:0;box-sizing:border-box}
body{font-family:Georgia,"Times New Roman",serif;display:flex;justify-content:center;align-items:center;min-height:100vh;background:#fff;color:#111;padding:1rem}
.error-page{text-align:center;max-width:400px}
.error-page h1{font-size:1.5rem;margin-bottom:.75rem}
.error-page p{color:#666;margin-bottom:1rem;line-height:1.5;word-wrap:break-word}
.error-page a{color:#0645ad}
@media(prefers-color-scheme:dark){
body{background:#111;color:#e5e5e5}
.error-page p{color:#aaa}
.error-page a{color:#8ab4f8}
}
"#;

/// Content-Security-Policy header value.
///
/// Inline styles plus the one inline script that focuses the form. Forms may
/// only post back to this origin.
pub const CSP_HEADER: &str = "default-src 'none'; style-src 'unsafe-inline'; script-src 'unsafe-inline'; img-src https: data:; form-action 'self'; frame-ancestors 'none'";

/// Wrap page content in the common document shell (head, header, footer).
pub fn page_shell(title: &str, description: &str, body_content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                meta name="description" content=(description);
                style { (PreEscaped(PAGE_CSS)) }
            }
            body {
                (header())
                main class="distbin-main" { (body_content) }
                footer class="footer" {
                    "Posts are sent to a "
                    a href="https://www.w3.org/TR/activitypub/" { "ActivityPub" }
                    " outbox."
                }
            }
        }
    }
}

fn header() -> Markup {
    html! {
        header class="distbin-header" {
            a class="distbin-header-title" href="/" { "distbin" }
            a href="/" { "new post" }
        }
    }
}

/// Content that should fill the first screen.
pub fn above_fold(content: Markup) -> Markup {
    html! {
        div class="distbin-above-fold" { (content) }
    }
}
