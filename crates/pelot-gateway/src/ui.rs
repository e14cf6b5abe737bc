//! The single page served at `/`.

use pelot_core::config::UiConfig;

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

const SCRIPT: &str = r#"
const $ = (id) => document.getElementById(id);
const page = document.body.dataset;

async function ask() {
  const question = $("question").value;
  const answer = $("answer");
  $("warning").textContent = "";
  $("submit").disabled = true;
  try {
    const res = await fetch("/api/ask", {
      method: "POST",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify({ question }),
    });
    const body = await res.json();
    if (res.ok) {
      answer.textContent = body.answer;
    } else if (body.warning) {
      $("warning").textContent = body.warning;
    } else {
      answer.textContent = body.error;
    }
  } finally {
    $("submit").disabled = false;
  }
}

async function ingest() {
  const status = $("ingest-status");
  $("ingest").disabled = true;
  status.textContent = page.busy;
  try {
    const res = await fetch("/api/ingest", { method: "POST" });
    const body = await res.json();
    status.textContent = res.ok ? body.status : body.error;
  } finally {
    $("ingest").disabled = false;
  }
}

$("submit").addEventListener("click", ask);
$("ingest").addEventListener("click", ingest);
"#;

/// Render the page once; every field is HTML-escaped.
#[must_use]
pub(crate) fn render_page(ui: &UiConfig) -> String {
    let e = escape_html;
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{page_title}</title>
<style>
body {{ font-family: sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }}
textarea {{ width: 100%; min-height: 4rem; }}
#answer, #ingest-status {{ white-space: pre-wrap; border: 1px solid #ccc; padding: 0.75rem; min-height: 2rem; }}
#warning {{ color: #b45309; }}
aside {{ margin-top: 2rem; border-top: 1px solid #eee; padding-top: 1rem; }}
</style>
</head>
<body data-busy="{busy}">
<h1>{title}</h1>
<p>{subtitle}</p>
<label for="question">{question_label}</label>
<textarea id="question" placeholder="{question_placeholder}"></textarea>
<button id="submit" type="button">{submit_label}</button>
<p id="warning"></p>
<h2>{answer_heading}</h2>
<div id="answer">{answer_placeholder}</div>
<aside>
<button id="ingest" type="button">{ingest_label}</button>
<h3>{ingest_heading}</h3>
<div id="ingest-status"></div>
</aside>
<script>{script}</script>
</body>
</html>
"#,
        page_title = e(&ui.page_title),
        busy = e(&ui.ingest_busy),
        title = e(&ui.title),
        subtitle = e(&ui.subtitle),
        question_label = e(&ui.question_label),
        question_placeholder = e(&ui.question_placeholder),
        submit_label = e(&ui.submit_label),
        answer_heading = e(&ui.answer_heading),
        answer_placeholder = e(&ui.answer_placeholder),
        ingest_label = e(&ui.ingest_label),
        ingest_heading = e(&ui.ingest_heading),
        script = SCRIPT,
    )
}
