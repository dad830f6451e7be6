//! The dashboard page
//!
//! Renders the startup writes of the session into one HTML document. The
//! report itself arrives later over `/api/report/stream`.

use axum::{extract::State, response::Html};
use claims_core::escape_html;
use dashboard_core::{HistorySection, MapView, MetricCard, RecordingSurface, SurfaceWrite};
use tracing::debug;

use crate::error::ServerError;
use crate::AppState;

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

/// Handler: GET /
pub async fn handle_index(State(state): State<AppState>) -> Result<Html<String>, ServerError> {
    let mut surface = RecordingSurface::new();
    {
        let mut dashboard = state.dashboard.lock().await;
        dashboard.start(&mut surface)?;
    }
    debug!("Rendering dashboard page from {} writes", surface.writes.len());
    Ok(Html(render(&surface.writes)))
}

/// Assemble the page from the session's writes
pub fn render(writes: &[SurfaceWrite]) -> String {
    let mut sidebar = String::new();
    let mut map = String::new();
    let mut metrics = String::new();
    let mut search = String::new();

    for write in writes {
        match write {
            SurfaceWrite::Sidebar { title, sections } => sidebar = render_sidebar(title, sections),
            SurfaceWrite::Map(view) => map = render_map(view),
            SurfaceWrite::Metrics { cards } => metrics = render_metrics(cards),
            SurfaceWrite::SearchBox { label, value } => search = render_search(label, value),
            _ => {}
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Claims Dashboard</title>
<link rel="stylesheet" href="{css}">
<script src="{js}"></script>
<style>{style}</style>
</head>
<body>
{sidebar}
<main>
{map}
{metrics}
{search}
<section id="report"></section>
<section id="notices"></section>
<section id="images"></section>
<button id="download" hidden>Download report as PDF</button>
</main>
<script>{script}</script>
</body>
</html>
"#,
        css = LEAFLET_CSS,
        js = LEAFLET_JS,
        style = STYLE,
        script = SCRIPT,
    )
}

fn render_sidebar(title: &str, sections: &[HistorySection]) -> String {
    let mut html = format!(
        "<aside id=\"sidebar\"><h2>{}</h2>\n<input id=\"history-filter\" placeholder=\"Search...\">\n<div id=\"history\">",
        escape_html(title)
    );
    html.push_str(&history_html(sections));
    html.push_str("</div></aside>");
    html
}

fn history_html(sections: &[HistorySection]) -> String {
    let mut html = String::new();
    for section in sections {
        html.push_str(&format!("<h3>{}</h3><ul>", escape_html(&section.title)));
        for item in &section.items {
            html.push_str(&format!("<li>{}</li>", escape_html(item)));
        }
        html.push_str("</ul>");
    }
    html
}

fn render_map(view: &MapView) -> String {
    format!(
        "<div id=\"map\" style=\"width:{}px;height:{}px\"></div>\n<script type=\"application/json\" id=\"map-data\">{}</script>",
        view.width,
        view.height,
        script_json(view)
    )
}

fn render_metrics(cards: &[MetricCard]) -> String {
    let mut html = String::from("<div id=\"metrics\">");
    for card in cards {
        html.push_str(&format!(
            "<div class=\"metric\"><span class=\"title\">{}</span><span class=\"value\">{}</span>",
            escape_html(&card.title),
            escape_html(&card.value)
        ));
        if let Some(subtitle) = &card.subtitle {
            html.push_str(&format!("<span class=\"subtitle\">{}</span>", escape_html(subtitle)));
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
    html
}

fn render_search(label: &str, value: &str) -> String {
    format!(
        "<form id=\"search\"><label for=\"query\">{}</label><input id=\"query\" name=\"q\" value=\"{}\"><button type=\"submit\">Search</button></form>",
        escape_html(label),
        escape_html(value)
    )
}

/// JSON that is safe inside a `<script>` element
fn script_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

const STYLE: &str = r#"
body { display: flex; margin: 0; font-family: sans-serif; }
#sidebar { width: 260px; padding: 1rem; background: #f0f2f6; min-height: 100vh; }
main { flex: 1; padding: 1rem; }
#metrics { display: flex; gap: 2rem; margin: 1rem 0; }
.metric { display: flex; flex-direction: column; }
.metric .value { font-size: 1.8rem; }
.metric .subtitle { color: #666; }
#report p { white-space: pre-wrap; }
#images { display: flex; gap: 1rem; }
#images figure { margin: 0; }
#images img { max-width: 500px; }
.notice-warning { color: #8a6d00; }
.notice-error { color: #b00020; }
"#;

const SCRIPT: &str = r#"
const data = JSON.parse(document.getElementById('map-data').textContent);
const map = L.map('map').setView([data.center.latitude, data.center.longitude], data.zoom);
L.tileLayer(data.tile_url, { attribution: data.attribution }).addTo(map);
const redIcon = L.divIcon({ className: 'marker-red', html: '<span style="color:red">&#9679;</span>' });
for (const m of data.markers) {
  L.marker([m.location.latitude, m.location.longitude], { icon: redIcon })
    .bindPopup(m.popup_html).addTo(map);
}

let source = null;
const report = document.getElementById('report');
const notices = document.getElementById('notices');
const images = document.getElementById('images');
const download = document.getElementById('download');

function runReport(q) {
  if (source) source.close();
  report.innerHTML = ''; notices.innerHTML = ''; images.innerHTML = '';
  download.hidden = true;
  source = new EventSource('/api/report/stream?q=' + encodeURIComponent(q));
  source.addEventListener('report_started', e => {
    const d = JSON.parse(e.data);
    report.innerHTML = '<h3 id="' + d.anchor + '">' + d.title + '</h3>';
    for (let i = 0; i < d.line_count; i++) report.insertAdjacentHTML('beforeend', '<p></p>');
  });
  source.addEventListener('report_line', e => {
    const d = JSON.parse(e.data);
    report.querySelectorAll('p')[d.line].innerHTML = d.html;
  });
  source.addEventListener('report_complete', () => { download.hidden = false; });
  source.addEventListener('images', e => {
    const d = JSON.parse(e.data);
    for (const img of [d.before, d.after]) {
      const fig = document.createElement('figure');
      const el = document.createElement('img');
      el.src = img.src;
      const cap = document.createElement('figcaption');
      cap.textContent = img.caption;
      fig.append(el, cap);
      images.append(fig);
    }
  });
  source.addEventListener('notice', e => {
    const d = JSON.parse(e.data);
    const p = document.createElement('p');
    p.className = 'notice-' + d.level;
    p.textContent = d.message;
    notices.append(p);
  });
  source.addEventListener('end', () => { source.close(); source = null; });
}

document.getElementById('search').addEventListener('submit', e => {
  e.preventDefault();
  runReport(document.getElementById('query').value);
});

window.addEventListener('hashchange', () => {
  const m = location.hash.match(/^#claim-(\d+)$/);
  if (m) {
    document.getElementById('query').value = '#' + m[1];
    runReport('#' + m[1]);
  }
});

download.addEventListener('click', async () => {
  const res = await fetch('/api/report/export', { method: 'POST' });
  if (!res.ok) return;
  const blob = await res.blob();
  const name = (res.headers.get('content-disposition') || '').match(/filename="(.*)"/);
  const a = document.createElement('a');
  a.href = URL.createObjectURL(blob);
  a.download = name ? name[1] : 'insurance_report.pdf';
  a.click();
});

document.getElementById('history-filter').addEventListener('input', async e => {
  const res = await fetch('/api/history?q=' + encodeURIComponent(e.target.value));
  const d = await res.json();
  const esc = s => s.replace(/[&<>"']/g, c => ({'&':'&amp;','<':'&lt;','>':'&gt;','"':'&quot;',"'":'&#39;'}[c]));
  document.getElementById('history').innerHTML = d.sections
    .map(s => '<h3>' + esc(s.title) + '</h3><ul>' + s.items.map(i => '<li>' + esc(i) + '</li>').join('') + '</ul>')
    .join('');
});
"#;
