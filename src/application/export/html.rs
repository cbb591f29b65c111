//! Standalone HTML emitter.
//!
//! The exported file keeps the checklist interactive offline: a small inline
//! script toggles steps and rewrites the completion marker, and the copy
//! button rebuilds a plain-text summary from a JSON copy of the document
//! embedded next to the markup.

use serde_json::json;
use time::OffsetDateTime;

use crate::application::export::{
    RenderError,
    blocks::{self, Block, COMPLETION_MARKER, DocumentPlan},
};
use crate::domain::sop::{CompletedSteps, Sop};

pub fn render(
    sop: &Sop,
    completed: &CompletedSteps,
    generated_at: OffsetDateTime,
) -> Result<String, RenderError> {
    let plan = blocks::build_document_plan(sop, completed, generated_at);
    let state = json!({
        "sop": sop,
        "completedSteps": completed,
    });
    // `</` would terminate the surrounding script element early.
    let payload = serde_json::to_string(&state)?.replace("</", "<\\/");
    Ok(render_plan(&plan, &payload))
}

fn render_plan(plan: &DocumentPlan, payload: &str) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
:root {{ --accent: {accent}; }}
body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
  color: #1f2937; background: #f9fafb; margin: 0; padding: 2rem 1rem; }}
main {{ max-width: 760px; margin: 0 auto; background: #fff; padding: 2.5rem;
  border-radius: 8px; box-shadow: 0 1px 3px rgba(0,0,0,.12); }}
header {{ border-left: 6px solid var(--accent); padding-left: 1rem; margin-bottom: 1.5rem; }}
header .kicker {{ text-transform: uppercase; letter-spacing: .08em; font-size: .75rem;
  color: #6b7280; margin: 0; }}
header h1 {{ margin: .25rem 0; font-size: 1.5rem; }}
header .banner-meta {{ color: #6b7280; margin: 0; font-size: .85rem; }}
.risk-badge {{ display: inline-block; background: var(--accent); color: #fff;
  padding: .15rem .6rem; border-radius: 4px; font-size: .8rem; font-weight: 600; }}
.controls {{ display: flex; align-items: center; gap: 1rem; margin: 1rem 0 2rem; }}
.controls button {{ background: var(--accent); color: #fff; border: 0; padding: .5rem 1rem;
  border-radius: 6px; font-size: .85rem; cursor: pointer; }}
.progress {{ flex: 1; height: 8px; background: #e5e7eb; border-radius: 4px; overflow: hidden; }}
#progress-fill {{ height: 100%; width: 0; background: var(--accent); transition: width .2s; }}
#progress-label {{ font-size: .85rem; color: #6b7280; white-space: nowrap; }}
h2 {{ font-size: 1.05rem; border-bottom: 2px solid #e5e7eb; padding-bottom: .3rem;
  margin-top: 2rem; }}
p.field {{ margin: .3rem 0; }}
ul {{ padding-left: 1.25rem; }}
.step {{ border: 1px solid #e5e7eb; border-radius: 6px; padding: .75rem 1rem;
  margin: .6rem 0; }}
.step.done {{ background: #f0fdf4; border-color: #16a34a; }}
.step label {{ display: flex; gap: .5rem; align-items: baseline; cursor: pointer; }}
.step-title {{ font-weight: 600; }}
.step-desc {{ margin: .4rem 0 .2rem 1.6rem; }}
.step-meta {{ margin: 0 0 0 1.6rem; font-size: .8rem; color: #6b7280; }}
footer {{ margin-top: 2.5rem; font-size: .8rem; color: #9ca3af; text-align: center; }}
@media print {{ .controls {{ display: none; }} body {{ background: #fff; padding: 0; }}
  main {{ box-shadow: none; }} }}
</style>
</head>
<body>
<main>
<header>
<p class="kicker">Standard Operating Procedure</p>
<h1>{title}</h1>
<p class="banner-meta"><span class="risk-badge">{risk}</span> Generated: {generated}</p>
</header>
<div class="controls">
<button id="copy-summary" type="button">Copy summary</button>
<div class="progress"><div id="progress-fill"></div></div>
<span id="progress-label"></span>
</div>
"#,
        title = html_escape(&plan.title),
        accent = plan.accent_color,
        risk = html_escape(&plan.risk_label),
        generated = html_escape(&plan.generated_on),
    ));

    for block in &plan.blocks {
        match block {
            Block::Heading(text) => {
                html.push_str(&format!("<h2>{}</h2>\n", html_escape(text)));
            }
            Block::Paragraph(text) => {
                html.push_str(&format!("<p>{}</p>\n", html_escape(text)));
            }
            Block::Field { label, value } => {
                html.push_str(&format!(
                    "<p class=\"field\"><strong>{}:</strong> {}</p>\n",
                    html_escape(label),
                    html_escape(value)
                ));
            }
            Block::Bullets(items) => {
                html.push_str("<ul>\n");
                for item in items {
                    html.push_str(&format!("<li>{}</li>\n", html_escape(item)));
                }
                html.push_str("</ul>\n");
            }
            Block::Step(card) => {
                let marked = format!("{}. {}", card.ordinal, card.title);
                let base = marked
                    .strip_suffix(COMPLETION_MARKER)
                    .unwrap_or(&marked)
                    .to_owned();
                html.push_str(&format!(
                    "<div class=\"step{done_class}\" data-step-id=\"{id}\">\n\
                     <label><input type=\"checkbox\" data-step=\"{id}\"{checked}> \
                     <span class=\"step-title\" data-base=\"{base}\">{title}</span></label>\n",
                    done_class = if card.done { " done" } else { "" },
                    id = html_escape(&card.id),
                    checked = if card.done { " checked" } else { "" },
                    base = html_escape(&base),
                    title = html_escape(&marked),
                ));
                if !card.description.is_empty() {
                    html.push_str(&format!(
                        "<p class=\"step-desc\">{}</p>\n",
                        html_escape(&card.description)
                    ));
                }
                html.push_str(&format!(
                    "<p class=\"step-meta\">Owner: {} | Duration: {} | Priority: {}</p>\n</div>\n",
                    html_escape(&card.owner),
                    html_escape(&card.duration),
                    html_escape(&card.priority)
                ));
            }
        }
    }

    html.push_str(&format!(
        r#"<footer>Generated {generated} | Risk classification {risk}</footer>
</main>
<script id="sop-data" type="application/json">{payload}</script>
<script>
(function () {{
  var data = JSON.parse(document.getElementById('sop-data').textContent);
  var done = new Set(data.completedSteps);
  var marker = ' [DONE]';
  function refresh() {{
    var total = 0, ticked = 0;
    document.querySelectorAll('.step').forEach(function (card) {{
      var id = card.getAttribute('data-step-id');
      total += 1;
      var isDone = done.has(id);
      if (isDone) ticked += 1;
      card.classList.toggle('done', isDone);
      var title = card.querySelector('.step-title');
      title.textContent = isDone ? title.getAttribute('data-base') + marker
                                 : title.getAttribute('data-base');
      card.querySelector('input').checked = isDone;
    }});
    var pct = total ? Math.round(ticked / total * 100) : 0;
    document.getElementById('progress-label').textContent = pct + '% complete';
    document.getElementById('progress-fill').style.width = pct + '%';
  }}
  document.querySelectorAll('.step input').forEach(function (box) {{
    box.addEventListener('change', function () {{
      var id = box.getAttribute('data-step');
      if (box.checked) done.add(id); else done.delete(id);
      refresh();
    }});
  }});
  document.getElementById('copy-summary').addEventListener('click', function () {{
    var sop = data.sop;
    var lines = ['SOP: ' + sop.title, 'Trigger: ' + sop.trigger, '', 'Immediate steps:'];
    sop.immediateSteps.forEach(function (step, index) {{
      lines.push((index + 1) + '. ' + step.title + (done.has(step.id) ? marker : ''));
    }});
    lines.push('', 'Preventive actions:');
    sop.preventiveActions.forEach(function (step, index) {{
      lines.push((index + 1) + '. ' + step.title + (done.has(step.id) ? marker : ''));
    }});
    navigator.clipboard.writeText(lines.join('\n'));
  }});
  refresh();
}})();
</script>
</body>
</html>
"#,
        generated = html_escape(&plan.generated_on),
        risk = html_escape(&plan.risk_label),
        payload = payload,
    ));

    html
}

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
