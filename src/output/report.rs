use itertools::Itertools;

use crate::dashboard::DashboardSnapshot;
use crate::filters::FilterField;
use crate::table::format::COLUMNS;
use crate::table::{Tag, TableRow};

fn json_for_script_tag(value: &str) -> String {
    value.replace("</", "<\\/")
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn tag_html(tag: &Tag) -> String {
    let hex = tag.color.hex();
    format!(
        r#"<span class="px-3 py-1 rounded-lg text-xs font-bold border" style="color:{hex};border-color:{hex}">{}</span>"#,
        escape_html(&tag.label)
    )
}

fn row_html(row: &TableRow) -> String {
    let cell = |value: &str| {
        format!(
            r#"<td class="px-6 py-5 text-sm font-medium text-slate-600 dark:text-slate-400">{}</td>"#,
            escape_html(value)
        )
    };
    let skills = row.skills.iter().map(tag_html).join(" ");
    format!(
        r#"<tr class="hover:bg-slate-50 dark:hover:bg-slate-800/30 transition-colors" data-key="{key}">
              <td class="px-6 py-5 text-sm font-semibold text-slate-900 dark:text-white">{name}</td>
              {email}{department}{designation}{joined}{salary}
              <td class="px-6 py-5">{status}</td>
              <td class="px-6 py-5"><div class="flex flex-wrap gap-2">{skills}</div></td>
            </tr>"#,
        key = escape_html(&row.key),
        name = escape_html(&row.name),
        email = cell(&row.email),
        department = cell(&row.department),
        designation = cell(&row.designation),
        joined = cell(&row.joining_date),
        salary = cell(&row.salary),
        status = tag_html(&row.status),
    )
}

fn filter_chips(snapshot: &DashboardSnapshot) -> String {
    FilterField::ALL
        .iter()
        .filter_map(|field| {
            let values = snapshot.applied.values(*field);
            if values.is_empty() {
                return None;
            }
            Some(format!(
                r#"<span class="bg-slate-100 dark:bg-slate-800 text-slate-700 dark:text-slate-300 px-3 py-1 rounded-lg text-xs font-bold border border-slate-200 dark:border-slate-700">{}: {}</span>"#,
                escape_html(field.label()),
                escape_html(&values.join(", "))
            ))
        })
        .join("\n          ")
}

pub fn render_html(snapshot: &DashboardSnapshot) -> Vec<u8> {
    let json = serde_json::to_string(snapshot).unwrap_or_else(|_| "{}".to_string());
    let json = json_for_script_tag(&json);

    let title = escape_html(&snapshot.title);
    let headers = COLUMNS
        .iter()
        .map(|c| {
            format!(
                r#"<th class="px-6 py-5 text-[11px] font-display text-slate-900 dark:text-slate-200 uppercase tracking-widest">{c}</th>"#
            )
        })
        .join("\n                ");
    let body = if snapshot.rows.is_empty() {
        format!(
            r#"<tr><td colspan="{}" class="px-6 py-10 text-center text-sm font-bold text-slate-400">No data</td></tr>"#,
            COLUMNS.len()
        )
    } else {
        snapshot.rows.iter().map(row_html).join("\n            ")
    };
    let chips = filter_chips(snapshot);
    let location = escape_html(&snapshot.location);

    let html = format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>{title}</title>
  <script src="https://cdn.tailwindcss.com?plugins=forms,container-queries"></script>
  <link href="https://fonts.googleapis.com/css2?family=Montserrat:wght@700;800&amp;family=Inter:wght@400;500;600;700&amp;display=swap" rel="stylesheet"/>
  <script id="tailwind-config">
    tailwind.config = {{
      darkMode: "class",
      theme: {{
        extend: {{
          colors: {{
            "primary": "#1677ff",
            "background-light": "#f8fafc",
            "background-dark": "#0f172a"
          }},
          fontFamily: {{
            "sans": ["Inter", "sans-serif"],
            "display": ["Montserrat", "sans-serif"]
          }}
        }}
      }}
    }};
  </script>
</head>
<body class="bg-background-light dark:bg-background-dark text-slate-900 dark:text-slate-100 min-h-screen">
  <script type="application/json" id="dashboard-data">{json}</script>
  <div class="flex h-full grow flex-col">
    <header class="flex items-center justify-between border-b border-slate-200 dark:border-slate-800 bg-white dark:bg-slate-900 px-8 py-4">
      <h2 class="text-slate-900 dark:text-white text-xl font-display uppercase tracking-tight">{title}</h2>
      <code class="text-xs text-slate-500">{location}</code>
    </header>

    <main class="flex-1 max-w-[1440px] mx-auto w-full px-8 py-10">
      <div class="flex flex-col md:flex-row justify-between items-start md:items-end mb-6 gap-4">
        <h1 class="text-slate-900 dark:text-white text-4xl">Employees</h1>
        <p class="text-slate-500 dark:text-slate-400 text-base font-bold">{total} selected</p>
      </div>

      <div class="flex flex-wrap gap-2 mb-6">
          {chips}
      </div>

      <div class="bg-white dark:bg-slate-900 border border-slate-200 dark:border-slate-800 rounded-2xl overflow-hidden shadow-sm">
        <div class="overflow-x-auto">
          <table class="w-full text-left border-collapse">
            <thead>
              <tr class="bg-slate-50 dark:bg-slate-800/50 border-b border-slate-200 dark:border-slate-800">
                {headers}
              </tr>
            </thead>
            <tbody class="divide-y divide-slate-100 dark:divide-slate-800">
            {body}
            </tbody>
          </table>
        </div>
        <div class="px-8 py-5 border-t border-slate-100 dark:border-slate-800 bg-slate-50 dark:bg-slate-800/50">
          <p class="text-sm text-slate-500 dark:text-slate-400 font-bold">Page {page} of {page_count} &middot; {page_size} per page</p>
        </div>
      </div>
    </main>
  </div>
</body>
</html>
"####,
        total = snapshot.total_employees,
        page = snapshot.page,
        page_count = snapshot.page_count,
        page_size = snapshot.page_size,
    );

    html.into_bytes()
}
