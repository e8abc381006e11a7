//! HTML pages: one inline stylesheet and a small polling script.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::game::shop::display_name;
use crate::game::{xp_threshold, Barbarian, Shop};

const STYLE: &str = "body{font-family:sans-serif;max-width:40em;margin:2em auto;background:#f4efe6;color:#2b2118}\
h1{font-variant:small-caps}.flash{background:#ffe9a8;padding:.5em;border:1px solid #c9a227}\
table{border-collapse:collapse}td,th{padding:.2em .8em;text-align:left}\
form.inline{display:inline}button{margin:.2em}";

/// Minimal escaping for text placed in element bodies and attribute values.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{}</title><style>{}</style></head>\n<body>\n{}\n</body></html>\n",
        html_escape(title),
        STYLE,
        body
    )
}

fn flash_block(flash: Option<&str>) -> String {
    match flash {
        Some(msg) => format!("<p class=\"flash\">{}</p>\n", html_escape(msg)),
        None => String::new(),
    }
}

pub fn login_page(site_name: &str, welcome: &str, flash: Option<&str>) -> String {
    let body = format!(
        "<h1>{}</h1>\n<p>{}</p>\n{}\
<form method=\"post\" action=\"/login\">\n\
<label>Username <input name=\"username\" required></label><br>\n\
<label>Password <input name=\"password\" type=\"password\" required></label><br>\n\
<button type=\"submit\">Log in</button>\n</form>\n\
<p>New here? <a href=\"/create_user\">Create an account</a></p>",
        html_escape(site_name),
        html_escape(welcome),
        flash_block(flash)
    );
    page(site_name, &body)
}

pub fn create_user_page(site_name: &str, flash: Option<&str>) -> String {
    let body = format!(
        "<h1>Create your barbarian</h1>\n{}\
<form method=\"post\" action=\"/create_user\">\n\
<label>Username <input name=\"username\" required></label><br>\n\
<label>Password <input name=\"password\" type=\"password\" minlength=\"8\" required></label><br>\n\
<button type=\"submit\">Create account</button>\n</form>\n\
<p><a href=\"/login\">Back to login</a></p>",
        flash_block(flash)
    );
    page(site_name, &body)
}

/// Items grouped by id with counts, in first-acquired order.
pub fn item_summary(items: &[String]) -> Vec<(String, usize)> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for item in items {
        let c = counts.entry(item.as_str()).or_insert(0);
        if *c == 0 {
            order.push(item.clone());
        }
        *c += 1;
    }
    order
        .into_iter()
        .map(|item| {
            let n = counts.get(item.as_str()).copied().unwrap_or(0);
            (item, n)
        })
        .collect()
}

pub fn home_page(
    site_name: &str,
    username: &str,
    barbarian: &Barbarian,
    shop: &Shop,
    poll_interval_secs: u64,
    flash: Option<&str>,
) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        "<h1>{}</h1>\n<p>Barbarian <strong>{}</strong> \
<form class=\"inline\" method=\"post\" action=\"/logout\"><button>Log out</button></form></p>\n{}",
        html_escape(site_name),
        html_escape(username),
        flash_block(flash)
    );
    let _ = write!(
        body,
        "<table>\n<tr><th>Level</th><td id=\"level\">{}</td></tr>\n\
<tr><th>Gold</th><td id=\"gold\">{}</td></tr>\n\
<tr><th>Experience</th><td><span id=\"xp\">{}</span> / <span id=\"xp_next\">{}</span></td></tr>\n</table>\n",
        barbarian.level,
        barbarian.gold,
        barbarian.experience,
        xp_threshold(barbarian.level)
    );
    let _ = write!(
        body,
        "<form class=\"inline\" method=\"post\" action=\"/adventure\"><button>Go on an adventure</button></form>\n\
<form class=\"inline\" method=\"post\" action=\"/toggle_auto_adventure\"><button>{}</button></form>\n",
        if barbarian.auto_adventure {
            "Stop auto-adventure"
        } else {
            "Start auto-adventure"
        }
    );

    body.push_str("<h2>Shop</h2>\n<table>\n");
    for (item, price) in shop.listing() {
        let _ = write!(
            body,
            "<tr><td>{}</td><td>{} gold</td><td><form method=\"post\" action=\"/buy/{}\"><button{}>Buy</button></form></td></tr>\n",
            html_escape(&display_name(item)),
            price,
            html_escape(item),
            if barbarian.gold < price { " disabled" } else { "" }
        );
    }
    body.push_str("</table>\n<h2>Inventory</h2>\n");
    if barbarian.items.is_empty() {
        body.push_str("<p>Nothing yet.</p>\n");
    } else {
        body.push_str("<ul>\n");
        for (item, count) in item_summary(&barbarian.items) {
            let _ = writeln!(body, "<li>{} &times; {}</li>", html_escape(&display_name(&item)), count);
        }
        body.push_str("</ul>\n");
    }

    if barbarian.auto_adventure {
        let _ = write!(
            body,
            "<script>\nsetInterval(function(){{\n\
fetch('/api/state').then(r=>r.json()).then(s=>{{\n\
document.getElementById('gold').textContent=s.gold;\n\
document.getElementById('xp').textContent=s.experience;\n\
document.getElementById('level').textContent=s.level;\n\
document.getElementById('xp_next').textContent=s.xp_threshold;\n\
}});\n\
}}, {});\n</script>\n",
            poll_interval_secs.saturating_mul(1000)
        );
    }
    page(site_name, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            html_escape("<b>\"Conan\" & 'Co'</b>"),
            "&lt;b&gt;&quot;Conan&quot; &amp; &#39;Co&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn summary_groups_in_first_seen_order() {
        let items: Vec<String> = ["torch", "xp_sword", "torch", "torch"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            item_summary(&items),
            vec![("torch".to_string(), 3), ("xp_sword".to_string(), 1)]
        );
    }

    #[test]
    fn home_page_shows_state_and_shop() {
        let mut b = Barbarian::new("id".into(), vec!["basic_sword".into()]);
        b.gold = 150;
        b.level = 3;
        let html = home_page("Test", "<conan>", &b, &Shop::default(), 5, Some("Bought a basic sword!"));
        assert!(html.contains("&lt;conan&gt;"));
        assert!(html.contains("<td id=\"gold\">150</td>"));
        assert!(html.contains("/ <span id=\"xp_next\">30</span>"));
        assert!(html.contains("action=\"/buy/golden_sword\""));
        assert!(html.contains("Bought a basic sword!"));
        // auto mode off: no polling script
        assert!(!html.contains("setInterval"));

        b.auto_adventure = true;
        let html = home_page("Test", "conan", &b, &Shop::default(), 5, None);
        assert!(html.contains("setInterval"));
        assert!(html.contains("5000"));
        assert!(html.contains("fetch('/api/state')"));
        assert!(html.contains("getElementById('level')"));
        assert!(html.contains("getElementById('xp_next')"));
    }
}
