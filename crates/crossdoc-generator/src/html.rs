//! HTML fragments for template frames.
//!
//! Everything that links goes through the [`PageContext`] resolver functions,
//! so a page-specific type link override applies to the whole page.

use std::fmt::Write;

use crossdoc_core::{Entity, Param, Property};

use crate::{page::PageContext, template::TemplateContext};

/// Context for the layout frame wrapping `body`.
pub fn layout_context(page: &PageContext<'_>, body: &str) -> TemplateContext {
    let options = &page.options;
    TemplateContext::new()
        .with_var("title", escape_html(&options.name))
        .with_var("rel_path", options.rel_path)
        .with_var("type", options.page_type.as_str())
        .with_var("nav", nav_html(page))
        .with_var("body", body)
}

/// Context for the body frame `template_id`.
pub fn body_context(template_id: &str, page: &PageContext<'_>) -> TemplateContext {
    let options = &page.options;
    let ctx = TemplateContext::new()
        .with_var("name", escape_html(&options.name))
        .with_var("type", options.page_type.as_str())
        .with_var("rel_path", options.rel_path);

    match template_id {
        "extra" => ctx.with_non_empty(
            "content",
            options
                .content
                .as_deref()
                .map(|content| page.convert_links(content))
                .unwrap_or_default(),
        ),
        "pages" => ctx.with_var("items", entity_list(page, &page.model.pages, false)),
        "restapis" => ctx.with_var("items", entity_list(page, &page.model.restapis, true)),
        _ => subject_context(ctx, page),
    }
}

fn subject_context(ctx: TemplateContext, page: &PageContext<'_>) -> TemplateContext {
    let members = members_html(page, &page.options.properties, false);
    let ctx = ctx.with_var("members", members);

    let Some(entity) = page.options.subject else {
        return ctx;
    };

    ctx.with_non_empty("html_id", entity.html_id.clone())
        .with_non_empty("description", page.convert_links(&entity.description))
        .with_non_empty("extends", extends_html(page, &entity.extends))
        .with_non_empty("defined_in", defined_in_html(entity))
        .with_non_empty("see", see_html(page, &entity.see))
}

/// Sections for the aggregate pages, one per entity.
fn entity_list(page: &PageContext<'_>, entities: &[Entity], endpoints: bool) -> String {
    let mut html = String::new();
    for entity in entities {
        let properties: Vec<&Property> = entity.properties.iter().collect();
        let _ = write!(
            html,
            "<section class='entity' id='{}'>\n<h2>{}</h2>\n<div class='description'>{}</div>\n{}{}</section>\n",
            entity.html_id,
            escape_html(&entity.name),
            page.convert_links(&entity.description),
            see_html(page, &entity.see),
            members_html(page, &properties, endpoints),
        );
    }
    html
}

fn members_html(page: &PageContext<'_>, properties: &[&Property], endpoints: bool) -> String {
    if properties.is_empty() {
        return String::new();
    }

    let mut html = String::from("<div class='members'>\n");
    for property in properties {
        html.push_str(&member_html(page, property, endpoints));
    }
    html.push_str("</div>\n");
    html
}

fn member_html(page: &PageContext<'_>, property: &Property, endpoint: bool) -> String {
    let class = if property.is_private {
        "member private"
    } else {
        "member"
    };

    let mut html = format!("<div class='{class}' id='{}'>\n", property.html_id);

    if endpoint {
        let _ = writeln!(
            html,
            "<h3><span class='method'>{}</span> <code>{}</code></h3>",
            escape_html(&property.kind.to_uppercase()),
            escape_html(&property.name)
        );
    } else {
        let _ = writeln!(
            html,
            "<h3>{}<span class='member-name'>{}</span>{}{}</h3>",
            if property.is_static { "<span class='static'>static</span> " } else { "" },
            escape_html(&property.name),
            signature_html(property),
            kind_html(&property.kind),
        );
    }

    let types = type_links(page, &property.types);
    if !types.is_empty() {
        let _ = writeln!(html, "<div class='types'>{types}</div>");
    }

    if !property.description.is_empty() {
        let _ = writeln!(
            html,
            "<div class='description'>{}</div>",
            page.convert_links(&property.description)
        );
    }

    html.push_str(&params_html(page, &property.params));

    if let Some(returns) = &property.returns {
        let _ = writeln!(
            html,
            "<div class='returns'>Returns <span class='types'>{}</span> {}</div>",
            type_links(page, &returns.types),
            page.convert_links(&returns.description)
        );
    }

    html.push_str(&see_html(page, &property.see));
    html.push_str("</div>\n");
    html
}

fn signature_html(property: &Property) -> String {
    if property.params.is_empty() && !is_callable(&property.kind) {
        return String::new();
    }

    let params: Vec<String> = property
        .params
        .iter()
        .map(|p| {
            if p.optional {
                format!("[{}]", escape_html(&p.name))
            } else {
                escape_html(&p.name)
            }
        })
        .collect();
    format!("({})", params.join(", "))
}

fn is_callable(kind: &str) -> bool {
    matches!(kind, "method" | "function" | "constructor")
}

fn kind_html(kind: &str) -> String {
    if kind.is_empty() {
        String::new()
    } else {
        format!(" <span class='member-kind'>{}</span>", escape_html(kind))
    }
}

fn params_html(page: &PageContext<'_>, params: &[Param]) -> String {
    if params.is_empty() {
        return String::new();
    }

    let mut html = String::from("<ul class='params'>\n");
    for param in params {
        let _ = writeln!(
            html,
            "<li><code>{}</code> <span class='types'>{}</span> {}</li>",
            escape_html(&param.name),
            type_links(page, &param.types),
            page.convert_links(&param.description)
        );
    }
    html.push_str("</ul>\n");
    html
}

fn see_html(page: &PageContext<'_>, see: &[String]) -> String {
    if see.is_empty() {
        return String::new();
    }

    let items: Vec<String> = see.iter().map(|s| page.see_link(s)).collect();
    format!("<div class='see'>See: {}</div>\n", items.join(", "))
}

fn extends_html(page: &PageContext<'_>, extends: &[String]) -> String {
    if extends.is_empty() {
        return String::new();
    }

    let bases: Vec<String> = extends.iter().map(|e| page.type_link(e)).collect();
    format!("<div class='extends'>Extends {}</div>", bases.join(", "))
}

fn defined_in_html(entity: &Entity) -> String {
    entity
        .defined_in
        .as_deref()
        .map(|at| format!("<div class='defined-in'>Defined in {}</div>", escape_html(at)))
        .unwrap_or_default()
}

/// Alternative types of one value, joined with `|`.
fn type_links(page: &PageContext<'_>, types: &[String]) -> String {
    let links: Vec<String> = types.iter().map(|t| page.type_link(t)).collect();
    links.join(" | ")
}

/// Sidebar navigation of the whole site.
fn nav_html(page: &PageContext<'_>) -> String {
    let model = page.model;
    let rel = page.rel_path();
    let mut html = format!("<a class='home' href='{rel}index.html'>Home</a>\n");

    if !model.pages.is_empty() {
        let _ = writeln!(html, "<a href='{rel}pages.html'>Pages</a>");
    }
    if !model.restapis.is_empty() {
        let _ = writeln!(html, "<a href='{rel}restapis.html'>REST APIs</a>");
    }

    for (title, entities) in [
        ("Guides", &model.guides),
        ("Classes", &model.classes),
        ("Modules", &model.modules),
        ("Features", &model.features),
        ("Files", &model.files),
    ] {
        if entities.is_empty() {
            continue;
        }
        let _ = writeln!(html, "<h3>{title}</h3>\n<ul>");
        for entity in entities {
            let _ = writeln!(
                html,
                "<li><a href='{rel}{}.html'>{}</a></li>",
                entity.filename,
                escape_html(&entity.name)
            );
        }
        html.push_str("</ul>\n");
    }

    html
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
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
