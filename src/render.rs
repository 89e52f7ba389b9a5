use crate::config::{AppConfig, RenderConfig};
use crate::scale::{QuantizeScale, LEGEND_LABELS, PALETTE};
use crate::tooltip::{Tooltip, TooltipState};
use crate::types::County;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;

// Legend swatch geometry, matching the legend labels
const SWATCH_WIDTH: f64 = 30.0;
const SWATCH_HEIGHT: f64 = 15.0;

pub fn write_site(config: &AppConfig, counties: &[County], scale: &QuantizeScale) -> Result<()> {
    println!("Rendering {} counties...", counties.len());

    let svg = render_svg(&config.render, counties, scale);
    let page = render_page(&svg, &Tooltip::new());

    fs::create_dir_all(&config.output.site_dir).with_context(|| {
        format!(
            "Failed to create site directory: {:?}",
            config.output.site_dir
        )
    })?;

    let svg_path = config.output.site_dir.join("map.svg");
    fs::write(&svg_path, &svg).with_context(|| format!("Failed to write {:?}", svg_path))?;

    let page_path = config.output.site_dir.join("index.html");
    fs::write(&page_path, &page).with_context(|| format!("Failed to write {:?}", page_path))?;

    println!("Site written to {:?}", config.output.site_dir);
    Ok(())
}

/// Build the SVG document: the legend on top, then one path per county in
/// joined order.
pub fn render_svg(render: &RenderConfig, counties: &[County], scale: &QuantizeScale) -> String {
    let inner_width = render.width - 2.0 * render.margin;
    let mut svg = String::new();

    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}">"#,
        render.width, render.height
    );
    let _ = writeln!(
        svg,
        r#"<g transform="translate({}, {})">"#,
        render.margin, render.margin
    );

    render_legend(&mut svg, inner_width);

    for county in counties {
        render_county(&mut svg, render, county, scale);
    }

    svg.push_str("</g>\n</svg>\n");
    svg
}

fn render_legend(svg: &mut String, inner_width: f64) {
    let offset = inner_width - LEGEND_LABELS.len() as f64 * SWATCH_WIDTH;
    let _ = writeln!(svg, r#"<g id="legend" transform="translate({}, 0)">"#, offset);

    for (i, (label, color)) in LEGEND_LABELS.iter().zip(PALETTE.iter()).enumerate() {
        let x = i as f64 * SWATCH_WIDTH;
        let _ = writeln!(
            svg,
            r#"<rect x="{}" y="0" width="{}" height="{}" fill="{}"/>"#,
            x, SWATCH_WIDTH, SWATCH_HEIGHT, color
        );
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" style="font-size: 0.6rem">{}%</text>"#,
            x,
            SWATCH_HEIGHT * 2.0,
            label
        );
    }

    svg.push_str("</g>\n");
}

fn render_county(svg: &mut String, render: &RenderConfig, county: &County, scale: &QuantizeScale) {
    let education = county.education.as_ref();
    let d = path_data(county, render.scale_x, render.scale_y);
    let fill = scale.color(education.map(|e| e.bachelors_or_higher));

    let _ = write!(
        svg,
        r#"<path class="county" d="{}" fill="{}" data-fips="{}""#,
        d, fill, county.fips
    );
    if let Some(record) = education {
        let _ = write!(
            svg,
            r#" data-state="{}" data-area="{}" data-education="{}""#,
            xml_escape(&record.state),
            xml_escape(&record.area_name),
            record.bachelors_or_higher
        );
    }
    svg.push_str("/>\n");
}

/// Path data for all rings of a county. The counties document ships
/// pre-projected, so the screen mapping is a plain per-axis scale.
fn path_data(county: &County, scale_x: f64, scale_y: f64) -> String {
    let mut d = String::new();
    for polygon in &county.geometry {
        append_ring(&mut d, polygon.exterior(), scale_x, scale_y);
        for interior in polygon.interiors() {
            append_ring(&mut d, interior, scale_x, scale_y);
        }
    }
    d
}

fn append_ring(d: &mut String, ring: &geo::LineString<f64>, scale_x: f64, scale_y: f64) {
    for (i, coord) in ring.coords().enumerate() {
        let command = if i == 0 { 'M' } else { 'L' };
        let _ = write!(
            d,
            "{}{:.2},{:.2}",
            command,
            coord.x * scale_x,
            coord.y * scale_y
        );
    }
    d.push('Z');
}

fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Overlay markup for the page, rendered from the controller's state. The
/// generated page starts from the hidden state; the visible branch is what
/// the page script reproduces on hover.
fn tooltip_markup(tooltip: &Tooltip) -> String {
    match tooltip.state() {
        TooltipState::Hidden => concat!(
            "<div id=\"tooltip\" style=\"opacity: 0\">\n",
            "  <p class=\"area\"></p>\n",
            "  <p class=\"education\"></p>\n",
            "</div>\n"
        )
        .to_string(),
        TooltipState::Visible(overlay) => {
            let mut markup = String::new();
            let _ = write!(
                markup,
                r#"<div id="tooltip" style="opacity: {}; left: {}px; top: {}px" data-fips="{}""#,
                overlay.opacity, overlay.left, overlay.top, overlay.fips
            );
            if let Some(education) = overlay.education {
                let _ = write!(markup, r#" data-education="{}""#, education);
            }
            let _ = write!(
                markup,
                ">\n  <p class=\"area\">{}</p>\n  <p class=\"education\">{}</p>\n</div>\n",
                xml_escape(&overlay.area),
                xml_escape(&overlay.education_text)
            );
            markup
        }
    }
}

const PAGE_STYLE: &str = r#"body { font-family: sans-serif; }
.container { position: relative; max-width: 800px; margin: 0 auto; }
#tooltip { position: absolute; pointer-events: none; background: #fffdf7; border: 1px solid #333; padding: 0.25rem 0.5rem; transition: opacity 0.2s; }
#tooltip p { margin: 0; font-size: 0.8rem; }
path.county:hover { stroke: #333; }"#;

const PAGE_SCRIPT: &str = r#"const tooltip = document.getElementById('tooltip');
const area = tooltip.querySelector('p.area');
const education = tooltip.querySelector('p.education');
for (const county of document.querySelectorAll('path.county')) {
  county.addEventListener('mouseenter', (event) => {
    tooltip.style.opacity = 1;
    tooltip.style.left = (event.layerX + 5) + 'px';
    tooltip.style.top = (event.layerY + 5) + 'px';
    tooltip.setAttribute('data-fips', county.dataset.fips);
    if (county.dataset.education === undefined) {
      tooltip.removeAttribute('data-education');
      area.textContent = 'County ' + county.dataset.fips;
      education.textContent = 'no data';
    } else {
      tooltip.setAttribute('data-education', county.dataset.education);
      area.textContent = county.dataset.area + ', ' + county.dataset.state;
      education.textContent = county.dataset.education + '%';
    }
  });
  county.addEventListener('mouseout', () => {
    tooltip.style.opacity = 0;
  });
}"#;

fn render_page(svg: &str, tooltip: &Tooltip) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>US Educational Attainment</title>\n\
         <style>\n{style}\n</style>\n\
         </head>\n\
         <body>\n\
         <div class=\"container\">\n\
         <h1 id=\"title\">US Educational Attainment</h1>\n\
         <h3 id=\"description\">Bachelor's degree or higher 2010-2014</h3>\n\
         {tooltip}{svg}</div>\n\
         <script>\n{script}\n</script>\n\
         </body>\n\
         </html>\n",
        style = PAGE_STYLE,
        tooltip = tooltip_markup(tooltip),
        svg = svg,
        script = PAGE_SCRIPT,
    )
}
