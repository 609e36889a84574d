// src/infograph/prompt.rs
//
// Layout JSON to prompt compilation. The structured form enumerates
// regions with coordinates; the nanobanana form is a single
// natural-language paragraph (subject, action, environment, style,
// lighting and details folded into one description).

use serde::Deserialize;

fn default_canvas() -> Canvas {
    Canvas {
        width: 1600,
        height: 1000,
    }
}

fn default_region_w() -> u32 {
    400
}

fn default_region_h() -> u32 {
    200
}

#[derive(Debug, Clone, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Region {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub x: u32,
    #[serde(default)]
    pub y: u32,
    #[serde(default = "default_region_w")]
    pub w: u32,
    #[serde(default = "default_region_h")]
    pub h: u32,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub bullets: Vec<String>,
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_canvas")]
    pub canvas: Canvas,
    #[serde(default)]
    pub palette: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub regions: Vec<Region>,
}

impl Region {
    fn id_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.id.is_empty() { fallback } else { &self.id }
    }

    fn kind_or_panel(&self) -> &str {
        if self.kind.is_empty() { "panel" } else { &self.kind }
    }
}

pub fn structured_prompt(layout: &Layout) -> String {
    let title = if layout.title.is_empty() {
        "Untitled Infographic"
    } else {
        &layout.title
    };
    let palette = if layout.palette.is_empty() {
        "light"
    } else {
        &layout.palette
    };

    let mut lines = vec![
        format!(
            "Educational infographic titled '{title}' (canvas {}x{}, palette={palette}).",
            layout.canvas.width, layout.canvas.height
        ),
        "Follow the structured layout and visualize the following regions clearly:".to_string(),
    ];

    for region in &layout.regions {
        let at = format!("@({},{},{},{})", region.x, region.y, region.w, region.h);
        let line = match region.kind_or_panel() {
            "code" => format!(
                "- Region {} [code] {at} label:{} code:\n{}",
                region.id_or("r"),
                region.label,
                region.code
            ),
            "diagram" => format!(
                "- Region {} [diagram] {at} label:{} (use arrows, boxes, and labels to show relationships)",
                region.id_or("r"),
                region.label
            ),
            kind => {
                let content = if !region.text.trim().is_empty() {
                    region.text.clone()
                } else {
                    region.bullets.join("; ")
                };
                format!(
                    "- Region {} [{kind}] {at} label:{} content:{content}",
                    region.id_or("r"),
                    region.label
                )
            }
        };
        lines.push(line);
    }

    lines.push("Render this infographic with clarity, hierarchy, and balanced whitespace.".to_string());
    lines.join("\n")
}

pub fn nanobanana_prompt(layout: &Layout) -> String {
    let title = if layout.title.is_empty() {
        "Technical Infographic"
    } else {
        &layout.title
    };

    let key_panels: Vec<&str> = layout
        .regions
        .iter()
        .filter_map(|r| {
            if !r.label.is_empty() {
                Some(r.label.as_str())
            } else if !r.text.is_empty() {
                Some(r.text.as_str())
            } else {
                None
            }
        })
        .take(5)
        .collect();

    let action = if key_panels.is_empty() {
        "explaining its main components".to_string()
    } else {
        format!("illustrating key concepts such as {}", key_panels.join(", "))
    };

    let mut prompt = format!(
        "A modern minimalist infographic style with soft colors, crisp icons, and readable \
         typography depiction of an educational infographic titled '{title}', {action}, set in \
         a clean, flat vector layout with balanced spacing and neutral background, illuminated \
         by even diffuse lighting with subtle shadows for clarity. The design emphasizes \
         consistent iconography, clear hierarchy, and smooth flow between panels. no extra \
         text beyond labels; no watermarks or signatures; avoid clutter; icons appear natural \
         and proportional."
    );
    if !layout.notes.trim().is_empty() {
        prompt.push_str(&format!(" Context: {}", layout.notes.trim()));
    }
    prompt
}
