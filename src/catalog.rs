//! Built-in visual styles.

use serde::Serialize;

/// A visual style: a display name plus the suffix appended to the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StyleDescriptor {
    /// Stable identifier.
    pub id: &'static str,
    /// Name shown to users and stored on history records.
    pub display_name: &'static str,
    /// Preview thumbnail URL.
    pub preview_image_ref: &'static str,
    /// Text appended verbatim to the prompt.
    pub prompt_suffix: &'static str,
}

/// All styles, in display order. The first entry is the default.
pub static STYLES: [StyleDescriptor; 8] = [
    StyleDescriptor {
        id: "none",
        display_name: "Tanpa Gaya",
        preview_image_ref: "https://picsum.photos/seed/style0/200",
        prompt_suffix: "",
    },
    StyleDescriptor {
        id: "anime",
        display_name: "Anime",
        preview_image_ref: "https://picsum.photos/seed/anime/200",
        prompt_suffix: ", style of modern high quality anime, vibrant colors, detailed eyes, Makoto Shinkai style",
    },
    StyleDescriptor {
        id: "realistic",
        display_name: "Realistik",
        preview_image_ref: "https://picsum.photos/seed/realistic/200",
        prompt_suffix: ", hyper-realistic, 8k resolution, highly detailed, cinematic lighting, photography, professional shot",
    },
    StyleDescriptor {
        id: "cyberpunk",
        display_name: "Cyberpunk",
        preview_image_ref: "https://picsum.photos/seed/cyber/200",
        prompt_suffix: ", cyberpunk aesthetic, neon lights, futuristic city, night, glowing elements, dark atmosphere",
    },
    StyleDescriptor {
        id: "oil-painting",
        display_name: "Lukisan Cat Minyak",
        preview_image_ref: "https://picsum.photos/seed/oil/200",
        prompt_suffix: ", oil painting style, visible brush strokes, rich textures, classic masterpiece aesthetic",
    },
    StyleDescriptor {
        id: "pixel-art",
        display_name: "Pixel Art",
        preview_image_ref: "https://picsum.photos/seed/pixel/200",
        prompt_suffix: ", 16-bit pixel art, retro gaming aesthetic, clean pixel lines",
    },
    StyleDescriptor {
        id: "3d-render",
        display_name: "3D Render",
        preview_image_ref: "https://picsum.photos/seed/3d/200",
        prompt_suffix: ", 3D isometric render, Unreal Engine 5, Octane render, soft lighting, cute stylized character",
    },
    StyleDescriptor {
        id: "sketch",
        display_name: "Sketsa",
        preview_image_ref: "https://picsum.photos/seed/sketch/200",
        prompt_suffix: ", charcoal pencil sketch, hand drawn, artistic, white background, detailed line art",
    },
];

/// Sample prompt offered to users who want to try the tool.
pub const EXAMPLE_PROMPT: &str =
    "Seekor astronot kucing mengambang di luar angkasa, gaya seni digital";

/// The style with no suffix.
pub fn default_style() -> &'static StyleDescriptor {
    &STYLES[0]
}

/// Looks up a style by id, ignoring ASCII case.
pub fn find_style(id: &str) -> Option<&'static StyleDescriptor> {
    let id = id.trim();
    STYLES.iter().find(|s| s.id.eq_ignore_ascii_case(id))
}
