//! Prompt templates for classifying a garment photo.

/// Prompt name for logs.
pub const VISION_PROMPT_NAME: &str = "garment_vision";

/// Fields the model must return.
pub const VISION_FIELDS: [&str; 5] = ["category", "color", "season", "style", "confidence"];

pub fn render_vision_system_prompt() -> String {
    "You are a professional fashion analyst. You identify a garment's type, main color, \
     suitable seasons and style from a photo."
        .to_string()
}

pub fn render_vision_user_prompt() -> String {
    "Analyze the garment in this image and return a JSON object with exactly these fields:\n\
     1. category: the garment category, one of top, bottom, dress, outerwear, shoes, \
     accessory, jewelry, other. Use other when nothing else fits.\n\
     2. color: the main color\n\
     3. season: the suitable seasons, one or more of spring, summer, autumn, winter, \
     joined with commas (e.g. \"spring,summer\")\n\
     4. style: the style (e.g. casual, formal, sporty, vintage)\n\
     5. confidence: your confidence in this classification as an integer from 0 to 100\n\
     \n\
     Return ONLY the JSON object, no other text."
        .to_string()
}

/// System prompt and user instructions, in that order.
pub fn render_vision_prompts() -> (String, String) {
    (render_vision_system_prompt(), render_vision_user_prompt())
}
