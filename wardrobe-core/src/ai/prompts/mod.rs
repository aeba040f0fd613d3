//! AI prompt templates.

pub mod outfit;
pub mod vision;

pub use outfit::{render_outfit_prompts, render_outfit_system_prompt, render_outfit_user_prompt};
pub use vision::{render_vision_prompts, render_vision_system_prompt, render_vision_user_prompt};
