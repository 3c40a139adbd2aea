//! Prompt templating for the two Gemini calls.
//!
//! The three selectors map to fixed phrase fragments; anything we don't
//! recognize falls back to the documented defaults (Neutral / Medium /
//! Story) rather than failing the request.

use std::fmt::Display;

/// Tone selector for the styled generation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Tone {
    /// Clear and neutral, the default.
    #[default]
    Neutral,
    /// Academic and structured.
    Academic,
    /// Light and playful.
    Playful,
    /// Poetic and reflective.
    Poetic,
}

impl Tone {
    /// Parses a form value, falling back to [Tone::Neutral] for unknown input.
    pub fn from_form(value: &str) -> Self {
        match value.trim() {
            "Academic" => Tone::Academic,
            "Playful" => Tone::Playful,
            "Poetic" => Tone::Poetic,
            _ => Tone::Neutral,
        }
    }

    /// The style sentence layered into the generation prompt.
    pub fn guide(self) -> &'static str {
        match self {
            Tone::Neutral => "Write in a clear, neutral tone.",
            Tone::Academic => "Write in an academic, structured tone.",
            Tone::Playful => "Write in a light, playful tone.",
            Tone::Poetic => "Write in a poetic and reflective tone.",
        }
    }
}

impl Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Tone::Neutral => "Neutral",
            Tone::Academic => "Academic",
            Tone::Playful => "Playful",
            Tone::Poetic => "Poetic",
        };
        write!(f, "{label}")
    }
}

/// Length selector for the styled generation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Length {
    /// About 150-250 words.
    Short,
    /// About 300-500 words, the default.
    #[default]
    Medium,
    /// About 600-900 words.
    Long,
}

impl Length {
    /// Parses a form value, falling back to [Length::Medium] for unknown input.
    pub fn from_form(value: &str) -> Self {
        match value.trim() {
            "Short" => Length::Short,
            "Long" => Length::Long,
            _ => Length::Medium,
        }
    }

    /// The length sentence layered into the generation prompt.
    pub fn guide(self) -> &'static str {
        match self {
            Length::Short => "Keep it concise (about 150-250 words).",
            Length::Medium => "Moderate length (about 300-500 words).",
            Length::Long => "More detailed (about 600-900 words).",
        }
    }
}

impl Display for Length {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Length::Short => "Short",
            Length::Medium => "Medium",
            Length::Long => "Long",
        };
        write!(f, "{label}")
    }
}

/// Content-type selector for the styled generation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ContentType {
    /// A narrative story, the default.
    #[default]
    Story,
    /// A blog-style piece.
    Blog,
}

impl ContentType {
    /// Parses a form value, falling back to [ContentType::Story] for unknown input.
    pub fn from_form(value: &str) -> Self {
        match value.trim() {
            "Blog" => ContentType::Blog,
            _ => ContentType::Story,
        }
    }

    /// The framing sentence layered into the generation prompt.
    pub fn guide(self) -> &'static str {
        match self {
            ContentType::Story => "Write a narrative story with a beginning, middle, and end.",
            ContentType::Blog => {
                "Write a blog-style piece with a hook, clear structure, and a takeaway."
            }
        }
    }
}

impl Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ContentType::Story => "Story",
            ContentType::Blog => "Blog",
        };
        write!(f, "{label}")
    }
}

/// The fixed description-extraction instruction; selectors don't apply here.
pub fn description_prompt() -> &'static str {
    "Describe this image in detail. Mention key objects, setting, actions, \
     colors, emotions, and any visible text. Be precise but readable."
}

/// Builds the styled-generation instruction: content-type framing, tone and
/// length sentences in fixed order, then the verbatim user prompt.
pub fn compose_prompt(
    tone: Tone,
    length: Length,
    content_type: ContentType,
    user_prompt: &str,
) -> String {
    format!(
        "You are given an image and a user prompt.\n\
         Task:\n\
         1) Use the image as inspiration.\n\
         2) Follow the user prompt closely.\n\
         3) {form}\n\
         4) {style}\n\
         5) {size}\n\
         Output only the final text.\n\
         \n\
         User prompt:\n\
         {user_prompt}",
        form = content_type.guide(),
        style = tone.guide(),
        size = length.guide(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_selectors_fall_back_to_defaults() {
        assert_eq!(Tone::from_form("Sarcastic"), Tone::Neutral);
        assert_eq!(Tone::from_form(""), Tone::Neutral);
        assert_eq!(Length::from_form("Gigantic"), Length::Medium);
        assert_eq!(ContentType::from_form("Haiku"), ContentType::Story);
    }

    #[test]
    fn known_selectors_parse() {
        assert_eq!(Tone::from_form("Poetic"), Tone::Poetic);
        assert_eq!(Tone::from_form(" Playful "), Tone::Playful);
        assert_eq!(Length::from_form("Short"), Length::Short);
        assert_eq!(ContentType::from_form("Blog"), ContentType::Blog);
    }

    #[test]
    fn compose_prompt_layers_fragments_in_order() {
        let prompt = compose_prompt(
            Tone::Playful,
            Length::Short,
            ContentType::Blog,
            "Write about a sunset",
        );

        let form_at = prompt.find(ContentType::Blog.guide()).expect("framing");
        let style_at = prompt.find(Tone::Playful.guide()).expect("tone");
        let size_at = prompt.find(Length::Short.guide()).expect("length");
        assert!(form_at < style_at);
        assert!(style_at < size_at);
        assert!(prompt.ends_with("User prompt:\nWrite about a sunset"));
    }

    #[test]
    fn description_prompt_is_selector_independent() {
        assert!(description_prompt().starts_with("Describe this image in detail."));
    }
}
