//! Instruction text sent to the image model.
//!
//! The greeting itself is never translated locally: the model is told which
//! language to write "Wishing you a happy new year" in, plus a script hint
//! for the Chinese variants whose written form is ambiguous.

/// The phrase every template carries, in the chosen language.
pub const GREETING: &str = "Wishing you a happy new year";

/// Script and register hint for a language, keyed by exact display name.
pub fn linguistic_context(language: &str) -> Option<&'static str> {
    match language {
        "Canton Chinese" => Some(
            "Use Traditional Chinese characters (繁體中文). Use authentic Cantonese phrasing \
             for New Year greetings like '新年快樂' or '恭喜發財'.",
        ),
        "Taiwanese Mandarin" => Some(
            "Use Traditional Chinese characters (繁體中文) as used in Taiwan. Use standard \
             Mandarin phrasing like '新年快樂'.",
        ),
        "Mandarin Chinese" => Some(
            "Use Simplified Chinese characters (简体中文) unless the location suggests otherwise.",
        ),
        _ => None,
    }
}

/// Builds the instruction for a fresh template.
///
/// `cultural_elements` is passed through verbatim; blank input adds nothing.
pub fn generation_prompt(language: &str, location: &str, cultural_elements: Option<&str>) -> String {
    let mut lines = vec![
        "Create a high-quality, professional Instagram post template (square 1:1).".to_string(),
        format!("Primary Content: The text \"{GREETING}\" written in {language}."),
    ];
    if let Some(hint) = linguistic_context(language) {
        lines.push(hint.to_string());
    }
    lines.push(format!(
        "Secondary Content: Visual symbols and traditional aesthetics that represent the culture \
         of the {language} language and the specific location: {location}."
    ));
    if let Some(context) = cultural_elements.filter(|c| !c.trim().is_empty()) {
        lines.push(format!("Context: {context}."));
    }
    lines.push(
        "Style: Celebratory, elegant, and vibrant. The composition must be optimized for Instagram."
            .to_string(),
    );
    lines.push(
        "Ensure the text is legible, correctly written in the proper script, and beautifully \
         integrated with the cultural symbols."
            .to_string(),
    );
    lines.push("Avoid any blurry elements or low-quality artifacts.".to_string());
    lines.join("\n")
}

/// Builds the instruction for refining the current template.
pub fn edit_prompt(instruction: &str) -> String {
    [
        format!("Modify this Instagram post template based on this instruction: \"{instruction}\"."),
        "Ensure the final result remains a high-quality 1:1 aspect ratio square image.".to_string(),
        format!(
            "Preserve the \"{GREETING}\" message and the cultural heritage elements unless the \
             user specifically asks to change them."
        ),
        "Maintain linguistic accuracy for the chosen script and dialect.".to_string(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canton_chinese_gets_traditional_cantonese_hint() {
        let prompt = generation_prompt("Canton Chinese", "Hong Kong", None);
        assert!(prompt.contains("Traditional Chinese characters (繁體中文)"));
        assert!(prompt.contains("新年快樂"));
        assert!(prompt.contains("恭喜發財"));
        assert!(prompt.contains("Cantonese"));
    }

    #[test]
    fn test_taiwanese_mandarin_gets_traditional_hint() {
        let prompt = generation_prompt("Taiwanese Mandarin", "Taipei", None);
        assert!(prompt.contains("Traditional Chinese characters (繁體中文) as used in Taiwan"));
        assert!(!prompt.contains("简体中文"));
    }

    #[test]
    fn test_mandarin_chinese_gets_simplified_hint() {
        let prompt = generation_prompt("Mandarin Chinese", "Shanghai", None);
        assert!(prompt.contains("Simplified Chinese characters (简体中文)"));
        assert!(!prompt.contains("繁體中文"));
    }

    #[test]
    fn test_other_languages_get_no_script_hint() {
        let prompt = generation_prompt("French", "Paris", None);
        assert!(!prompt.contains("Chinese characters"));
        assert!(linguistic_context("French").is_none());
        // Lookup is case-sensitive.
        assert!(linguistic_context("canton chinese").is_none());
    }

    #[test]
    fn test_generation_prompt_carries_hints_and_constraints() {
        let prompt = generation_prompt("French", "Paris", Some("Eiffel tower fireworks"));
        assert!(prompt.contains("\"Wishing you a happy new year\" written in French"));
        assert!(prompt.contains("the specific location: Paris"));
        assert!(prompt.contains("Context: Eiffel tower fireworks."));
        assert!(prompt.contains("square 1:1"));
        assert!(prompt.contains("Avoid any blurry elements"));
    }

    #[test]
    fn test_blank_cultural_elements_add_no_context() {
        let prompt = generation_prompt("English", "London", Some("   "));
        assert!(!prompt.contains("Context:"));
    }

    #[test]
    fn test_edit_prompt_quotes_instruction_and_preserves() {
        let prompt = edit_prompt("Add more gold accents");
        assert!(prompt.contains("instruction: \"Add more gold accents\""));
        assert!(prompt.contains("1:1 aspect ratio"));
        assert!(prompt.contains("Preserve the \"Wishing you a happy new year\" message"));
        assert!(prompt.contains("linguistic accuracy"));
    }
}
