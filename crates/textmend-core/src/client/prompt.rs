//! Prompt construction
//!
//! Pure functions of `(text, options, default language)`. A custom
//! template takes precedence and has its literal `{text}` placeholder
//! substituted; otherwise a generated instruction embeds the target
//! language, optional tone, and optional context.

use super::types::CorrectionOptions;

/// Build the plain correction prompt
pub fn build_prompt(text: &str, options: &CorrectionOptions, default_language: &str) -> String {
    if let Some(template) = &options.custom_prompt {
        return template.replace("{text}", text);
    }

    let language = options.language.as_deref().unwrap_or(default_language);
    let mut prompt =
        format!("Correct the following text in {language} (spelling, grammar and style)");
    if let Some(style) = options.style {
        prompt.push_str(&format!(" using a {style} tone"));
    }
    if let Some(context) = &options.context {
        prompt.push_str(&format!("\n\nContext: {context}"));
    }
    prompt.push_str(&format!(
        "\n\nText to correct:\n\"{text}\"\n\nReply only with the corrected text, without explanation."
    ));
    prompt
}

/// Build the structured-response prompt
pub fn build_detailed_prompt(
    text: &str,
    options: &CorrectionOptions,
    default_language: &str,
) -> String {
    let language = options.language.as_deref().unwrap_or(default_language);
    format!(
        r#"Analyze and correct the following text in {language}. Reply in JSON with:
{{
  "correctedText": "corrected text",
  "changes": [
    {{
      "type": "spelling|grammar|style|punctuation",
      "original": "original text",
      "corrected": "corrected text",
      "explanation": "short explanation"
    }}
  ],
  "confidence": 0.95
}}

Text to correct:
"{text}""#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::types::Style;

    #[test]
    fn custom_template_substitutes_placeholder() {
        let options = CorrectionOptions::new().with_custom_prompt("Fix exactly this: {text}");
        let prompt = build_prompt("som text", &options, "en");
        assert_eq!(prompt, "Fix exactly this: som text");
    }

    #[test]
    fn generated_prompt_embeds_language_and_style() {
        let options = CorrectionOptions::new()
            .with_language("en")
            .with_style(Style::Formal)
            .with_context("fn main() {}");
        let prompt = build_prompt("som text", &options, "fr");
        assert!(prompt.contains("in en "));
        assert!(prompt.contains("formal tone"));
        assert!(prompt.contains("Context: fn main() {}"));
        assert!(prompt.contains("\"som text\""));
        assert!(prompt.ends_with("without explanation."));
    }

    #[test]
    fn generated_prompt_falls_back_to_default_language() {
        let prompt = build_prompt("texte", &CorrectionOptions::new(), "fr");
        assert!(prompt.contains("in fr "));
        assert!(!prompt.contains("tone"));
        assert!(!prompt.contains("Context:"));
    }

    #[test]
    fn detailed_prompt_describes_the_schema() {
        let prompt = build_detailed_prompt("texte", &CorrectionOptions::new(), "fr");
        assert!(prompt.contains("correctedText"));
        assert!(prompt.contains("spelling|grammar|style|punctuation"));
        assert!(prompt.contains("\"texte\""));
    }
}
