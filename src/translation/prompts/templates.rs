/*!
 * Prompt templates for string translation.
 *
 * The oracle is asked to echo back a JSON object whose keys are exactly the
 * strings it was given, so the reply can be matched key by key.
 */

use serde_json::{Map, Value};

/// Instruction template for one oracle call.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// The template string with placeholders
    template: String,
}

impl PromptTemplate {
    /// The default instruction for UI string translation.
    pub const STRING_TRANSLATOR: &'static str = r#"You are a high-quality automated translation service for game and mod interface text.
Your task is to translate the values in the following JSON object from {source_language} to {target_language}.

CRITICAL RULES:
1. Translate ALL text, including short phrases, single words, and symbols.
2. Convert ASCII punctuation to the corresponding full-width {target_language} punctuation (e.g. `!` -> `！`, `...` -> `…`).
3. If a value cannot be meaningfully translated, return an EMPTY string `""` for that value. Never omit a key.
4. You MUST return ONLY a valid JSON object with the original keys and translated values.

Input:
{input_json}

Output:
"#;

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    /// Create the default string translator template.
    pub fn string_translator() -> Self {
        Self::new(Self::STRING_TRANSLATOR)
    }

    /// Render the template with the given variables.
    pub fn render(&self, source_language: &str, target_language: &str, input_json: &str) -> String {
        self.template
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
            .replace("{input_json}", input_json)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::string_translator()
    }
}

/// Builder for the instruction payload of one sub-batch.
#[derive(Debug, Clone)]
pub struct TranslationPromptBuilder {
    source_language: String,
    target_language: String,
    template: PromptTemplate,
    texts: Vec<String>,
}

impl TranslationPromptBuilder {
    /// Create a builder for the given language pair.
    pub fn new(source_language: &str, target_language: &str) -> Self {
        Self {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            template: PromptTemplate::default(),
            texts: Vec::new(),
        }
    }

    /// Set the strings to translate.
    pub fn with_texts(mut self, texts: &[String]) -> Self {
        self.texts = texts.to_vec();
        self
    }

    /// JSON object mapping every input string to itself, in input order.
    pub fn input_json(&self) -> String {
        let object: Map<String, Value> = self
            .texts
            .iter()
            .map(|text| (text.clone(), Value::String(text.clone())))
            .collect();

        // serde_json keeps non-ASCII characters as-is
        serde_json::to_string_pretty(&Value::Object(object)).unwrap_or_else(|_| "{}".to_string())
    }

    /// Build the full instruction.
    pub fn build(&self) -> String {
        self.template
            .render(&self.source_language, &self.target_language, &self.input_json())
    }
}
