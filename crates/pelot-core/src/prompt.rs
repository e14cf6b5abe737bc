use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("failed to read prompt template {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid prompt template: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unknown placeholder {{{0}}} in prompt template")]
    UnknownPlaceholder(String),
    #[error("unbalanced brace at byte {0} in prompt template")]
    UnbalancedBrace(usize),
}

/// Prompt file contents: a system prompt and the instruction template with
/// `{query}` and `{chunks}` placeholders.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptTemplate {
    #[serde(rename = "System_Prompt", default)]
    pub system_prompt: String,
    pub prompt_instructions: String,
}

impl PromptTemplate {
    /// Read and parse the YAML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid template.
    pub async fn load(path: &Path) -> Result<Self, PromptError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| PromptError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_yaml(&content)
    }

    /// # Errors
    ///
    /// Returns an error if `content` is not a YAML mapping with `prompt_instructions`.
    pub fn from_yaml(content: &str) -> Result<Self, PromptError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Fill the instruction template.
    ///
    /// # Errors
    ///
    /// See [`format_prompt`].
    pub fn render(&self, query: &str, chunks: &str) -> Result<String, PromptError> {
        format_prompt(&self.prompt_instructions, query, chunks)
    }
}

/// Substitute `{query}` and `{chunks}` into `template`.
///
/// `{{` and `}}` produce literal braces. Any other field name, or a brace without
/// its partner, is an error. Substituted values are inserted verbatim and never
/// scanned for placeholders.
///
/// # Errors
///
/// Returns [`PromptError::UnknownPlaceholder`] or [`PromptError::UnbalancedBrace`].
pub fn format_prompt(template: &str, query: &str, chunks: &str) -> Result<String, PromptError> {
    let mut out = String::with_capacity(template.len() + query.len() + chunks.len());
    let mut chars = template.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' => {
                if chars.next_if(|&(_, next)| next == '{').is_some() {
                    out.push('{');
                    continue;
                }
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, '{')) | None => return Err(PromptError::UnbalancedBrace(pos)),
                        Some((_, ch)) => field.push(ch),
                    }
                }
                match field.as_str() {
                    "query" => out.push_str(query),
                    "chunks" => out.push_str(chunks),
                    _ => return Err(PromptError::UnknownPlaceholder(field)),
                }
            }
            '}' => {
                if chars.next_if(|&(_, next)| next == '}').is_none() {
                    return Err(PromptError::UnbalancedBrace(pos));
                }
                out.push('}');
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_both_fields() {
        let out = format_prompt("Q: {query}\nCTX: {chunks}", "What is X?", "A and B").unwrap();
        assert_eq!(out, "Q: What is X?\nCTX: A and B");
    }

    #[test]
    fn repeated_and_missing_fields() {
        assert_eq!(format_prompt("{query} {query}", "a", "b").unwrap(), "a a");
        assert_eq!(format_prompt("no fields", "a", "b").unwrap(), "no fields");
    }

    #[test]
    fn doubled_braces_are_literal() {
        let out = format_prompt("{{query}} = {query}; {{}}", "x", "").unwrap();
        assert_eq!(out, "{query} = x; {}");
    }

    #[test]
    fn substituted_values_not_rescanned() {
        let out = format_prompt("{query}|{chunks}", "{chunks}", "{query} }").unwrap();
        assert_eq!(out, "{chunks}|{query} }");
    }

    #[test]
    fn unknown_placeholder_is_error() {
        let err = format_prompt("Hello {name}", "q", "c").unwrap_err();
        assert!(matches!(err, PromptError::UnknownPlaceholder(ref f) if f == "name"));
        assert!(matches!(
            format_prompt("{}", "q", "c"),
            Err(PromptError::UnknownPlaceholder(ref f)) if f.is_empty()
        ));
    }

    #[test]
    fn unbalanced_braces_are_errors() {
        assert!(matches!(
            format_prompt("open {query", "q", "c"),
            Err(PromptError::UnbalancedBrace(5))
        ));
        assert!(matches!(
            format_prompt("close }", "q", "c"),
            Err(PromptError::UnbalancedBrace(6))
        ));
        assert!(matches!(
            format_prompt("{a{b}", "q", "c"),
            Err(PromptError::UnbalancedBrace(0))
        ));
    }

    #[test]
    fn multibyte_text_preserved() {
        let out = format_prompt("Pergunta: {query} ✓", "Qual é a história?", "").unwrap();
        assert_eq!(out, "Pergunta: Qual é a história? ✓");
    }

    #[test]
    fn template_from_yaml() {
        let yaml = "System_Prompt: You answer questions about Pelotas.\nprompt_instructions: |\n  Question: {query}\n  Context: {chunks}\n";
        let template = PromptTemplate::from_yaml(yaml).unwrap();
        assert_eq!(template.system_prompt, "You answer questions about Pelotas.");
        assert_eq!(
            template.render("q", "c").unwrap(),
            "Question: q\nContext: c\n"
        );
    }

    #[test]
    fn template_without_system_prompt() {
        let template = PromptTemplate::from_yaml("prompt_instructions: \"{query}\"").unwrap();
        assert!(template.system_prompt.is_empty());
    }

    #[test]
    fn template_missing_instructions_is_error() {
        assert!(matches!(
            PromptTemplate::from_yaml("System_Prompt: hi"),
            Err(PromptError::Yaml(_))
        ));
    }

    #[tokio::test]
    async fn load_missing_file_is_io_error() {
        let err = PromptTemplate::load(Path::new("/nonexistent/prompt.yml"))
            .await
            .unwrap_err();
        assert!(matches!(err, PromptError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/prompt.yml"));
    }

    #[tokio::test]
    async fn load_reads_file_each_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt_template.yml");
        std::fs::write(&path, "prompt_instructions: first {query}").unwrap();
        let first = PromptTemplate::load(&path).await.unwrap();
        std::fs::write(&path, "prompt_instructions: second {query}").unwrap();
        let second = PromptTemplate::load(&path).await.unwrap();
        assert_eq!(first.render("q", "").unwrap(), "first q");
        assert_eq!(second.render("q", "").unwrap(), "second q");
    }

    mod proptest_format {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn brace_free_templates_pass_through(text in "[^{}]{0,200}") {
                prop_assert_eq!(format_prompt(&text, "q", "c").unwrap(), text);
            }

            #[test]
            fn any_values_substituted_verbatim(query in "\\PC{0,50}", chunks in "\\PC{0,50}") {
                let out = format_prompt("[{query}][{chunks}]", &query, &chunks).unwrap();
                prop_assert_eq!(out, format!("[{query}][{chunks}]"));
            }
        }
    }
}
