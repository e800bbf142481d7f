//! Persona instruction prepended to every prompt.
//!
//! The instruction ends with a blank line so the history that follows reads
//! as a transcript. Users can replace it by dropping a `persona.md` into the
//! data root.

use tracing::info;

use crate::config::data_root;

/// Built-in persona instruction.
pub const PERSONA_INSTRUCTION: &str = "You are Mira, a friendly voice companion who lives on the user's desktop. \
Keep replies short, warm and conversational, like a helpful friend speaking aloud. \
Answer plainly without markdown, lists or code blocks, because everything you say is spoken.\n\n";

/// Loads the persona instruction, preferring `<data root>/persona.md` when it
/// exists and is non-empty.
#[must_use]
pub fn load_persona() -> String {
    let override_path = data_root().join("persona.md");
    if let Ok(text) = std::fs::read_to_string(&override_path) {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            info!(path = %override_path.display(), "using persona override");
            return format!("{trimmed}\n\n");
        }
    }
    PERSONA_INSTRUCTION.to_owned()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn builtin_persona_ends_with_blank_line() {
        assert!(PERSONA_INSTRUCTION.ends_with("\n\n"));
    }

    #[test]
    fn builtin_persona_names_the_companion() {
        assert!(PERSONA_INSTRUCTION.contains("Mira"));
    }

    #[test]
    fn load_persona_is_never_empty() {
        let persona = load_persona();
        assert!(!persona.trim().is_empty());
        assert!(persona.ends_with("\n\n"));
    }
}
