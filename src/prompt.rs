//! Prompt templates for the three generation modes.
//!
//! Builders are pure: they trust that the input was validated upstream and
//! always produce the same string for the same input.

use std::fmt;

/// Character classes offered by the length-based mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharsetKind {
    #[default]
    Mixed,
    LettersOnly,
    DigitsOnly,
}

impl CharsetKind {
    pub const ALL: [CharsetKind; 3] = [Self::Mixed, Self::LettersOnly, Self::DigitsOnly];

    /// Phrase spliced into the length prompt after "Each password should be".
    pub fn description(self) -> &'static str {
        match self {
            Self::Mixed => "a mix of uppercase letters, lowercase letters, numbers, and common special characters (!@#$%^&*).",
            Self::LettersOnly => "only uppercase and lowercase letters.",
            Self::DigitsOnly => "only numbers.",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Mixed => "Mixed (letters, numbers, symbols)",
            Self::LettersOnly => "Letters only",
            Self::DigitsOnly => "Numbers only",
        }
    }
}

/// Validated input for one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeInput {
    Samples {
        samples: String,
    },
    Target {
        manufacturer: String,
        model: String,
        usernames: String,
    },
    Length {
        length: u32,
        count: u32,
        charset: CharsetKind,
    },
}

/// A complete instruction ready to send. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn build_prompt(input: &ModeInput) -> Prompt {
    let text = match input {
        ModeInput::Samples { samples } => samples_prompt(samples),
        ModeInput::Target {
            manufacturer,
            model,
            usernames,
        } => target_prompt(manufacturer, model, usernames),
        ModeInput::Length {
            length,
            count,
            charset,
        } => length_prompt(*length, *count, *charset),
    };
    Prompt(text)
}

const SAMPLE_VARIATIONS: u32 = 50;

fn samples_prompt(samples: &str) -> String {
    format!(
        "Analyze the following sample passwords and generate a list of {SAMPLE_VARIATIONS} new, plausible password variations. Apply common password mutation techniques such as:
- Character substitutions (e.g., 'a' to '@', 's' to '$', 'i' to '1', 'o' to '0')
- Adding numbers or special characters to the beginning or end
- Case changes (e.g., capitalizing the first letter, alternating case)
- Common prefixes or suffixes (e.g., year numbers like 2023, 2024, 2025, common words like 'admin', 'user')
- Simple permutations or combinations of sample elements.
Ensure the generated passwords are distinct from the samples and from each other. Provide the list as a newline-separated list.

Samples:
{samples}"
    )
}

fn or_na(field: &str) -> &str {
    if field.is_empty() {
        "N/A"
    } else {
        field
    }
}

fn target_prompt(manufacturer: &str, model: &str, usernames: &str) -> String {
    format!(
        "Based on the following target details, act as a cybersecurity researcher specializing in IoT device security. Generate a comprehensive list of potential default usernames and passwords, and common password patterns or examples typically associated with such devices, or found in publicly known breaches for similar systems.
Focus on patterns and widely known defaults rather than specific live data.
Include common usernames like 'admin', 'user', 'root', 'guest', 'support', 'test'.
Consider common password patterns like 'password', '123456', 'admin123', 'default', 'guest', 'network', 'router', 'iotdevice', 'manufacturername'.
If a manufacturer or model is provided, try to infer common defaults or known vulnerabilities related to that specific entity based on your training data.
Provide the list as a newline-separated list of \"username:password\" pairs or just passwords if no specific username is implied.

Target Details:
Manufacturer: {}
Model: {}
Common Usernames to consider: {}",
        or_na(manufacturer),
        or_na(model),
        or_na(usernames)
    )
}

fn length_prompt(length: u32, count: u32, charset: CharsetKind) -> String {
    format!(
        "Generate a list of {count} unique, plausible passwords, each exactly {length} characters long.
Each password should be {}
Avoid easily guessable patterns like sequential numbers or dictionary words.
Provide the list as a newline-separated list.",
        charset.description()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn samples_prompt_embeds_text_and_asks_for_fifty() {
        let p = build_prompt(&ModeInput::Samples {
            samples: "password123\nSummer2024!".into(),
        });
        assert!(p.as_str().contains("generate a list of 50 new"));
        assert!(p.as_str().ends_with("Samples:\npassword123\nSummer2024!"));
        assert!(p.as_str().contains("distinct from the samples and from each other"));
    }

    #[test]
    fn target_prompt_marks_empty_fields_na() {
        let p = build_prompt(&ModeInput::Target {
            manufacturer: "Hikvision".into(),
            model: String::new(),
            usernames: String::new(),
        });
        assert!(p.as_str().ends_with(
            "Manufacturer: Hikvision\nModel: N/A\nCommon Usernames to consider: N/A"
        ));
        assert!(p.as_str().contains("\"username:password\""));
    }

    #[test]
    fn target_prompt_with_only_usernames() {
        let p = build_prompt(&ModeInput::Target {
            manufacturer: String::new(),
            model: String::new(),
            usernames: "operator".into(),
        });
        assert!(p.as_str().contains("Manufacturer: N/A\nModel: N/A\n"));
        assert!(p.as_str().ends_with("Common Usernames to consider: operator"));
    }

    #[test]
    fn length_prompt_carries_numbers_and_charset_phrase() {
        for charset in CharsetKind::ALL {
            let p = build_prompt(&ModeInput::Length {
                length: 12,
                count: 5,
                charset,
            });
            assert!(p
                .as_str()
                .contains("5 unique, plausible passwords, each exactly 12 characters long"));
            assert!(p
                .as_str()
                .contains(&format!("Each password should be {}\n", charset.description())));
        }
    }

    #[test]
    fn mixed_phrase_lists_special_characters() {
        assert_eq!(
            CharsetKind::Mixed.description(),
            "a mix of uppercase letters, lowercase letters, numbers, and common special characters (!@#$%^&*)."
        );
    }

    #[test]
    fn builders_are_deterministic() {
        let input = ModeInput::Length {
            length: 30,
            count: 200,
            charset: CharsetKind::DigitsOnly,
        };
        assert_eq!(build_prompt(&input), build_prompt(&input));
        assert_eq!(build_prompt(&input).to_string(), build_prompt(&input).as_str());
    }
}
