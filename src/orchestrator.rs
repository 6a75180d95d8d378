//! Per-mode request flow: validate, build the prompt, call the generator and
//! record the outcome in the session state the UI renders from.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::InputPolicy;
use crate::gemini::{GenerationRequest, TextGenerator};
use crate::prompt::{build_prompt, CharsetKind, ModeInput, Prompt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Samples,
    Target,
    Length,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Self::Samples, Self::Target, Self::Length];

    pub fn title(self) -> &'static str {
        match self {
            Self::Samples => "Generate from Samples",
            Self::Target => "Generate from Target Info",
            Self::Length => "Generate by Length",
        }
    }
}

/// Raw field values as typed into the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeForm {
    Samples {
        samples: String,
    },
    Target {
        manufacturer: String,
        model: String,
        usernames: String,
    },
    Length {
        length: String,
        count: String,
        charset: CharsetKind,
    },
}

impl ModeForm {
    pub fn mode(&self) -> Mode {
        match self {
            Self::Samples { .. } => Mode::Samples,
            Self::Target { .. } => Mode::Target,
            Self::Length { .. } => Mode::Length,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please provide some sample passwords.")]
    NoSamples,
    #[error("Please provide at least one piece of target information (Manufacturer, Model, or Common Usernames).")]
    NoTargetInfo,
    #[error("Please enter a valid password length between {min} and {max} characters.")]
    Length { min: u32, max: u32 },
    #[error("Please enter a number of passwords to generate between {min} and {max}.")]
    Count { min: u32, max: u32 },
}

fn parse_in_range(raw: &str, min: u32, max: u32) -> Option<u32> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|v| (i64::from(min)..=i64::from(max)).contains(v))
        .and_then(|v| u32::try_from(v).ok())
}

pub fn validate(form: &ModeForm, policy: &InputPolicy) -> Result<ModeInput, ValidationError> {
    match form {
        ModeForm::Samples { samples } => {
            let samples = samples.trim();
            if samples.is_empty() {
                return Err(ValidationError::NoSamples);
            }
            Ok(ModeInput::Samples {
                samples: samples.to_string(),
            })
        }
        ModeForm::Target {
            manufacturer,
            model,
            usernames,
        } => {
            let (manufacturer, model, usernames) =
                (manufacturer.trim(), model.trim(), usernames.trim());
            if manufacturer.is_empty() && model.is_empty() && usernames.is_empty() {
                return Err(ValidationError::NoTargetInfo);
            }
            Ok(ModeInput::Target {
                manufacturer: manufacturer.to_string(),
                model: model.to_string(),
                usernames: usernames.to_string(),
            })
        }
        ModeForm::Length {
            length,
            count,
            charset,
        } => {
            let length = parse_in_range(length, policy.min_length, policy.max_length).ok_or(
                ValidationError::Length {
                    min: policy.min_length,
                    max: policy.max_length,
                },
            )?;
            let count = parse_in_range(count, policy.min_count, policy.max_count).ok_or(
                ValidationError::Count {
                    min: policy.min_count,
                    max: policy.max_count,
                },
            )?;
            Ok(ModeInput::Length {
                length,
                count,
                charset: *charset,
            })
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeState {
    pub busy: bool,
    pub last_result: String,
}

/// Everything the UI renders. One error slot is shared by all modes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub samples: ModeState,
    pub target: ModeState,
    pub length: ModeState,
    pub error: String,
}

impl SessionState {
    pub fn mode(&self, mode: Mode) -> &ModeState {
        match mode {
            Mode::Samples => &self.samples,
            Mode::Target => &self.target,
            Mode::Length => &self.length,
        }
    }

    fn mode_mut(&mut self, mode: Mode) -> &mut ModeState {
        match mode {
            Mode::Samples => &mut self.samples,
            Mode::Target => &mut self.target,
            Mode::Length => &mut self.length,
        }
    }
}

type SharedState = Arc<Mutex<SessionState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Holds a mode's busy flag; dropping it clears the flag on every exit path.
struct BusyGuard {
    state: SharedState,
    mode: Mode,
}

impl BusyGuard {
    fn acquire(state: SharedState, mode: Mode) -> Self {
        lock(&state).mode_mut(mode).busy = true;
        Self { state, mode }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        lock(&self.state).mode_mut(self.mode).busy = false;
    }
}

#[derive(Clone)]
pub struct Orchestrator {
    generator: Arc<dyn TextGenerator>,
    policy: InputPolicy,
    state: SharedState,
}

/// A validated call whose mode is already marked busy.
pub struct Dispatch {
    guard: BusyGuard,
    prompt: Prompt,
    generator: Arc<dyn TextGenerator>,
}

impl Orchestrator {
    pub fn new(generator: Arc<dyn TextGenerator>, policy: InputPolicy) -> Self {
        Self {
            generator,
            policy,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        lock(&self.state).clone()
    }

    pub fn policy(&self) -> &InputPolicy {
        &self.policy
    }

    /// Synchronous half of a submission. Returns `None` when validation
    /// fails; the reason is then in the shared error slot.
    pub fn prepare(&self, form: ModeForm) -> Option<Dispatch> {
        let mode = form.mode();
        let input = match validate(&form, &self.policy) {
            Ok(input) => input,
            Err(e) => {
                tracing::info!("{:?} input rejected: {}", mode, e);
                lock(&self.state).error = e.to_string();
                return None;
            }
        };

        {
            let mut state = lock(&self.state);
            state.error.clear();
            state.mode_mut(mode).last_result.clear();
        }
        let guard = BusyGuard::acquire(Arc::clone(&self.state), mode);
        let prompt = build_prompt(&input);
        tracing::info!("{:?} dispatching ({} prompt chars)", mode, prompt.as_str().len());

        Some(Dispatch {
            guard,
            prompt,
            generator: Arc::clone(&self.generator),
        })
    }

    pub async fn submit(&self, form: ModeForm) {
        if let Some(dispatch) = self.prepare(form) {
            dispatch.run().await;
        }
    }
}

impl Dispatch {
    pub fn mode(&self) -> Mode {
        self.guard.mode
    }

    pub async fn run(self) {
        let Dispatch {
            guard,
            prompt,
            generator,
        } = self;
        let outcome = generator.generate(GenerationRequest::new(prompt)).await;

        {
            let mut state = lock(&guard.state);
            match outcome {
                Ok(text) => {
                    tracing::info!("{:?} completed ({} chars)", guard.mode, text.len());
                    state.mode_mut(guard.mode).last_result = text;
                }
                Err(e) => {
                    tracing::warn!("{:?} failed: {}", guard.mode, e);
                    state.error = format!("Failed to generate: {e}");
                }
            }
        }
        drop(guard);
    }
}
