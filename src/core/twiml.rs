//! Voice response builder.
//!
//! Renders the TwiML the telephony provider consumes: a spoken prompt inside
//! a speech Gather for mid-dialogue turns, and a confirmation followed by a
//! Hangup once the reservation is complete. Collected fields flow straight
//! into spoken text, so everything interpolated is XML-escaped, and spoken
//! text is clipped to the provider's length cap.

/// Maximum spoken-text length; longer Say bodies trip provider-side
/// truncation errors.
const MAX_SAY_LENGTH: usize = 400;

const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

/// Builds TwiML responses for one call turn.
#[derive(Debug, Clone)]
pub struct VoiceResponseBuilder {
    voice: String,
    language: String,
    action_url: String,
}

impl VoiceResponseBuilder {
    /// `action_url` is the absolute callback the provider posts the next
    /// speech turn to.
    pub fn new(
        voice: impl Into<String>,
        language: impl Into<String>,
        action_url: impl Into<String>,
    ) -> Self {
        Self {
            voice: voice.into(),
            language: language.into(),
            action_url: action_url.into(),
        }
    }

    /// Speak a prompt and listen for the caller's reply.
    pub fn gather_prompt(&self, prompt: &str) -> String {
        format!(
            "{XML_HEADER}<Response>{}</Response>",
            self.gather_verb(prompt)
        )
    }

    /// Greeting variant: speak and listen, but if the gather completes with
    /// no usable input, fall back to a spoken apology and hang up.
    pub fn gather_prompt_with_fallback(&self, prompt: &str, fallback: &str) -> String {
        format!(
            "{XML_HEADER}<Response>{}{}<Hangup/></Response>",
            self.gather_verb(prompt),
            self.say_verb(fallback)
        )
    }

    /// Completion: speak the confirmation and end the call.
    pub fn say_and_hangup(&self, text: &str) -> String {
        format!(
            "{XML_HEADER}<Response>{}<Hangup/></Response>",
            self.say_verb(text)
        )
    }

    fn gather_verb(&self, prompt: &str) -> String {
        format!(
            "<Gather input=\"speech\" action=\"{}\" speechTimeout=\"auto\" language=\"{}\">{}</Gather>",
            escape_xml(&self.action_url),
            escape_xml(&self.language),
            self.say_verb(prompt)
        )
    }

    fn say_verb(&self, text: &str) -> String {
        format!(
            "<Say voice=\"{}\">{}</Say>",
            escape_xml(&self.voice),
            escape_xml(clip_spoken(text.trim()))
        )
    }
}

/// Escape text for inclusion in XML element content or attribute values.
pub fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Clip spoken text to the provider cap on a character boundary.
pub fn clip_spoken(text: &str) -> &str {
    match text.char_indices().nth(MAX_SAY_LENGTH) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
