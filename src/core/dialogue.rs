//! Dialogue controller: decides what the caller hears next.
//!
//! Fields are requested in a fixed order (name, date, time, party size,
//! notes) and a field already set is never asked for again. The ordering is
//! a design choice of this controller, not caller-supplied: it guarantees
//! one question per turn, while fields volunteered out of order are still
//! captured opportunistically by the extractor and skipped here.

use crate::core::reservations::ReservationRecord;
use crate::core::session::ReservationFields;

/// Initial greeting spoken on `POST /incoming-call`.
pub const GREETING: &str =
    "Hello! I can help you make a reservation. How may I assist you today?";

/// Spoken when the turn carried no intelligible speech.
pub const REPROMPT: &str = "Sorry, I didn't quite catch that. Could you say that again?";

/// Spoken when the model call fails; the caller just hears a re-prompt,
/// never an error.
pub const FALLBACK_PROMPT: &str =
    "Sorry, I'm having a little trouble right now. Could you please repeat that?";

/// Spoken, then hung up, when the greeting gather gets no usable input.
pub const UNAVAILABLE: &str =
    "Sorry, we can't take your reservation right now. Please call back later. Goodbye!";

/// Spoken when a completion turn races a duplicate delivery that already
/// recorded the reservation.
pub const GENERIC_CONFIRMATION: &str =
    "Thanks! Your reservation has been recorded. We look forward to seeing you!";

const ASK_NAME: &str = "Sure! Please say your full name now, for example: John Smith.";
const ASK_DATE: &str = "Great! What date would you like the reservation for?";
const ASK_TIME: &str = "Perfect. And what time works best for you?";
const ASK_PARTY_SIZE: &str = "Got it. How many guests will be joining?";
const ASK_NOTES: &str =
    "Excellent. Any special requests? For example seating or dietary needs?";

/// Return the question for the first missing field, or `None` once every
/// field is gathered and the reservation can be confirmed.
pub fn next_prompt(fields: &ReservationFields) -> Option<&'static str> {
    if is_unset(&fields.name) {
        return Some(ASK_NAME);
    }
    if is_unset(&fields.date) {
        return Some(ASK_DATE);
    }
    if is_unset(&fields.time) {
        return Some(ASK_TIME);
    }
    if is_unset(&fields.party_size) {
        return Some(ASK_PARTY_SIZE);
    }
    if is_unset(&fields.notes) {
        return Some(ASK_NOTES);
    }
    None
}

/// Confirmation sentence spoken before hanging up, interpolating the four
/// answerable fields.
pub fn confirmation(record: &ReservationRecord) -> String {
    format!(
        "Thanks {}! Your reservation for {} guests on {} at {} has been recorded. \
         We look forward to seeing you!",
        record.name, record.party_size, record.date, record.time
    )
}

fn is_unset(field: &Option<String>) -> bool {
    !matches!(field, Some(v) if !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(values: [Option<&str>; 5]) -> ReservationFields {
        let [name, date, time, party_size, notes] = values;
        ReservationFields {
            name: name.map(str::to_string),
            date: date.map(str::to_string),
            time: time.map(str::to_string),
            party_size: party_size.map(str::to_string),
            notes: notes.map(str::to_string),
        }
    }

    #[test]
    fn test_asks_fields_in_fixed_order() {
        let mut current = fields([None; 5]);
        assert_eq!(next_prompt(&current), Some(ASK_NAME));

        current.name = Some("John Smith".into());
        assert_eq!(next_prompt(&current), Some(ASK_DATE));

        current.date = Some("Friday".into());
        assert_eq!(next_prompt(&current), Some(ASK_TIME));

        current.time = Some("7pm".into());
        assert_eq!(next_prompt(&current), Some(ASK_PARTY_SIZE));

        current.party_size = Some("4".into());
        assert_eq!(next_prompt(&current), Some(ASK_NOTES));

        current.notes = Some("window seat".into());
        assert_eq!(next_prompt(&current), None);
    }

    #[test]
    fn test_never_asks_for_a_field_already_set() {
        // Caller volunteered the date before being asked for a name.
        let current = fields([None, Some("Friday"), None, None, None]);
        assert_eq!(next_prompt(&current), Some(ASK_NAME));

        // Once the name arrives, the controller skips straight past date.
        let current = fields([Some("John"), Some("Friday"), None, None, None]);
        assert_eq!(next_prompt(&current), Some(ASK_TIME));
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let current = fields([Some("   "), None, None, None, None]);
        assert_eq!(next_prompt(&current), Some(ASK_NAME));
    }

    #[test]
    fn test_declined_notes_count_as_gathered() {
        let current = fields([
            Some("John"),
            Some("Friday"),
            Some("7pm"),
            Some("4"),
            Some("none"),
        ]);
        assert_eq!(next_prompt(&current), None);
    }

    #[test]
    fn test_confirmation_interpolates_answerable_fields() {
        let record = ReservationRecord::from_fields(
            "CA1",
            &fields([
                Some("John Smith"),
                Some("Friday"),
                Some("7 pm"),
                Some("4"),
                Some("none"),
            ]),
        );
        let spoken = confirmation(&record);
        assert!(spoken.contains("John Smith"));
        assert!(spoken.contains("4 guests"));
        assert!(spoken.contains("on Friday"));
        assert!(spoken.contains("at 7 pm"));
    }
}
