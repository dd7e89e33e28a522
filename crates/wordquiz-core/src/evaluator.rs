//! Answer scoring.

/// Returns `true` when the user's answer appears inside the expected answer.
///
/// Both sides are trimmed and lower-cased first. The check is lenient (a
/// single keyword from a longer meaning is accepted) and asymmetric: the
/// expected text must contain the answer, never the other way round. A blank
/// answer is contained in everything and so counts as correct.
pub fn is_correct(user_text: &str, expected_text: &str) -> bool {
    let user = user_text.trim().to_lowercase();
    let expected = expected_text.trim().to_lowercase();
    expected.contains(&user)
}
