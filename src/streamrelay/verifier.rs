use log::{debug, warn};

use crate::error::VerificationError;

/// Query parameter carrying the provider's handshake token
pub const CHALLENGE_PARAM: &str = "hub.challenge";

/// Echoes the handshake token when exactly one is present
pub fn handle_challenge(query_params: &[(String, String)]) -> Result<String, VerificationError> {
    debug!("Verifying handshake with {} query parameters", query_params.len());

    let mut challenges = query_params
        .iter()
        .filter(|(name, _)| name == CHALLENGE_PARAM)
        .map(|(_, value)| value);

    match (challenges.next(), challenges.count()) {
        (Some(token), 0) => Ok(token.clone()),
        (None, _) => {
            warn!("Handshake without {}", CHALLENGE_PARAM);
            Err(VerificationError::MissingChallenge)
        }
        (Some(_), rest) => {
            warn!("Handshake with {} {} parameters", rest + 1, CHALLENGE_PARAM);
            Err(VerificationError::AmbiguousChallenge(rest + 1))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn single_challenge_is_echoed() {
        let query = params(&[("hub.mode", "subscribe"), ("hub.challenge", "abc123")]);
        assert_eq!(handle_challenge(&query), Ok("abc123".to_string()));
    }

    #[test]
    fn empty_value_is_still_one_challenge() {
        assert_eq!(handle_challenge(&params(&[("hub.challenge", "")])), Ok(String::new()));
    }

    #[test]
    fn missing_challenge() {
        assert_eq!(
            handle_challenge(&params(&[("hub.mode", "subscribe")])),
            Err(VerificationError::MissingChallenge)
        );
        assert_eq!(handle_challenge(&[]), Err(VerificationError::MissingChallenge));
    }

    #[test]
    fn repeated_challenge() {
        let query = params(&[("hub.challenge", "a"), ("hub.challenge", "b")]);
        let err = handle_challenge(&query).unwrap_err();
        assert_eq!(err, VerificationError::AmbiguousChallenge(2));
        assert_eq!(err.response_body(), "no challenge");
    }
}
