use log::debug;
use rand::Rng;

use crate::error::CommandError;

const MAX_ROLLS: i64 = 50;
const MAX_SIDES: i64 = 10_000;

const TOO_MANY: &str = "no way I'm gonna roll a die that many times";

/// `/roll,XdY`: rolls X dice with Y sides each
pub fn roll(params: &[String]) -> Result<String, CommandError> {
    roll_with(params, &mut rand::rng())
}

pub fn roll_with<R: Rng>(params: &[String], rng: &mut R) -> Result<String, CommandError> {
    if params.len() != 2 {
        return Err(CommandError::Rejected("That's not even the right format. One comma only"));
    }

    // Empty pieces don't count, so `2dd6` is still two parts
    let parts: Vec<&str> = params[1].split('d').filter(|s| !s.is_empty()).collect();
    if parts.len() != 2 {
        return Err(CommandError::Rejected("You gotta put a d in there bro"));
    }

    let (count, sides) = match (parts[0].parse::<i64>(), parts[1].parse::<i64>()) {
        (Ok(count), Ok(sides)) => (count, sides),
        _ => return Err(CommandError::Rejected("bruh both of those things gotta be numbers")),
    };

    if count <= 0 || count >= MAX_ROLLS || sides <= 0 || sides >= MAX_SIDES {
        return Err(CommandError::Rejected(TOO_MANY));
    }

    debug!("Rolling {}d{}", count, sides);
    let mut out = String::new();
    for _ in 0..count {
        let value = rng.random_range(1..=sides);
        out.push_str(&keycaps(&value.to_string()));
        out.push('\n');
    }
    Ok(out)
}

/// Renders every ASCII digit as its keycap emoji
fn keycaps(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() * 7);
    for c in digits.chars() {
        out.push(c);
        if c.is_ascii_digit() {
            out.push('\u{FE0F}');
            out.push('\u{20E3}');
        }
    }
    out
}
