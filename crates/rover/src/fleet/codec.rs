//! Codec — the pose broadcast text format.
//!
//! A broadcast looks like `alpha (1.5,-2,0.75)`: the identity, a space, then
//! x, y and theta in a parenthesized, comma-delimited list.

use super::pose::Pose;
use super::{FleetError, Result};

/// A decoded pose broadcast.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseMessage {
    pub identity: String,
    pub pose: Pose,
}

pub fn encode(identity: &str, pose: &Pose) -> String {
    format!("{} ({},{},{})", identity, pose.x, pose.y, pose.theta)
}

/// Parse a broadcast produced by [`encode`].
///
/// The identity is everything before the first space. From the remainder,
/// alphabetic characters, parentheses and spaces are dropped and the first
/// three comma-separated fields are read as x, y, theta.
pub fn decode(text: &str) -> Result<PoseMessage> {
    let (identity, rest) = text
        .split_once(' ')
        .ok_or_else(|| FleetError::MalformedMessage(format!("no identity separator in {:?}", text)))?;

    if identity.is_empty() {
        return Err(FleetError::MalformedMessage(format!("empty identity in {:?}", text)));
    }

    let numeric: String = rest
        .chars()
        .filter(|c| !c.is_alphabetic() && !matches!(c, '(' | ')' | ' '))
        .collect();

    let fields: Vec<f64> = numeric
        .split(',')
        .filter(|field| !field.is_empty())
        .map(|field| {
            field.parse::<f64>().map_err(|_| {
                FleetError::MalformedMessage(format!("invalid numeric field {:?} in {:?}", field, text))
            })
        })
        .collect::<Result<_>>()?;

    match fields.as_slice() {
        [x, y, theta, ..] => Ok(PoseMessage {
            identity: identity.to_string(),
            pose: Pose::new(*x, *y, *theta),
        }),
        _ => Err(FleetError::MalformedMessage(format!(
            "expected 3 numeric fields, found {} in {:?}",
            fields.len(),
            text
        ))),
    }
}
