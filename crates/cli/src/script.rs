//! Pointer-event scripts for headless runs.
//!
//! A script is a comma-separated list of `kind@tick` entries, where `kind` is
//! one of `enter`, `leave`, `down`, `up`, or `move:dx:dy`. Events scheduled for
//! tick `t` are delivered just before frame `t` is ticked. Move events carry a
//! pointer position that accumulates from the container center.

use crate::error::CliError;
use particle_sphere_core::PointerEvent;
use thiserror::Error;

/// What is wrong with a single script entry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EventProblem {
    #[error("is missing '@tick'")]
    MissingTick,
    #[error("has a bad tick '{0}'")]
    BadTick(String),
    #[error("has unknown kind '{0}'")]
    UnknownKind(String),
    #[error("needs a numeric {0}")]
    MissingCoordinate(&'static str),
    #[error("has extra fields")]
    ExtraFields,
}

fn invalid(entry: &str, problem: EventProblem) -> CliError {
    CliError::Event {
        entry: entry.to_string(),
        problem,
    }
}

/// One parsed script entry before pointer positions are resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    Enter,
    Leave,
    Down,
    Up,
    Move { dx: f64, dy: f64 },
}

/// Pointer events keyed by the tick they fire on, in script order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventScript {
    events: Vec<(usize, PointerEvent)>,
}

impl EventScript {
    /// Parses `script`, resolving positions against a square container of
    /// side `container`. An empty string is an empty script.
    pub fn parse(script: &str, container: f64) -> Result<Self, CliError> {
        let mut entries = Vec::new();
        for (order, raw) in script.split(',').map(str::trim).enumerate() {
            if raw.is_empty() {
                continue;
            }
            let (kind, tick) = raw
                .rsplit_once('@')
                .ok_or_else(|| invalid(raw, EventProblem::MissingTick))?;
            let tick: usize = tick
                .parse()
                .map_err(|_| invalid(raw, EventProblem::BadTick(tick.to_string())))?;
            entries.push((tick, order, parse_action(kind, raw)?));
        }
        // Stable by tick, then by position in the script.
        entries.sort_by_key(|&(tick, order, _)| (tick, order));

        let center = container / 2.0;
        let (mut x, mut y) = (center, center);
        let events = entries
            .into_iter()
            .map(|(tick, _, action)| {
                let event = match action {
                    Action::Enter => PointerEvent::Enter,
                    Action::Leave => PointerEvent::Leave,
                    Action::Down => PointerEvent::Down { x, y },
                    Action::Up => PointerEvent::Up,
                    Action::Move { dx, dy } => {
                        x += dx;
                        y += dy;
                        PointerEvent::Move { x, y, dx, dy }
                    }
                };
                (tick, event)
            })
            .collect();
        Ok(Self { events })
    }

    /// Events due on `tick`, in order.
    pub fn at(&self, tick: usize) -> impl Iterator<Item = PointerEvent> + '_ {
        self.events
            .iter()
            .filter(move |(t, _)| *t == tick)
            .map(|&(_, event)| event)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn parse_action(kind: &str, raw: &str) -> Result<Action, CliError> {
    let mut parts = kind.split(':');
    let action = match parts.next().unwrap_or_default() {
        "enter" => Action::Enter,
        "leave" => Action::Leave,
        "down" => Action::Down,
        "up" => Action::Up,
        "move" => {
            let mut coord = |axis: &'static str| -> Result<f64, CliError> {
                parts
                    .next()
                    .and_then(|v| v.parse::<f64>().ok())
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| invalid(raw, EventProblem::MissingCoordinate(axis)))
            };
            let dx = coord("dx")?;
            let dy = coord("dy")?;
            Action::Move { dx, dy }
        }
        other => return Err(invalid(raw, EventProblem::UnknownKind(other.to_string()))),
    };
    if parts.next().is_some() {
        return Err(invalid(raw, EventProblem::ExtraFields));
    }
    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_script_has_no_events() {
        let script = EventScript::parse("", 300.0).unwrap();
        assert!(script.is_empty());
        assert_eq!(script.at(0).count(), 0);
    }

    #[test]
    fn hover_script_parses_in_tick_order() {
        let script = EventScript::parse("leave@60, enter@0", 300.0).unwrap();
        assert_eq!(script.len(), 2);
        assert_eq!(script.at(0).collect::<Vec<_>>(), vec![PointerEvent::Enter]);
        assert_eq!(script.at(60).collect::<Vec<_>>(), vec![PointerEvent::Leave]);
    }

    #[test]
    fn drag_script_tracks_pointer_position() {
        let script = EventScript::parse("down@5,move:12:-4@6,move:3:1@6,up@8", 300.0).unwrap();
        assert_eq!(
            script.at(5).collect::<Vec<_>>(),
            vec![PointerEvent::Down { x: 150.0, y: 150.0 }]
        );
        assert_eq!(
            script.at(6).collect::<Vec<_>>(),
            vec![
                PointerEvent::Move {
                    x: 162.0,
                    y: 146.0,
                    dx: 12.0,
                    dy: -4.0
                },
                PointerEvent::Move {
                    x: 165.0,
                    y: 147.0,
                    dx: 3.0,
                    dy: 1.0
                },
            ]
        );
        assert_eq!(script.at(8).collect::<Vec<_>>(), vec![PointerEvent::Up]);
    }

    #[test]
    fn malformed_entries_are_input_errors() {
        for (bad, expected) in [
            ("enter", EventProblem::MissingTick),
            ("enter@soon", EventProblem::BadTick("soon".into())),
            ("hover@3", EventProblem::UnknownKind("hover".into())),
            ("move:1@2", EventProblem::MissingCoordinate("dy")),
            ("move:a:b@2", EventProblem::MissingCoordinate("dx")),
            ("move:1:2:3@2", EventProblem::ExtraFields),
            ("up:1@2", EventProblem::ExtraFields),
            ("down@-1", EventProblem::BadTick("-1".into())),
        ] {
            let err = EventScript::parse(bad, 300.0).unwrap_err();
            assert_eq!(err.exit_code(), 12, "{bad} should be rejected");
            match err {
                CliError::Event { entry, problem } => {
                    assert_eq!(entry, bad);
                    assert_eq!(problem, expected);
                }
                other => panic!("{bad}: unexpected error {other}"),
            }
        }
    }
}
